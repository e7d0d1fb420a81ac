use super::{GridMap, HeuristicElement};
use crate::{neighbors::Neighborhood, path::Path, StateId};

use hashbrown::HashMap;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Searches the optimal Path between two States of the Grid using A*.
///
/// Returns `None` if either State is blocked or the goal cannot be reached. The returned
/// Path contains both `start` and `goal`.
pub fn a_star_search<N: Neighborhood>(
    grid: &GridMap,
    neighborhood: &N,
    start: StateId,
    goal: StateId,
) -> Option<Path<StateId>> {
    if !grid.is_open(start) || !grid.is_open(goal) {
        return None;
    }
    if start == goal {
        return Some(Path::new(vec![start], 0));
    }
    let goal_point = grid.point_of(goal);
    let heuristic = |state: StateId| neighborhood.heuristic(grid.point_of(state), goal_point);

    let mut visited = HashMap::new();
    let mut next = BinaryHeap::new();
    next.push(HeuristicElement(start, 0, heuristic(start)));
    visited.insert(start, (0, start));

    let mut buffer = vec![];
    let mut moves = vec![];

    while let Some(HeuristicElement(current_id, current_cost, _)) = next.pop() {
        if current_id == goal {
            break;
        }
        match current_cost.cmp(&visited[&current_id].0) {
            Ordering::Greater => continue,
            Ordering::Equal => {}
            Ordering::Less => panic!("Binary Heap failed"),
        }

        moves.clear();
        grid.valid_moves(neighborhood, current_id, &mut buffer, &mut moves);
        for &(other_id, delta_cost) in moves.iter() {
            let other_cost = current_cost + delta_cost;

            let mut needs_visit = true;
            if let Some((prev_cost, prev_id)) = visited.get_mut(&other_id) {
                if *prev_cost > other_cost {
                    *prev_cost = other_cost;
                    *prev_id = current_id;
                } else {
                    needs_visit = false;
                }
            } else {
                visited.insert(other_id, (other_cost, current_id));
            }

            if needs_visit {
                next.push(HeuristicElement(
                    other_id,
                    other_cost,
                    other_cost + heuristic(other_id),
                ));
            }
        }
    }

    if !visited.contains_key(&goal) {
        return None;
    }

    let steps = {
        let mut steps = vec![];
        let mut current = goal;

        while current != start {
            steps.push(current);
            let (_, prev) = visited[&current];
            current = prev;
        }
        steps.push(start);
        steps.reverse();
        steps
    };

    Some(Path::new(steps, visited[&goal].0))
}
