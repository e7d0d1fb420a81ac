//! The low-level searches the [`RegionDatabase`](crate::RegionDatabase) relies on.

use crate::{
    grid::{a_star_search, GridMap},
    neighbors::Neighborhood,
    path::Path,
    Cost, StateId,
};

/// Optimal-path and reachability primitives between two States of the Grid.
///
/// Implementations are expected to be pure: calling them has no effect on anything the
/// database can observe.
pub trait PathOracle {
    /// Finds the optimal Path from `from` to `to`, or `None` if `to` is unreachable.
    ///
    /// The Path contains both endpoints.
    fn find_optimal_path(&self, from: StateId, to: StateId) -> Option<Path<StateId>>;

    /// Checks if greedily moving towards `to` reaches it from `from`.
    fn is_hill_climb_reachable(&self, from: StateId, to: StateId) -> bool;

    /// An admissible estimate of the Cost between two States.
    fn heuristic(&self, from: StateId, to: StateId) -> Cost;
}

/// A [`PathOracle`] searching a [`GridMap`] with the moves of a [`Neighborhood`].
#[derive(Clone, Copy, Debug)]
pub struct GridOracle<'a, N: Neighborhood> {
    grid: &'a GridMap,
    neighborhood: N,
}

impl<'a, N: Neighborhood> GridOracle<'a, N> {
    /// Creates a new GridOracle on the current state of `grid`
    pub fn new(grid: &'a GridMap, neighborhood: N) -> Self {
        GridOracle { grid, neighborhood }
    }

    /// Follows the hill climbing walk from `from` towards `to`.
    ///
    /// Every step moves to the first neighbor with the lowest Heuristic towards `to`. The walk
    /// fails as soon as that Heuristic is not strictly lower than the current one. On success,
    /// the returned list contains both endpoints.
    ///
    /// ## Examples
    /// ```
    /// # use region_pathfinding::prelude::*;
    /// let grid = GridMap::from_ascii(
    ///     "\
    ///     ....\n\
    ///     .@@.\n\
    ///     ....",
    /// );
    /// let oracle = GridOracle::new(&grid, MooreNeighborhood::new(4, 3));
    ///
    /// let walk = oracle.hill_climb(grid.state_at((0, 0)), grid.state_at((3, 0)));
    /// assert_eq!(walk.map(|walk| walk.len()), Some(4));
    ///
    /// // straight down is blocked by the wall
    /// assert!(oracle.hill_climb(grid.state_at((1, 0)), grid.state_at((1, 2))).is_none());
    /// ```
    pub fn hill_climb(&self, from: StateId, to: StateId) -> Option<Vec<StateId>> {
        if !self.grid.is_open(from) || !self.grid.is_open(to) {
            return None;
        }
        let goal = self.grid.point_of(to);
        let heuristic =
            |state: StateId| self.neighborhood.heuristic(self.grid.point_of(state), goal);

        let mut walk = vec![from];
        let mut current = from;
        let mut current_h = heuristic(current);

        let mut buffer = vec![];
        let mut moves = vec![];
        while current != to {
            moves.clear();
            self.grid
                .valid_moves(&self.neighborhood, current, &mut buffer, &mut moves);

            let mut best: Option<(StateId, Cost)> = None;
            for &(next, _) in moves.iter() {
                let h = heuristic(next);
                if best.map(|(_, best_h)| h < best_h).unwrap_or(true) {
                    best = Some((next, h));
                }
            }
            match best {
                Some((next, h)) if h < current_h => {
                    walk.push(next);
                    current = next;
                    current_h = h;
                }
                _ => return None,
            }
        }
        Some(walk)
    }
}

impl<N: Neighborhood> PathOracle for GridOracle<'_, N> {
    fn find_optimal_path(&self, from: StateId, to: StateId) -> Option<Path<StateId>> {
        a_star_search(self.grid, &self.neighborhood, from, to)
    }

    fn is_hill_climb_reachable(&self, from: StateId, to: StateId) -> bool {
        self.hill_climb(from, to).is_some()
    }

    fn heuristic(&self, from: StateId, to: StateId) -> Cost {
        self.neighborhood
            .heuristic(self.grid.point_of(from), self.grid.point_of(to))
    }
}
