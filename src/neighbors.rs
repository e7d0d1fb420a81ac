//! A crate with the most common Neighborhoods

use crate::{Cost, Point};
use std::fmt::Debug;

/// The Cost of a step along one of the 4 cardinal directions
pub const CARDINAL_COST: Cost = 10;
/// The Cost of a diagonal step. An integer approximation of `CARDINAL_COST * sqrt(2)`
pub const DIAGONAL_COST: Cost = 14;

/// Defines how a Path can move along the Grid.
///
/// Different Scenarios may have different constraints as to how a Path may be formed.
/// For example if Agents can only move along the 4 cardinal directions, any Paths generated should
/// reflect that by only containing those steps.
///
/// This Trait is a generalized solution to that problem. It provides a function to query all
/// neighboring Points of an existing Point, the Cost of such a step and a Heuristic for how long
/// it might take to reach a goal from a Point.
///
/// The most common implementations of this Trait are already provided by this Module:
/// - [`ManhattanNeighborhood`] for Agents that can move
/// up, down, left or right
/// - [`MooreNeighborhood`] for Agents that can move
/// up, down, left, right, as well as the 4 diagonals (up-right, ...)
pub trait Neighborhood: Clone + Debug + Send + Sync {
    /// Provides a list of Neighbors of a Point
    ///
    /// Note that it is not necessary to check weather the Tile at a Point is solid or not.
    /// That check is done later.
    fn get_all_neighbors(&self, point: Point, target: &mut Vec<Point>);
    /// The Cost of a single step from `point` to one of its neighbors
    fn step_cost(&self, point: Point, neighbor: Point) -> Cost;
    /// Gives a Heuristic for how long it takes to reach `goal` from `point`.
    ///
    /// The Heuristic has to be admissible (never more than the actual Cost), since the
    /// [`RegionDatabase`](crate::RegionDatabase) relies on it to decide which stored Paths
    /// might have been affected by a change.
    fn heuristic(&self, point: Point, goal: Point) -> Cost;
}

fn diff(a: usize, b: usize) -> usize {
    if a > b {
        a - b
    } else {
        b - a
    }
}

fn offset_neighbors(
    (width, height): (usize, usize),
    point: Point,
    offsets: &[(isize, isize)],
    target: &mut Vec<Point>,
) {
    target.extend(
        offsets
            .iter()
            .map(|(dx, dy)| (point.0 as isize + dx, point.1 as isize + dy))
            .filter(|(x, y)| *x >= 0 && *y >= 0 && (*x as usize) < width && (*y as usize) < height)
            .map(|(x, y)| (x as usize, y as usize)),
    );
}

/// A Neighborhood for Agents moving along the 4 cardinal directions.
///
/// Also known as [Von Neumann Neighborhood](https://en.wikipedia.org/wiki/Von_Neumann_neighborhood),
/// Manhattan Metric or [Taxicab Geometry](https://en.wikipedia.org/wiki/Taxicab_geometry).
///
/// ```no_code
/// A: Agent, o: reachable in one step
///   o
///   |
/// o-A-o
///   |
///   o
/// ```
#[derive(Clone, Copy, Debug)]
pub struct ManhattanNeighborhood {
    width: usize,
    height: usize,
}

impl ManhattanNeighborhood {
    /// Creates a new ManhattanNeighborhood.
    ///
    /// `width` and `height` are the size of the Grid to move on.
    pub fn new(width: usize, height: usize) -> ManhattanNeighborhood {
        ManhattanNeighborhood { width, height }
    }
}

impl Neighborhood for ManhattanNeighborhood {
    fn get_all_neighbors(&self, point: Point, target: &mut Vec<Point>) {
        offset_neighbors(
            (self.width, self.height),
            point,
            &[(0, -1), (1, 0), (0, 1), (-1, 0)],
            target,
        );
    }
    fn step_cost(&self, _point: Point, _neighbor: Point) -> Cost {
        CARDINAL_COST
    }
    fn heuristic(&self, point: Point, goal: Point) -> Cost {
        (diff(point.0, goal.0) + diff(point.1, goal.1)) * CARDINAL_COST
    }
}

/// A Neighborhood for Agents moving along the 4 cardinal directions and the 4 diagonals.
///
/// Also known as [Moore Neighborhood](https://en.wikipedia.org/wiki/Moore_neighborhood).
/// Diagonal steps cost [`DIAGONAL_COST`], which makes the matching Heuristic the octile distance.
///
/// ```no_code
/// A: Agent, o: reachable in one step
/// o o o
///  \|/
/// o-A-o
///  /|\
/// o o o
/// ```
#[derive(Clone, Copy, Debug)]
pub struct MooreNeighborhood {
    width: usize,
    height: usize,
}

impl MooreNeighborhood {
    /// Creates a new MooreNeighborhood.
    ///
    /// `width` and `height` are the size of the Grid to move on.
    pub fn new(width: usize, height: usize) -> MooreNeighborhood {
        MooreNeighborhood { width, height }
    }
}

impl Neighborhood for MooreNeighborhood {
    fn get_all_neighbors(&self, point: Point, target: &mut Vec<Point>) {
        offset_neighbors(
            (self.width, self.height),
            point,
            &[
                (0, -1),
                (1, -1),
                (1, 0),
                (1, 1),
                (0, 1),
                (-1, 1),
                (-1, 0),
                (-1, -1),
            ],
            target,
        );
    }
    fn step_cost(&self, point: Point, neighbor: Point) -> Cost {
        if point.0 != neighbor.0 && point.1 != neighbor.1 {
            DIAGONAL_COST
        } else {
            CARDINAL_COST
        }
    }
    fn heuristic(&self, point: Point, goal: Point) -> Cost {
        let (dx, dy) = (diff(point.0, goal.0), diff(point.1, goal.1));
        let (min, max) = if dx < dy { (dx, dy) } else { (dy, dx) };
        min * DIAGONAL_COST + (max - min) * CARDINAL_COST
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manhattan_get_all_neighbors() {
        let neighborhood = ManhattanNeighborhood::new(5, 5);
        let mut target = vec![];
        neighborhood.get_all_neighbors((0, 2), &mut target);
        assert_eq!(target, vec![(0, 1), (1, 2), (0, 3)]);
    }

    #[test]
    fn manhattan_heuristic() {
        let neighborhood = ManhattanNeighborhood::new(5, 5);
        assert_eq!(neighborhood.heuristic((3, 1), (0, 0)), (3 + 1) * CARDINAL_COST);
    }

    #[test]
    fn moore_get_all_neighbors() {
        let neighborhood = MooreNeighborhood::new(5, 5);
        let mut target = vec![];
        neighborhood.get_all_neighbors((0, 2), &mut target);
        assert_eq!(target, vec![(0, 1), (1, 1), (1, 2), (1, 3), (0, 3)]);
    }

    #[test]
    fn moore_heuristic() {
        let neighborhood = MooreNeighborhood::new(5, 5);
        assert_eq!(
            neighborhood.heuristic((3, 1), (0, 0)),
            DIAGONAL_COST + 2 * CARDINAL_COST
        );
        assert_eq!(neighborhood.step_cost((1, 1), (2, 2)), DIAGONAL_COST);
        assert_eq!(neighborhood.step_cost((1, 1), (1, 2)), CARDINAL_COST);
    }
}
