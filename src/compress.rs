//! Reducing full Paths to short lists of Subgoals.

use crate::{oracle::PathOracle, StateId};

/// Reduces a Path to a list of Subgoals.
///
/// The result has to start with the first and end with the last State of the Path, and every
/// two consecutive Subgoals have to be [hill climb reachable](PathOracle::is_hill_climb_reachable).
pub trait PathCompressor {
    /// Compresses `path`. An empty Path stays empty.
    fn compress<O: PathOracle + ?Sized>(&self, oracle: &O, path: &[StateId]) -> Vec<StateId>;
}

/// Keeps only the States where hill climbing from the previous Subgoal would go astray.
///
/// ## Examples
/// ```
/// # use region_pathfinding::prelude::*;
/// let grid = GridMap::from_ascii(
///     "\
///     .....\n\
///     ...@.\n\
///     ...@.\n\
///     .....",
/// );
/// let oracle = GridOracle::new(&grid, MooreNeighborhood::new(5, 4));
/// let path = oracle
///     .find_optimal_path(grid.state_at((4, 1)), grid.state_at((2, 2)))
///     .unwrap();
///
/// let subgoals = HillClimbCompressor.compress(&oracle, &path);
/// assert_eq!(subgoals.first(), Some(&grid.state_at((4, 1))));
/// assert_eq!(subgoals.last(), Some(&grid.state_at((2, 2))));
/// assert!(subgoals.len() < path.len());
/// assert!(subgoals.windows(2).all(|w| oracle.is_hill_climb_reachable(w[0], w[1])));
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct HillClimbCompressor;

impl PathCompressor for HillClimbCompressor {
    fn compress<O: PathOracle + ?Sized>(&self, oracle: &O, path: &[StateId]) -> Vec<StateId> {
        if path.len() <= 2 {
            return path.to_vec();
        }
        let last = path.len() - 1;

        let mut subgoals = vec![path[0]];
        let mut anchor = 0;
        let mut candidate = 1;
        while candidate <= last {
            if oracle.is_hill_climb_reachable(path[anchor], path[candidate]) {
                candidate += 1;
            } else if anchor + 1 == candidate {
                // not even the next step is reachable, so it has to be kept
                anchor = candidate;
                subgoals.push(path[anchor]);
                candidate += 1;
            } else {
                anchor = candidate - 1;
                subgoals.push(path[anchor]);
            }
        }
        if anchor != last {
            subgoals.push(path[last]);
        }
        subgoals
    }
}

/// Keeps every State of the Path.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdentityCompressor;

impl PathCompressor for IdentityCompressor {
    fn compress<O: PathOracle + ?Sized>(&self, _oracle: &O, path: &[StateId]) -> Vec<StateId> {
        path.to_vec()
    }
}
