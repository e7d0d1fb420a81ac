use super::Path;
use crate::{Cost, StateId};

/// The result of a query: a Path between two States, compressed to a list of Subgoals.
///
/// Walking from `start` to the first Subgoal, from there to the next one and so on until
/// `goal`, using hill climbing for every section, reproduces the Path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubgoalPath {
    start: StateId,
    goal: StateId,
    subgoals: Vec<StateId>,
    cost: Cost,
}

impl SubgoalPath {
    /// A Path that does not move
    pub fn trivial(state: StateId) -> SubgoalPath {
        SubgoalPath {
            start: state,
            goal: state,
            subgoals: vec![],
            cost: 0,
        }
    }

    /// Creates a SubgoalPath from a full waypoint list (including both endpoints).
    ///
    /// ## Panics
    /// if `waypoints` is empty
    ///
    /// ## Examples
    /// ```
    /// # use region_pathfinding::path::SubgoalPath;
    /// let path = SubgoalPath::from_waypoints(&[3, 7, 9, 12], 40);
    ///
    /// assert_eq!(path.start(), 3);
    /// assert_eq!(path.goal(), 12);
    /// assert_eq!(path.subgoals(), &[7, 9]);
    /// assert_eq!(path.waypoints().collect::<Vec<_>>(), vec![3, 7, 9, 12]);
    /// ```
    pub fn from_waypoints(waypoints: &[StateId], cost: Cost) -> SubgoalPath {
        match waypoints {
            [] => panic!("a SubgoalPath needs at least one waypoint"),
            [single] => SubgoalPath::trivial(*single),
            [start, inner @ .., goal] => SubgoalPath {
                start: *start,
                goal: *goal,
                subgoals: inner.to_vec(),
                cost,
            },
        }
    }

    /// The first State of the Path
    pub fn start(&self) -> StateId {
        self.start
    }

    /// The last State of the Path
    pub fn goal(&self) -> StateId {
        self.goal
    }

    /// The Subgoals between `start` and `goal`, excluding both
    pub fn subgoals(&self) -> &[StateId] {
        &self.subgoals
    }

    /// The total Cost of the Path
    pub fn cost(&self) -> Cost {
        self.cost
    }

    /// `start`, all Subgoals and `goal`. A trivial Path yields its State once.
    pub fn waypoints(&self) -> impl Iterator<Item = StateId> + '_ {
        let goal = if self.start == self.goal && self.subgoals.is_empty() {
            None
        } else {
            Some(self.goal)
        };
        std::iter::once(self.start)
            .chain(self.subgoals.iter().copied())
            .chain(goal)
    }
}

impl From<&Path<StateId>> for SubgoalPath {
    fn from(path: &Path<StateId>) -> SubgoalPath {
        SubgoalPath::from_waypoints(path.as_slice(), path.cost())
    }
}
