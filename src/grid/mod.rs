//! The Grid that Regions are carved out of, and searches on it.

mod a_star;
pub use a_star::a_star_search;

use crate::{neighbors::Neighborhood, Cost, Point, StateId};

use std::cmp::Ordering;

#[derive(PartialEq, Eq)]
pub(crate) struct HeuristicElement<Id>(pub Id, pub Cost, pub Cost);
impl<Id: Eq> PartialOrd for HeuristicElement<Id> {
    fn partial_cmp(&self, rhs: &Self) -> Option<Ordering> {
        Some(self.cmp(rhs))
    }
}
impl<Id: Eq> Ord for HeuristicElement<Id> {
    fn cmp(&self, rhs: &Self) -> Ordering {
        rhs.2.cmp(&self.2)
    }
}

#[derive(PartialEq, Eq)]
pub(crate) struct Element<Id>(pub Id, pub Cost);
impl<Id: Eq> PartialOrd for Element<Id> {
    fn partial_cmp(&self, rhs: &Self) -> Option<Ordering> {
        Some(self.cmp(rhs))
    }
}
impl<Id: Eq> Ord for Element<Id> {
    fn cmp(&self, rhs: &Self) -> Ordering {
        rhs.1.cmp(&self.1)
    }
}

/// A rectangular Grid of open and blocked Tiles.
///
/// Every Tile is addressed by its [`StateId`] `y * width + x`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridMap {
    width: usize,
    height: usize,
    blocked: Vec<bool>,
}

impl GridMap {
    /// Creates a Grid where every Tile is open
    pub fn new(width: usize, height: usize) -> GridMap {
        GridMap {
            width,
            height,
            blocked: vec![false; width * height],
        }
    }

    /// Parses a Grid from one line of text per row.
    ///
    /// `@`, `#`, `T` and `W` are blocked, anything else is open. Leading and trailing
    /// whitespace of every line is ignored, as are empty lines.
    ///
    /// ## Examples
    /// ```
    /// # use region_pathfinding::grid::GridMap;
    /// let grid = GridMap::from_ascii(
    ///     "\
    ///     ..@\n\
    ///     ...",
    /// );
    /// assert_eq!((grid.width(), grid.height()), (3, 2));
    /// assert!(!grid.is_open(grid.state_at((2, 0))));
    /// assert!(grid.is_open(grid.state_at((2, 1))));
    /// ```
    pub fn from_ascii(map: &str) -> GridMap {
        let rows: Vec<&str> = map
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        let height = rows.len();
        let width = rows.iter().map(|row| row.chars().count()).max().unwrap_or(0);

        let mut grid = GridMap::new(width, height);
        for (y, row) in rows.iter().enumerate() {
            for (x, c) in row.chars().enumerate() {
                grid.blocked[y * width + x] = matches!(c, '@' | '#' | 'T' | 'W');
            }
        }
        grid
    }

    /// The width of the Grid
    pub fn width(&self) -> usize {
        self.width
    }

    /// The height of the Grid
    pub fn height(&self) -> usize {
        self.height
    }

    /// The total number of Tiles
    pub fn len(&self) -> usize {
        self.blocked.len()
    }

    /// `true` if the Grid has no Tiles
    pub fn is_empty(&self) -> bool {
        self.blocked.is_empty()
    }

    /// The [`StateId`] of a Point
    pub fn state_at(&self, (x, y): Point) -> StateId {
        debug_assert!(x < self.width && y < self.height);
        (y * self.width + x) as StateId
    }

    /// The Point of a [`StateId`]
    pub fn point_of(&self, state: StateId) -> Point {
        let index = state as usize;
        (index % self.width, index / self.width)
    }

    /// `true` if the State is inside the Grid and not blocked
    pub fn is_open(&self, state: StateId) -> bool {
        self.blocked
            .get(state as usize)
            .map(|blocked| !blocked)
            .unwrap_or(false)
    }

    /// Turns a Tile into a wall (`true`) or opens it (`false`).
    ///
    /// Returns `true` if that changed anything.
    pub fn set_blocked(&mut self, state: StateId, blocked: bool) -> bool {
        let tile = &mut self.blocked[state as usize];
        let changed = *tile != blocked;
        *tile = blocked;
        changed
    }

    /// Checks if a single step between two neighboring States is allowed.
    ///
    /// Both States have to be open, and a diagonal step may not cut the corner of a wall.
    pub fn can_step(&self, from: Point, to: Point) -> bool {
        if !self.is_open(self.state_at(from)) || !self.is_open(self.state_at(to)) {
            return false;
        }
        if from.0 != to.0 && from.1 != to.1 {
            self.is_open(self.state_at((to.0, from.1)))
                && self.is_open(self.state_at((from.0, to.1)))
        } else {
            true
        }
    }

    /// Collects every State reachable from `state` in one step together with the Cost of that
    /// step into `target`. `buffer` is scratch space for the neighborhood.
    pub fn valid_moves<N: Neighborhood>(
        &self,
        neighborhood: &N,
        state: StateId,
        buffer: &mut Vec<Point>,
        target: &mut Vec<(StateId, Cost)>,
    ) {
        let point = self.point_of(state);
        buffer.clear();
        neighborhood.get_all_neighbors(point, buffer);
        for &other in buffer.iter() {
            if self.can_step(point, other) {
                target.push((self.state_at(other), neighborhood.step_cost(point, other)));
            }
        }
    }
}
