//! Splitting a Grid into Regions and keeping those Regions up to date when Tiles change.

mod classify;

use crate::{
    compress::PathCompressor,
    database::RegionDatabase,
    grid::GridMap,
    neighbors::Neighborhood,
    oracle::GridOracle,
    region::{Region, RegionMap, RegionModel},
    utils::IterExt,
    Point, RegionId, Result, StateId, REGION_ID_OFFSET,
};

use hashbrown::HashSet;

/// A [`RegionModel`] that splits the Grid into square Sectors.
///
/// The open Tiles of every Sector are split into their connected components, each of which
/// forms a Region. Two Tiles are connected if a single step of the [`Neighborhood`] leads
/// from one to the other. The representative of a Region is the member closest to the center
/// of all members, and two Regions are neighbors if a single step connects them.
///
/// The Regions only depend on the current Grid, not on the edits that led to it.
///
/// ## Examples
/// ```
/// # use region_pathfinding::prelude::*;
/// let grid = GridMap::from_ascii(
///     "\
///     ..@...\n\
///     ..@...\n\
///     ..@...",
/// );
/// let regions = SectorAbstraction::new(&grid, ManhattanNeighborhood::new(6, 3), 3);
///
/// // one Region per Sector, separated by the wall
/// assert_eq!(regions.region_ids(), vec![1, 2]);
/// assert_eq!(regions.region(1).unwrap().representative(), grid.state_at((0, 1)));
/// assert_eq!(regions.region(2).unwrap().representative(), grid.state_at((4, 1)));
/// assert!(regions.region(1).unwrap().neighbors().is_empty());
/// ```
#[derive(Clone, Debug)]
pub struct SectorAbstraction<N: Neighborhood> {
    width: usize,
    height: usize,
    sector_size: usize,
    neighborhood: N,
    regions: RegionMap,
}

impl<N: Neighborhood> SectorAbstraction<N> {
    /// Splits `grid` into Regions.
    ///
    /// ## Arguments
    /// - `grid` - the current Grid
    /// - `neighborhood` - the moves that connect Tiles. (See [`Neighborhood`])
    /// - `sector_size` - the side length of a Sector. Smaller Sectors mean more Regions, but
    ///   cheaper updates.
    ///
    /// Regions are numbered from [`REGION_ID_OFFSET`], Sector by Sector in row-major order.
    pub fn new(grid: &GridMap, neighborhood: N, sector_size: usize) -> SectorAbstraction<N> {
        let mut abstraction = SectorAbstraction {
            width: grid.width(),
            height: grid.height(),
            sector_size: sector_size.max(1),
            neighborhood,
            regions: RegionMap::new(),
        };

        let mut next_id = REGION_ID_OFFSET;
        let size = abstraction.sector_size;
        for sector_y in (0..abstraction.height).step_by(size) {
            for sector_x in (0..abstraction.width).step_by(size) {
                let open = abstraction
                    .sector_states((sector_x, sector_y))
                    .filter(|&s| grid.is_open(s))
                    .to_vec();
                for members in abstraction.components(grid, &open) {
                    let representative = abstraction.representative(&members);
                    abstraction
                        .regions
                        .insert_region(next_id, Region::new(representative, members, []));
                    next_id += 1;
                }
            }
        }

        let links = abstraction
            .regions
            .region_ids()
            .into_iter()
            .map(|id| {
                let members = abstraction.regions.region(id).map(Region::members);
                let neighbors = abstraction.adjacent_owners(grid, members.unwrap_or(&[]), |s| {
                    abstraction.regions.region_of(s)
                });
                (id, neighbors)
            })
            .to_vec();
        for (id, neighbors) in links {
            for neighbor in neighbors {
                abstraction.regions.add_neighbor(id, neighbor);
            }
        }

        debug!(
            "split a {}x{} grid into {} regions",
            abstraction.width,
            abstraction.height,
            abstraction.regions.len()
        );
        abstraction
    }

    /// The side length of a Sector
    pub fn sector_size(&self) -> usize {
        self.sector_size
    }

    /// The Neighborhood used to connect Tiles
    pub fn neighborhood(&self) -> &N {
        &self.neighborhood
    }

    /// The underlying storage of all Regions
    pub fn regions(&self) -> &RegionMap {
        &self.regions
    }

    /// The top left corner of the Sector containing `state`
    pub fn sector_of(&self, state: StateId) -> Point {
        let (x, y) = self.point_of(state);
        (x - x % self.sector_size, y - y % self.sector_size)
    }

    /// Updates the Regions and `database` after the Tile `cell` of `grid` was changed.
    ///
    /// `grid` has to contain the change already. The Regions are adjusted through
    /// [`classify`](SectorAbstraction::classify), the resulting changes are applied to
    /// `database` and finally every stored Path that may run over `cell` is recalculated.
    ///
    /// Returns the ids of all created or rebuilt Regions. Nothing happens if `cell` is in
    /// the state the Regions already expect.
    ///
    /// ## Errors
    /// Any error of [`RegionDatabase::apply`]. Some changes may already have been applied at
    /// that point, so the database has to be rebuilt.
    pub fn apply_edit<C>(
        &mut self,
        grid: &GridMap,
        cell: StateId,
        database: &mut RegionDatabase,
        compressor: &C,
    ) -> Result<Vec<RegionId>>
    where
        C: PathCompressor + ?Sized,
    {
        let now_blocked = !grid.is_open(cell);
        if now_blocked == self.regions.region_of(cell).is_none() {
            return Ok(vec![]);
        }

        let changes = self.classify(grid, cell)?;
        let oracle = GridOracle::new(grid, self.neighborhood.clone());

        let mut created = vec![];
        for change in changes {
            created.extend(database.apply(change, self, &oracle, compressor)?);
        }
        let touched = self.block_around(cell);
        database.revalidate_edges(&touched, now_blocked, &oracle, compressor)?;

        Ok(created)
    }

    fn point_of(&self, state: StateId) -> Point {
        let state = state as usize;
        (state % self.width, state / self.width)
    }

    fn state_at(&self, (x, y): Point) -> StateId {
        (y * self.width + x) as StateId
    }

    fn same_sector(&self, a: StateId, b: StateId) -> bool {
        self.sector_of(a) == self.sector_of(b)
    }

    /// All States of the Sector starting at `corner`, in ascending order
    fn sector_states(&self, corner: Point) -> impl Iterator<Item = StateId> + '_ {
        let x_end = (corner.0 + self.sector_size).min(self.width);
        let y_end = (corner.1 + self.sector_size).min(self.height);
        (corner.1..y_end)
            .flat_map(move |y| (corner.0..x_end).map(move |x| self.state_at((x, y))))
    }

    /// `cell` and all States around it, which covers every State whose moves depend on `cell`
    fn block_around(&self, cell: StateId) -> Vec<StateId> {
        let (x, y) = self.point_of(cell);
        let mut block = vec![];
        for ny in y.saturating_sub(1)..(y + 2).min(self.height) {
            for nx in x.saturating_sub(1)..(x + 2).min(self.width) {
                block.push(self.state_at((nx, ny)));
            }
        }
        block
    }

    /// Collects all States connected to `start` through States that are `allowed`
    fn flood(
        &self,
        grid: &GridMap,
        start: StateId,
        allowed: impl Fn(StateId) -> bool,
    ) -> Vec<StateId> {
        let mut seen = HashSet::new();
        seen.insert(start);
        let mut members = vec![start];
        let mut stack = vec![start];

        let mut buffer = vec![];
        let mut moves = vec![];
        while let Some(current) = stack.pop() {
            moves.clear();
            grid.valid_moves(&self.neighborhood, current, &mut buffer, &mut moves);
            for &(next, _) in moves.iter() {
                if allowed(next) && seen.insert(next) {
                    members.push(next);
                    stack.push(next);
                }
            }
        }
        members.sort_unstable();
        members
    }

    /// Splits the sorted `states` into connected components, ordered by their smallest member
    fn components(&self, grid: &GridMap, states: &[StateId]) -> Vec<Vec<StateId>> {
        let mut assigned = HashSet::new();
        let mut components = vec![];
        for &state in states {
            if assigned.contains(&state) {
                continue;
            }
            let component = self.flood(grid, state, |s| states.binary_search(&s).is_ok());
            assigned.extend(component.iter().copied());
            components.push(component);
        }
        components
    }

    /// The member closest to the center of all members. Ties go to the smaller State.
    fn representative(&self, members: &[StateId]) -> StateId {
        debug_assert!(!members.is_empty());
        let count = members.len() as i64;
        let (sum_x, sum_y) = members.iter().fold((0i64, 0i64), |(sx, sy), &s| {
            let (x, y) = self.point_of(s);
            (sx + x as i64, sy + y as i64)
        });
        members
            .iter()
            .copied()
            .min_by_key(|&s| {
                let (x, y) = self.point_of(s);
                let dx = x as i64 * count - sum_x;
                let dy = y as i64 * count - sum_y;
                (dx * dx + dy * dy, s)
            })
            .unwrap_or_default()
    }

    /// The owners of all States one step away from the sorted `members`, excluding the
    /// members themselves
    fn adjacent_owners(
        &self,
        grid: &GridMap,
        members: &[StateId],
        owner: impl Fn(StateId) -> Option<RegionId>,
    ) -> Vec<RegionId> {
        let mut owners = vec![];
        let mut buffer = vec![];
        let mut moves = vec![];
        for &state in members {
            moves.clear();
            grid.valid_moves(&self.neighborhood, state, &mut buffer, &mut moves);
            for &(next, _) in moves.iter() {
                if members.binary_search(&next).is_err() {
                    owners.extend(owner(next));
                }
            }
        }
        owners.into_iter().to_sorted_set()
    }
}

impl<N: Neighborhood> RegionModel for SectorAbstraction<N> {
    fn region(&self, id: RegionId) -> Option<&Region> {
        self.regions.region(id)
    }

    fn region_of(&self, state: StateId) -> Option<RegionId> {
        self.regions.region_of(state)
    }

    fn region_ids(&self) -> Vec<RegionId> {
        self.regions.region_ids()
    }

    fn insert_region(&mut self, id: RegionId, region: Region) -> Option<Region> {
        self.regions.insert_region(id, region)
    }

    fn remove_region(&mut self, id: RegionId) -> Option<Region> {
        self.regions.remove_region(id)
    }

    fn add_neighbor(&mut self, id: RegionId, neighbor: RegionId) {
        self.regions.add_neighbor(id, neighbor)
    }

    fn remove_neighbor(&mut self, id: RegionId, neighbor: RegionId) {
        self.regions.remove_neighbor(id, neighbor)
    }
}
