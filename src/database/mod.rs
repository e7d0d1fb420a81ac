//! The database of compressed Paths between neighboring Regions.
//!
//! A [`RegionDatabase`] stores one [`AdjacencyRow`] per Region, at the [`Location`] derived
//! from the Region's id (see [`region_location`](crate::region_location)). Rows of removed
//! Regions are cleared and their Location goes back to the [`SlotAllocator`], to be reused by
//! the next Region that is created.

mod config;
pub use config::DatabaseConfig;

mod slots;
pub use slots::SlotAllocator;

mod row;
pub use row::{AdjacencyRow, Edge};

mod build;

mod query;

mod update;
pub use update::{RegionChange, RegionSeed};

mod invariants;

mod snapshot;
pub use snapshot::{RowSnapshot, TableSnapshot};

use crate::{region_id, region_location, Error, Location, RegionId, Result, StateId};

/// The precomputed Paths between all neighboring Regions of an abstraction.
///
/// See the [crate documentation](crate) for an overview.
#[derive(Clone, Debug)]
pub struct RegionDatabase {
    table: Vec<Option<AdjacencyRow>>,
    slots: SlotAllocator,
    config: DatabaseConfig,
}

impl RegionDatabase {
    /// The config the database was created with
    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// The number of live Regions
    pub fn region_count(&self) -> usize {
        self.slots.live_count()
    }

    /// The number of Locations, including free ones
    pub fn capacity(&self) -> usize {
        self.table.len()
    }

    /// The Locations that will be handed to the next new Regions, last one first
    pub fn free_locations(&self) -> &[Location] {
        self.slots.free_locations()
    }

    /// `true` if `id` refers to a live Region
    pub fn contains(&self, id: RegionId) -> bool {
        self.row(id).is_some()
    }

    /// The ids of all live Regions in ascending order
    pub fn region_ids(&self) -> impl Iterator<Item = RegionId> + '_ {
        self.table
            .iter()
            .enumerate()
            .filter(|(_, row)| row.is_some())
            .map(|(loc, _)| region_id(loc))
    }

    /// The adjacency list of a Region
    pub fn row(&self, id: RegionId) -> Option<&AdjacencyRow> {
        region_location(id).and_then(|loc| self.row_at(loc))
    }

    /// The adjacency list stored at a Location
    pub fn row_at(&self, loc: Location) -> Option<&AdjacencyRow> {
        self.table.get(loc).and_then(Option::as_ref)
    }

    /// The representative State of a Region
    pub fn representative_of(&self, id: RegionId) -> Option<StateId> {
        self.row(id).map(AdjacencyRow::representative)
    }

    /// The stored connection from `from` to `to`, if they are neighbors
    pub fn edge(&self, from: RegionId, to: RegionId) -> Option<&Edge> {
        let target = region_location(to)?;
        self.row(from)?.edge_to(target)
    }

    /// The ids of all Regions with a present entry in the Row of `id`, in Row order
    pub fn neighbor_ids(&self, id: RegionId) -> Vec<RegionId> {
        self.row(id)
            .map(|row| row.edges().map(|(_, e)| region_id(e.target())).collect())
            .unwrap_or_default()
    }

    fn location_of(&self, id: RegionId) -> Result<Location> {
        match region_location(id) {
            Some(loc) if self.row_at(loc).is_some() => Ok(loc),
            _ => Err(Error::UnknownRegion(id)),
        }
    }

    fn live_row(&self, loc: Location) -> Result<&AdjacencyRow> {
        self.row_at(loc)
            .ok_or_else(|| Error::UnknownRegion(region_id(loc)))
    }

    fn live_row_mut(&mut self, loc: Location) -> Result<&mut AdjacencyRow> {
        self.table
            .get_mut(loc)
            .and_then(Option::as_mut)
            .ok_or_else(|| Error::UnknownRegion(region_id(loc)))
    }

    /// Makes sure that the next `count` allocations succeed
    fn reserve(&mut self, count: usize) {
        let free = self.slots.free_locations().len();
        if free >= count {
            return;
        }
        let growth = self
            .config
            .growth_for(self.slots.live_count())
            .max(count - free);
        let range = self.slots.grow(growth);
        self.table.resize(range.end, None);
        debug!(
            "grew the region table by {} to {} locations",
            growth,
            self.table.len()
        );
    }

    fn allocate(&mut self) -> Result<Location> {
        self.reserve(1);
        self.slots.allocate()
    }

    fn release(&mut self, loc: Location) -> Result<()> {
        self.slots.free(loc)?;
        self.table[loc] = None;
        Ok(())
    }
}
