//! Regions and the model storing them.

use crate::{
    utils::{sorted_insert, sorted_remove, IterExt},
    RegionId, StateId,
};
use hashbrown::HashMap;

/// A connected group of open States with one representative State.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Region {
    representative: StateId,
    members: Vec<StateId>,
    neighbors: Vec<RegionId>,
}

impl Region {
    /// Creates a new Region. `members` and `neighbors` may be in any order.
    pub fn new(
        representative: StateId,
        members: impl IntoIterator<Item = StateId>,
        neighbors: impl IntoIterator<Item = RegionId>,
    ) -> Region {
        let members = members.into_iter().to_sorted_set();
        debug_assert!(members.binary_search(&representative).is_ok());
        Region {
            representative,
            members,
            neighbors: neighbors.into_iter().to_sorted_set(),
        }
    }

    /// The State that stands in for this Region in Path queries
    pub fn representative(&self) -> StateId {
        self.representative
    }

    /// All States of the Region, sorted
    pub fn members(&self) -> &[StateId] {
        &self.members
    }

    /// The ids of all neighboring Regions, sorted
    pub fn neighbors(&self) -> &[RegionId] {
        &self.neighbors
    }

    /// `true` if `state` belongs to this Region
    pub fn contains(&self, state: StateId) -> bool {
        self.members.binary_search(&state).is_ok()
    }

    /// `true` if `other` is listed as a neighbor
    pub fn is_neighbor(&self, other: RegionId) -> bool {
        self.neighbors.binary_search(&other).is_ok()
    }
}

/// Read/write access to the Regions of an abstraction.
///
/// The [`RegionDatabase`](crate::RegionDatabase) only ever changes which Regions exist and
/// which of them are neighbors. Membership is managed by the abstraction itself.
pub trait RegionModel {
    /// The Region with the given id
    fn region(&self, id: RegionId) -> Option<&Region>;

    /// The Region a State belongs to. Blocked States belong to no Region.
    fn region_of(&self, state: StateId) -> Option<RegionId>;

    /// The ids of all Regions, sorted
    fn region_ids(&self) -> Vec<RegionId>;

    /// Inserts or replaces a Region. Returns the replaced Region.
    fn insert_region(&mut self, id: RegionId, region: Region) -> Option<Region>;

    /// Removes a Region
    fn remove_region(&mut self, id: RegionId) -> Option<Region>;

    /// Adds `neighbor` to the neighbors of `id`. Does nothing if `id` does not exist.
    fn add_neighbor(&mut self, id: RegionId, neighbor: RegionId);

    /// Removes `neighbor` from the neighbors of `id`. Does nothing if `id` does not exist.
    fn remove_neighbor(&mut self, id: RegionId, neighbor: RegionId);
}

/// A [`RegionModel`] with a reverse lookup from States to Regions.
#[derive(Clone, Debug, Default)]
pub struct RegionMap {
    regions: HashMap<RegionId, Region>,
    owners: HashMap<StateId, RegionId>,
}

impl RegionMap {
    /// Creates an empty RegionMap
    pub fn new() -> RegionMap {
        RegionMap::default()
    }

    /// The number of Regions
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// `true` if there are no Regions
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Iterates over all Regions in no particular order
    pub fn iter(&self) -> impl Iterator<Item = (RegionId, &Region)> + '_ {
        self.regions.iter().map(|(id, region)| (*id, region))
    }

    /// Replaces the members and representative of an existing Region, keeping its neighbors.
    ///
    /// Returns `false` if the Region does not exist.
    pub fn set_members(
        &mut self,
        id: RegionId,
        representative: StateId,
        members: impl IntoIterator<Item = StateId>,
    ) -> bool {
        let neighbors = match self.regions.get(&id) {
            Some(region) => region.neighbors.clone(),
            None => return false,
        };
        self.insert_region(id, Region::new(representative, members, neighbors));
        true
    }

    fn release_members(&mut self, id: RegionId, region: &Region) {
        for state in region.members.iter() {
            if self.owners.get(state) == Some(&id) {
                self.owners.remove(state);
            }
        }
    }
}

impl RegionModel for RegionMap {
    fn region(&self, id: RegionId) -> Option<&Region> {
        self.regions.get(&id)
    }

    fn region_of(&self, state: StateId) -> Option<RegionId> {
        self.owners.get(&state).copied()
    }

    fn region_ids(&self) -> Vec<RegionId> {
        self.regions.keys().copied().to_sorted_set()
    }

    fn insert_region(&mut self, id: RegionId, region: Region) -> Option<Region> {
        let old = self.regions.remove(&id);
        if let Some(old) = old.as_ref() {
            self.release_members(id, old);
        }
        for &state in region.members.iter() {
            self.owners.insert(state, id);
        }
        self.regions.insert(id, region);
        old
    }

    fn remove_region(&mut self, id: RegionId) -> Option<Region> {
        let old = self.regions.remove(&id)?;
        self.release_members(id, &old);
        Some(old)
    }

    fn add_neighbor(&mut self, id: RegionId, neighbor: RegionId) {
        if let Some(region) = self.regions.get_mut(&id) {
            sorted_insert(&mut region.neighbors, neighbor);
        }
    }

    fn remove_neighbor(&mut self, id: RegionId, neighbor: RegionId) {
        if let Some(region) = self.regions.get_mut(&id) {
            sorted_remove(&mut region.neighbors, &neighbor);
        }
    }
}
