use super::SectorAbstraction;
use crate::{
    database::{RegionChange, RegionSeed},
    error::violation,
    grid::GridMap,
    neighbors::Neighborhood,
    region::RegionModel,
    utils::IterExt,
    Error, RegionId, Result, StateId,
};

use hashbrown::HashSet;

/// The changes found so far, plus what they do to the ownership of States
#[derive(Debug, Default)]
struct Classification {
    changes: Vec<RegionChange>,
    /// States that will belong to a created or rebuilt Region
    rebuilt: HashSet<StateId>,
    /// Regions that are eliminated or rebuilt
    replaced: HashSet<RegionId>,
}

impl<N: Neighborhood> SectorAbstraction<N> {
    /// Finds the [`RegionChange`]s caused by a change of the Tile `cell`.
    ///
    /// `grid` has to contain the change already. Regions that keep their id and
    /// representative are updated right away. Everything else is left to the returned changes,
    /// which have to be applied in order with [`RegionDatabase::apply`], passing this
    /// abstraction as the model.
    ///
    /// A blocked Tile leads to an elimination, a partition, or nothing for the Region that
    /// contained it. An opened Tile leads to a creation, to a partition that rebuilds the Region
    /// it joins (after eliminating every other Region merged into it), or nothing. Both end
    /// with corner-blockers and unblockers for the pairs of remaining Regions around `cell`
    /// that stopped or started being neighbors.
    ///
    /// [`RegionDatabase::apply`]: crate::RegionDatabase::apply
    ///
    /// ## Examples
    /// ```
    /// # use region_pathfinding::prelude::*;
    /// let mut grid = GridMap::from_ascii(
    ///     "\
    ///     ...\n\
    ///     @@.\n\
    ///     ...",
    /// );
    /// let mut regions = SectorAbstraction::new(&grid, ManhattanNeighborhood::new(3, 3), 3);
    /// assert_eq!(regions.region_ids(), vec![1]);
    ///
    /// // closing the gap splits the Region into the top and the bottom row
    /// let cell = grid.state_at((2, 1));
    /// grid.set_blocked(cell, true);
    ///
    /// match &regions.classify(&grid, cell).unwrap()[..] {
    ///     [RegionChange::Partition { region: 1, pieces }] => {
    ///         assert_eq!(pieces[0].members, vec![0, 1, 2]);
    ///         assert_eq!(pieces[1].members, vec![6, 7, 8]);
    ///     }
    ///     other => panic!("unexpected changes: {:?}", other),
    /// }
    /// ```
    pub fn classify(&mut self, grid: &GridMap, cell: StateId) -> Result<Vec<RegionChange>> {
        if grid.width() != self.width || grid.height() != self.height {
            return Err(violation!(
                "expected a {}x{} grid, got {}x{}",
                self.width,
                self.height,
                grid.width(),
                grid.height()
            ));
        }

        let mut result = Classification::default();
        match (grid.is_open(cell), self.regions.region_of(cell)) {
            (false, Some(id)) => self.wall_placed(grid, cell, id, &mut result)?,
            (true, None) => self.wall_removed(grid, cell, &mut result)?,
            _ => return Ok(vec![]),
        }
        self.adjacency_changes(grid, cell, &mut result)?;

        trace!("classified a change at {}: {:?}", cell, result.changes);
        Ok(result.changes)
    }

    fn wall_placed(
        &mut self,
        grid: &GridMap,
        cell: StateId,
        id: RegionId,
        result: &mut Classification,
    ) -> Result<()> {
        let region = self.regions.region(id).ok_or(Error::UnknownRegion(id))?;
        let old_representative = region.representative();
        let remaining = region
            .members()
            .iter()
            .copied()
            .filter(|&s| s != cell)
            .to_vec();

        let mut pieces = self.components(grid, &remaining);
        match pieces.len() {
            0 => {
                result.replaced.insert(id);
                result.changes.push(RegionChange::Elimination { region: id });
            }
            1 => {
                let members = pieces.remove(0);
                let representative = self.representative(&members);
                if representative == old_representative {
                    self.regions.set_members(id, representative, members);
                } else {
                    self.rebuild(grid, id, vec![members], result);
                }
            }
            _ => self.rebuild(grid, id, pieces, result),
        }
        Ok(())
    }

    fn wall_removed(
        &mut self,
        grid: &GridMap,
        cell: StateId,
        result: &mut Classification,
    ) -> Result<()> {
        let component = self.flood(grid, cell, |s| self.same_sector(cell, s));
        let merged = component
            .iter()
            .filter_map(|&s| self.regions.region_of(s))
            .to_sorted_set();

        match merged[..] {
            [] => {
                let representative = self.representative(&component);
                let neighbors =
                    self.adjacent_owners(grid, &component, |s| self.regions.region_of(s));
                result.rebuilt.extend(component.iter().copied());
                let seed = RegionSeed::new(representative, component, neighbors);
                result.changes.push(if seed.neighbors.is_empty() {
                    RegionChange::SolitaryCreation { seed }
                } else {
                    RegionChange::ConnectedCreation { seed }
                });
            }
            [id] => {
                let old_representative = self
                    .regions
                    .region(id)
                    .ok_or(Error::UnknownRegion(id))?
                    .representative();
                let representative = self.representative(&component);
                if representative == old_representative {
                    self.regions.set_members(id, representative, component);
                } else {
                    self.rebuild(grid, id, vec![component], result);
                }
            }
            [survivor, ..] => {
                for &other in merged[1..].iter() {
                    result.replaced.insert(other);
                    result.changes.push(RegionChange::Elimination { region: other });
                }
                self.rebuild(grid, survivor, vec![component], result);
            }
        }
        Ok(())
    }

    /// Replaces Region `id` by `pieces`. The first piece keeps the id.
    fn rebuild(
        &self,
        grid: &GridMap,
        id: RegionId,
        pieces: Vec<Vec<StateId>>,
        result: &mut Classification,
    ) {
        let seeds = pieces
            .into_iter()
            .map(|members| {
                let representative = self.representative(&members);
                let neighbors =
                    self.adjacent_owners(grid, &members, |s| self.regions.region_of(s));
                result.rebuilt.extend(members.iter().copied());
                RegionSeed::new(representative, members, neighbors)
            })
            .to_vec();
        result.replaced.insert(id);
        result.changes.push(RegionChange::Partition {
            region: id,
            pieces: seeds,
        });
    }

    /// Compares the neighbors of every remaining Region around `cell` with the ones they have
    /// after the change.
    fn adjacency_changes(
        &self,
        grid: &GridMap,
        cell: StateId,
        result: &mut Classification,
    ) -> Result<()> {
        let owner_after = |s: StateId| {
            if result.rebuilt.contains(&s) || !grid.is_open(s) {
                None
            } else {
                self.regions
                    .region_of(s)
                    .filter(|id| !result.replaced.contains(id))
            }
        };

        let around = self
            .block_around(cell)
            .into_iter()
            .filter_map(&owner_after)
            .to_sorted_set();

        let mut seen = HashSet::new();
        let mut found = vec![];
        for id in around {
            let region = self.regions.region(id).ok_or(Error::UnknownRegion(id))?;
            let now = self.adjacent_owners(grid, region.members(), &owner_after);
            let before = region
                .neighbors()
                .iter()
                .copied()
                .filter(|n| !result.replaced.contains(n))
                .to_vec();

            for &other in before.iter() {
                let pair = (id.min(other), id.max(other));
                if now.binary_search(&other).is_err() && seen.insert(pair) {
                    found.push(RegionChange::CornerBlocker { a: id, b: other });
                }
            }
            for &other in now.iter() {
                let pair = (id.min(other), id.max(other));
                if before.binary_search(&other).is_err() && seen.insert(pair) {
                    found.push(RegionChange::Unblocker { a: id, b: other });
                }
            }
        }
        result.changes.extend(found);
        Ok(())
    }
}
