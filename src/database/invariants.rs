use super::RegionDatabase;
use crate::{error::violation, region_id, Result};

use hashbrown::HashSet;

impl RegionDatabase {
    /// Verifies the consistency of the whole table.
    ///
    /// Checks that
    /// - every Location is either used by a Region or in the free pool, but never both
    /// - every present entry points to a live Region which has an entry pointing back
    /// - no Row contains the same neighbor twice or points to itself
    /// - every stored Path leads from the representative of its Region to the representative
    ///   of the neighbor
    ///
    /// The neighbor, Cost and Path of an entry are stored together, so they cannot go out of
    /// alignment.
    ///
    /// This walks over every entry of the table, so it is meant for tests and debugging.
    pub fn check_invariants(&self) -> Result<()> {
        if self.slots.capacity() != self.table.len() {
            return Err(violation!(
                "the allocator manages {} locations, but the table has {}",
                self.slots.capacity(),
                self.table.len()
            ));
        }
        let mut live = 0;
        for (loc, row) in self.table.iter().enumerate() {
            if row.is_some() != self.slots.is_allocated(loc) {
                return Err(violation!(
                    "location {} is {} but {} in the allocator",
                    loc,
                    if row.is_some() { "used" } else { "cleared" },
                    if row.is_some() { "free" } else { "allocated" }
                ));
            }
            if row.is_some() {
                live += 1;
            }
        }
        if live != self.slots.live_count() {
            return Err(violation!(
                "{} live rows, but the allocator counts {}",
                live,
                self.slots.live_count()
            ));
        }

        for (loc, row) in self.table.iter().enumerate() {
            let row = match row {
                Some(row) => row,
                None => continue,
            };
            let mut seen = HashSet::new();
            for (_, edge) in row.edges() {
                let target = edge.target();
                if target == loc {
                    return Err(violation!("region {} is its own neighbor", region_id(loc)));
                }
                if !seen.insert(target) {
                    return Err(violation!(
                        "region {} lists {} twice",
                        region_id(loc),
                        region_id(target)
                    ));
                }
                let other = self.row_at(target).ok_or_else(|| {
                    violation!(
                        "region {} points to the freed location {}",
                        region_id(loc),
                        target
                    )
                })?;
                if other.position_of(loc).is_none() {
                    return Err(violation!(
                        "region {} lists {} as a neighbor, but not the other way around",
                        region_id(loc),
                        region_id(target)
                    ));
                }
                let path = edge.path();
                if path.first() != Some(&row.representative())
                    || path.last() != Some(&other.representative())
                {
                    return Err(violation!(
                        "the path from region {} to {} does not connect their representatives",
                        region_id(loc),
                        region_id(target)
                    ));
                }
            }
        }
        Ok(())
    }
}
