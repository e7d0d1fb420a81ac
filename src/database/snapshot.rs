use super::{AdjacencyRow, DatabaseConfig, Edge, RegionDatabase, SlotAllocator};
use crate::{path::Path, Cost, Error, Location, Result, StateId};

use serde::{Deserialize, Serialize};

/// A plain copy of the whole table of a [`RegionDatabase`], for storing it in any format
/// supported by `serde`.
///
/// ## Examples
/// ```
/// # use region_pathfinding::prelude::*;
/// let grid = GridMap::new(3, 1);
/// let oracle = GridOracle::new(&grid, ManhattanNeighborhood::new(3, 1));
/// let mut regions = RegionMap::new();
/// regions.insert_region(1, Region::new(0, [0], [2]));
/// regions.insert_region(2, Region::new(2, [1, 2], [1]));
///
/// let database =
///     RegionDatabase::build(&regions, &oracle, &HillClimbCompressor, DatabaseConfig::default())
///         .unwrap();
///
/// let snapshot = database.snapshot();
/// assert_eq!(snapshot.capacity, 2);
/// assert_eq!(snapshot.rows[0].as_ref().unwrap().costs, vec![Some(20)]);
///
/// let copy = RegionDatabase::from_snapshot(snapshot.clone(), DatabaseConfig::default()).unwrap();
/// assert_eq!(copy.snapshot(), snapshot);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSnapshot {
    /// The number of Locations
    pub capacity: usize,
    /// The free pool, in the order the allocator keeps it
    pub free: Vec<Location>,
    /// One entry per Location. `None` for free Locations.
    pub rows: Vec<Option<RowSnapshot>>,
}

/// The Row of a single Region inside a [`TableSnapshot`].
///
/// All three lists have one element per position, `None` marking a tombstone.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowSnapshot {
    /// The representative State of the Region
    pub representative: StateId,
    /// The Location of the neighbor at each position
    pub neighbors: Vec<Option<Location>>,
    /// The Cost at each position
    pub costs: Vec<Option<Cost>>,
    /// The compressed Path at each position
    pub paths: Vec<Option<Vec<StateId>>>,
}

impl RowSnapshot {
    fn into_row(self, loc: Location) -> Result<AdjacencyRow> {
        let len = self.neighbors.len();
        if self.costs.len() != len || self.paths.len() != len {
            return Err(Error::MalformedSnapshot(format!(
                "row {} has {} neighbors, {} costs and {} paths",
                loc,
                len,
                self.costs.len(),
                self.paths.len()
            )));
        }
        let entries = self
            .neighbors
            .into_iter()
            .zip(self.costs)
            .zip(self.paths)
            .enumerate()
            .map(|(k, entry)| match entry {
                ((Some(target), Some(cost)), Some(path)) if !path.is_empty() => {
                    Ok(Some(Edge::new(target, Path::new(path, cost))))
                }
                ((None, None), None) => Ok(None),
                _ => Err(Error::MalformedSnapshot(format!(
                    "entry {} of row {} is partially missing",
                    k, loc
                ))),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(AdjacencyRow::from_entries(self.representative, entries))
    }
}

impl From<&AdjacencyRow> for RowSnapshot {
    fn from(row: &AdjacencyRow) -> RowSnapshot {
        RowSnapshot {
            representative: row.representative(),
            neighbors: row.neighbors().collect(),
            costs: row.costs().collect(),
            paths: row.paths().map(|p| p.map(<[StateId]>::to_vec)).collect(),
        }
    }
}

impl RegionDatabase {
    /// Copies the complete table, including tombstones and the order of the free pool.
    pub fn snapshot(&self) -> TableSnapshot {
        TableSnapshot {
            capacity: self.table.len(),
            free: self.slots.free_locations().to_vec(),
            rows: self
                .table
                .iter()
                .map(|row| row.as_ref().map(RowSnapshot::from))
                .collect(),
        }
    }

    /// Recreates a database from a [`TableSnapshot`].
    ///
    /// The result is identical to the database the snapshot was taken from.
    ///
    /// ## Errors
    /// - [`Error::MalformedSnapshot`] if the snapshot is internally inconsistent
    /// - [`Error::InvariantViolation`] if the described table breaks one of the checks of
    ///   [`check_invariants`](RegionDatabase::check_invariants)
    pub fn from_snapshot(
        snapshot: TableSnapshot,
        config: DatabaseConfig,
    ) -> Result<RegionDatabase> {
        if snapshot.rows.len() != snapshot.capacity {
            return Err(Error::MalformedSnapshot(format!(
                "{} rows for a capacity of {}",
                snapshot.rows.len(),
                snapshot.capacity
            )));
        }
        let slots = SlotAllocator::from_free_pool(snapshot.capacity, snapshot.free)
            .map_err(|err| Error::MalformedSnapshot(err.to_string()))?;

        let mut table = Vec::with_capacity(snapshot.capacity);
        for (loc, row) in snapshot.rows.into_iter().enumerate() {
            table.push(row.map(|row| row.into_row(loc)).transpose()?);
        }

        let database = RegionDatabase {
            table,
            slots,
            config,
        };
        database.check_invariants()?;
        Ok(database)
    }
}
