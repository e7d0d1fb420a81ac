use super::{AdjacencyRow, DatabaseConfig, Edge, RegionDatabase, SlotAllocator};
use crate::{
    compress::PathCompressor, error::violation, oracle::PathOracle, path::Path,
    region::RegionModel, region_location, Error, Location, Result, StateId,
};

/// Searches the optimal Path between two representatives and compresses it.
///
/// Both Regions are declared to be connected, so a failed search is an error.
pub(super) fn compute_path<O, C>(
    oracle: &O,
    compressor: &C,
    from: StateId,
    to: StateId,
) -> Result<Path<StateId>>
where
    O: PathOracle + ?Sized,
    C: PathCompressor + ?Sized,
{
    let path = oracle
        .find_optimal_path(from, to)
        .ok_or(Error::UnreachablePath { from, to })?;
    compress_path(oracle, compressor, &path)
}

/// Compresses a Path and checks that the Subgoals keep both of its ends
pub(super) fn compress_path<O, C>(
    oracle: &O,
    compressor: &C,
    path: &Path<StateId>,
) -> Result<Path<StateId>>
where
    O: PathOracle + ?Sized,
    C: PathCompressor + ?Sized,
{
    let subgoals = compressor.compress(oracle, path);
    if subgoals.first() != path.first() || subgoals.last() != path.last() {
        return Err(violation!(
            "the compressor turned {:?} into {:?}",
            path.as_slice(),
            subgoals
        ));
    }
    Ok(Path::new(subgoals, path.cost()))
}

/// Everything needed to compute the Row of one Region, read from the model up front
struct RowPlan {
    location: Location,
    representative: StateId,
    neighbors: Vec<(Location, StateId)>,
}

impl RowPlan {
    fn compute<O, C>(&self, oracle: &O, compressor: &C) -> Result<AdjacencyRow>
    where
        O: PathOracle + ?Sized,
        C: PathCompressor + ?Sized,
    {
        let mut entries = Vec::with_capacity(self.neighbors.len());
        for &(target, other) in self.neighbors.iter() {
            let path = compute_path(oracle, compressor, self.representative, other)?;
            entries.push(Some(Edge::new(target, path)));
        }
        Ok(AdjacencyRow::from_entries(self.representative, entries))
    }
}

fn plan_rows<M: RegionModel + ?Sized>(model: &M) -> Result<Vec<RowPlan>> {
    let ids = model.region_ids();
    let mut plans = Vec::with_capacity(ids.len());
    for &id in ids.iter() {
        let location = region_location(id).ok_or(Error::UnknownRegion(id))?;
        let region = model.region(id).ok_or(Error::UnknownRegion(id))?;

        let mut neighbors = Vec::with_capacity(region.neighbors().len());
        for &other_id in region.neighbors() {
            if other_id == id {
                return Err(violation!("region {} lists itself as a neighbor", id));
            }
            let other = model
                .region(other_id)
                .ok_or(Error::UnknownRegion(other_id))?;
            if !other.is_neighbor(id) {
                return Err(violation!(
                    "region {} lists {} as a neighbor, but not the other way around",
                    id,
                    other_id
                ));
            }
            let target = region_location(other_id).ok_or(Error::UnknownRegion(other_id))?;
            neighbors.push((target, other.representative()));
        }

        plans.push(RowPlan {
            location,
            representative: region.representative(),
            neighbors,
        });
    }
    Ok(plans)
}

fn assemble(
    plans: &[RowPlan],
    rows: Vec<AdjacencyRow>,
    config: DatabaseConfig,
) -> Result<RegionDatabase> {
    let capacity = plans.iter().map(|p| p.location + 1).max().unwrap_or(0);
    let mut table = vec![None; capacity];
    for (plan, row) in plans.iter().zip(rows) {
        table[plan.location] = Some(row);
    }
    let free = (0..capacity)
        .rev()
        .filter(|&loc| table[loc].is_none())
        .collect();
    let slots = SlotAllocator::from_free_pool(capacity, free)?;
    Ok(RegionDatabase {
        table,
        slots,
        config,
    })
}

impl RegionDatabase {
    /// Creates a new RegionDatabase by calculating the Path between every pair of neighboring
    /// Regions of `model`.
    ///
    /// ## Arguments
    /// - `model` - the Regions and their neighbors. Neighbor lists have to be symmetric.
    /// - `oracle` - finds the optimal Paths between representatives
    /// - `compressor` - reduces those Paths to the stored Subgoals
    /// - `config` - how the database grows later on. (See [`DatabaseConfig`])
    ///
    /// Every Location below the largest id that is not used by any Region is put into the free
    /// pool, so ids do not have to be contiguous.
    ///
    /// ## Errors
    /// - [`Error::UnknownRegion`] if a Region lists a neighbor that does not exist
    /// - [`Error::InvariantViolation`] if the neighbor lists are not symmetric
    /// - [`Error::UnreachablePath`] if the oracle finds no Path between two neighbors
    ///
    /// ## Examples
    /// ```
    /// # use region_pathfinding::prelude::*;
    /// let grid = GridMap::new(4, 1);
    /// let neighborhood = ManhattanNeighborhood::new(4, 1);
    ///
    /// let mut regions = RegionMap::new();
    /// regions.insert_region(1, Region::new(0, [0, 1], [2]));
    /// regions.insert_region(2, Region::new(3, [2, 3], [1]));
    ///
    /// let database = RegionDatabase::build(
    ///     &regions,
    ///     &GridOracle::new(&grid, neighborhood),
    ///     &IdentityCompressor,
    ///     DatabaseConfig::default(),
    /// )
    /// .unwrap();
    ///
    /// let edge = database.edge(1, 2).unwrap();
    /// assert_eq!(edge.cost(), 30);
    /// assert_eq!(edge.path(), &vec![0, 1, 2, 3]);
    /// ```
    pub fn build<M, O, C>(
        model: &M,
        oracle: &O,
        compressor: &C,
        config: DatabaseConfig,
    ) -> Result<RegionDatabase>
    where
        M: RegionModel + ?Sized,
        O: PathOracle + ?Sized,
        C: PathCompressor + ?Sized,
    {
        let timer = std::time::Instant::now();

        let plans = plan_rows(model)?;
        let mut rows = Vec::with_capacity(plans.len());
        for plan in plans.iter() {
            rows.push(plan.compute(oracle, compressor)?);
        }
        let database = assemble(&plans, rows, config)?;

        debug!(
            "built {} regions in {:?}",
            database.region_count(),
            timer.elapsed()
        );
        Ok(database)
    }

    /// Same as [`build`](RegionDatabase::build), but calculates the Rows on all cores.
    ///
    /// The result is identical to the one of `build`.
    #[cfg(feature = "parallel")]
    pub fn build_parallel<M, O, C>(
        model: &M,
        oracle: &O,
        compressor: &C,
        config: DatabaseConfig,
    ) -> Result<RegionDatabase>
    where
        M: RegionModel + ?Sized,
        O: PathOracle + Sync + ?Sized,
        C: PathCompressor + Sync + ?Sized,
    {
        use rayon::prelude::*;

        let timer = std::time::Instant::now();

        let plans = plan_rows(model)?;
        let rows = plans
            .par_iter()
            .map(|plan| plan.compute(oracle, compressor))
            .collect::<Result<Vec<_>>>()?;
        let database = assemble(&plans, rows, config)?;

        debug!(
            "built {} regions on {} threads in {:?}",
            database.region_count(),
            rayon::current_num_threads(),
            timer.elapsed()
        );
        Ok(database)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        compress::IdentityCompressor,
        grid::GridMap,
        neighbors::ManhattanNeighborhood,
        oracle::GridOracle,
        region::{Region, RegionMap},
    };

    // 0 1 2 3 4 5
    // [1] [2] [4]   (id 3 unused)
    fn line() -> (GridMap, RegionMap) {
        let grid = GridMap::new(6, 1);
        let mut regions = RegionMap::new();
        regions.insert_region(1, Region::new(0, [0, 1], [2]));
        regions.insert_region(2, Region::new(2, [2, 3], [1, 4]));
        regions.insert_region(4, Region::new(5, [4, 5], [2]));
        (grid, regions)
    }

    #[test]
    fn both_directions_are_stored() {
        let (grid, regions) = line();
        let oracle = GridOracle::new(&grid, ManhattanNeighborhood::new(6, 1));
        let database = RegionDatabase::build(
            &regions,
            &oracle,
            &IdentityCompressor,
            DatabaseConfig::default(),
        )
        .unwrap();

        assert_eq!(database.region_count(), 3);
        assert_eq!(database.capacity(), 4);
        assert_eq!(database.free_locations(), &[2]);

        assert_eq!(database.edge(1, 2).unwrap().path(), &vec![0, 1, 2]);
        assert_eq!(database.edge(2, 1).unwrap().path(), &vec![2, 1, 0]);
        assert_eq!(database.edge(2, 4).unwrap().cost(), 30);
        assert!(database.edge(1, 4).is_none());
        assert_eq!(database.neighbor_ids(2), vec![1, 4]);
        database.check_invariants().unwrap();
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn parallel_build_is_identical() {
        let (grid, regions) = line();
        let oracle = GridOracle::new(&grid, ManhattanNeighborhood::new(6, 1));
        let config = DatabaseConfig::default();
        let serial = RegionDatabase::build(&regions, &oracle, &IdentityCompressor, config).unwrap();
        let parallel =
            RegionDatabase::build_parallel(&regions, &oracle, &IdentityCompressor, config)
                .unwrap();
        assert_eq!(serial.snapshot(), parallel.snapshot());
    }

    #[test]
    fn asymmetric_neighbors() {
        let (grid, mut regions) = line();
        regions.remove_neighbor(4, 2);
        let oracle = GridOracle::new(&grid, ManhattanNeighborhood::new(6, 1));
        let result = RegionDatabase::build(
            &regions,
            &oracle,
            &IdentityCompressor,
            DatabaseConfig::default(),
        );
        assert!(matches!(result, Err(Error::InvariantViolation(_))));
    }

    #[test]
    fn unknown_neighbor() {
        let (grid, mut regions) = line();
        regions.add_neighbor(1, 9);
        let oracle = GridOracle::new(&grid, ManhattanNeighborhood::new(6, 1));
        let result = RegionDatabase::build(
            &regions,
            &oracle,
            &IdentityCompressor,
            DatabaseConfig::default(),
        );
        assert_eq!(result.unwrap_err(), Error::UnknownRegion(9));
    }

    #[test]
    fn unreachable_neighbor() {
        let (mut grid, regions) = line();
        grid.set_blocked(1, true);
        let oracle = GridOracle::new(&grid, ManhattanNeighborhood::new(6, 1));
        let result = RegionDatabase::build(
            &regions,
            &oracle,
            &IdentityCompressor,
            DatabaseConfig::default(),
        );
        assert_eq!(
            result.unwrap_err(),
            Error::UnreachablePath { from: 0, to: 2 }
        );
    }

    // keeps only the inner States
    struct DropEnds;

    impl PathCompressor for DropEnds {
        fn compress<O>(&self, _oracle: &O, path: &[StateId]) -> Vec<StateId>
        where
            O: PathOracle + ?Sized,
        {
            match path {
                [_, inner @ .., _] => inner.to_vec(),
                _ => vec![],
            }
        }
    }

    #[test]
    fn compressor_must_keep_the_ends() {
        let (grid, regions) = line();
        let oracle = GridOracle::new(&grid, ManhattanNeighborhood::new(6, 1));
        let config = DatabaseConfig::default();
        let result = RegionDatabase::build(&regions, &oracle, &DropEnds, config);
        assert!(matches!(result, Err(Error::InvariantViolation(_))));

        let database =
            RegionDatabase::build(&regions, &oracle, &IdentityCompressor, config).unwrap();
        // inside of Region 1, and across Regions 1 and 2
        for (start, goal) in [(0, 1), (1, 3)] {
            let result = database.find_path(&regions, start, goal, &oracle, &DropEnds);
            assert!(matches!(result, Err(Error::InvariantViolation(_))));
        }
        assert_eq!(
            database
                .find_path(&regions, 1, 3, &oracle, &IdentityCompressor)
                .unwrap()
                .map(|path| path.cost()),
            Some(40)
        );
    }
}
