use super::{
    build::{compress_path, compute_path},
    RegionDatabase,
};
use crate::{
    compress::PathCompressor,
    grid::Element,
    oracle::PathOracle,
    path::SubgoalPath,
    region::RegionModel,
    region_id, Cost, Error, Location, RegionId, Result, StateId,
};

use hashbrown::HashMap;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

impl RegionDatabase {
    /// Finds the Path between the representatives of two Regions.
    ///
    /// If `goal` is a direct neighbor of `start`, the stored Path is returned as-is. Otherwise
    /// the Region graph is searched and the stored Paths along the way are joined together.
    ///
    /// Returns `Ok(None)` if `goal` cannot be reached from `start`.
    ///
    /// ## Errors
    /// [`Error::UnknownRegion`] if either id does not refer to a live Region.
    ///
    /// ## Examples
    /// ```
    /// # use region_pathfinding::prelude::*;
    /// let grid = GridMap::new(6, 1);
    /// let neighborhood = ManhattanNeighborhood::new(6, 1);
    ///
    /// // a chain of Regions: 1 - 2 - 3
    /// let mut regions = RegionMap::new();
    /// regions.insert_region(1, Region::new(0, [0, 1], [2]));
    /// regions.insert_region(2, Region::new(2, [2, 3], [1, 3]));
    /// regions.insert_region(3, Region::new(5, [4, 5], [2]));
    ///
    /// let oracle = GridOracle::new(&grid, neighborhood);
    /// let database = RegionDatabase::build(
    ///     &regions,
    ///     &oracle,
    ///     &HillClimbCompressor,
    ///     DatabaseConfig::default(),
    /// )
    /// .unwrap();
    ///
    /// let path = database.find_region_path(1, 3).unwrap().unwrap();
    /// assert_eq!(path.start(), 0);
    /// assert_eq!(path.goal(), 5);
    /// assert_eq!(path.cost(), 50);
    /// ```
    pub fn find_region_path(
        &self,
        start: RegionId,
        goal: RegionId,
    ) -> Result<Option<SubgoalPath>> {
        let start_loc = self.location_of(start)?;
        let goal_loc = self.location_of(goal)?;
        let start_row = self.live_row(start_loc)?;

        if start_loc == goal_loc {
            return Ok(Some(SubgoalPath::trivial(start_row.representative())));
        }
        if let Some(edge) = start_row.edge_to(goal_loc) {
            return Ok(Some(SubgoalPath::from(edge.path())));
        }

        let (hops, cost) = match self.region_search(start_loc, goal_loc) {
            Some(result) => result,
            None => return Ok(None),
        };

        let mut waypoints = vec![start_row.representative()];
        for &(loc, k) in hops.iter() {
            let edge = self
                .row_at(loc)
                .and_then(|row| row.entries()[k].as_ref())
                .ok_or(Error::UnknownRegion(region_id(loc)))?;
            // the first Subgoal is the last one of the previous segment
            waypoints.extend(edge.path().iter().skip(1));
        }
        trace!(
            "joined {} segments from region {} to {}",
            hops.len(),
            start,
            goal
        );
        Ok(Some(SubgoalPath::from_waypoints(&waypoints, cost)))
    }

    /// Dijkstra over the Region graph.
    ///
    /// Returns every hop as the Location it starts at and the position of the used entry in
    /// that Location's Row, in order from `start` to `goal`.
    fn region_search(
        &self,
        start: Location,
        goal: Location,
    ) -> Option<(Vec<(Location, usize)>, Cost)> {
        let mut visited = HashMap::new();
        let mut next = BinaryHeap::new();
        next.push(Element(start, 0));
        visited.insert(start, (0, start, 0));

        while let Some(Element(current_id, current_cost)) = next.pop() {
            if current_id == goal {
                break;
            }
            match current_cost.cmp(&visited[&current_id].0) {
                Ordering::Greater => continue,
                Ordering::Equal => {}
                Ordering::Less => panic!("Binary Heap failed"),
            }

            let current = match self.row_at(current_id) {
                Some(row) => row,
                None => continue,
            };
            for (k, edge) in current.edges() {
                let other_id = edge.target();
                let other_cost = current_cost + edge.cost();

                let mut needs_visit = true;
                if let Some((prev_cost, prev_id, prev_k)) = visited.get_mut(&other_id) {
                    if *prev_cost > other_cost {
                        *prev_cost = other_cost;
                        *prev_id = current_id;
                        *prev_k = k;
                    } else {
                        needs_visit = false;
                    }
                } else {
                    visited.insert(other_id, (other_cost, current_id, k));
                }

                if needs_visit {
                    next.push(Element(other_id, other_cost));
                }
            }
        }

        let &(cost, _, _) = visited.get(&goal)?;

        let mut hops = vec![];
        let mut current = goal;
        while current != start {
            let (_, prev, k) = visited[&current];
            hops.push((prev, k));
            current = prev;
        }
        hops.reverse();

        Some((hops, cost))
    }

    /// Finds a Path between two States of the Grid.
    ///
    /// Both States are looked up in `model`. States in the same Region are connected with the
    /// oracle directly. Otherwise the Path leads from `start` to the representative of its
    /// Region, along the stored Paths to the representative of the goal's Region and from
    /// there to `goal`.
    ///
    /// Returns `Ok(None)` if either State belongs to no Region or the Regions are not
    /// connected.
    ///
    /// ## Errors
    /// - [`Error::UnknownRegion`] if `model` and the database disagree on which Regions exist
    /// - [`Error::UnreachablePath`] if a State cannot reach the representative of its Region
    pub fn find_path<M, O, C>(
        &self,
        model: &M,
        start: StateId,
        goal: StateId,
        oracle: &O,
        compressor: &C,
    ) -> Result<Option<SubgoalPath>>
    where
        M: RegionModel + ?Sized,
        O: PathOracle + ?Sized,
        C: PathCompressor + ?Sized,
    {
        let (start_region, goal_region) = match (model.region_of(start), model.region_of(goal)) {
            (Some(a), Some(b)) => (a, b),
            _ => return Ok(None),
        };

        if start_region == goal_region {
            return match oracle.find_optimal_path(start, goal) {
                Some(path) => {
                    let path = compress_path(oracle, compressor, &path)?;
                    Ok(Some(SubgoalPath::from(&path)))
                }
                None => Ok(None),
            };
        }

        let middle = match self.find_region_path(start_region, goal_region)? {
            Some(path) => path,
            None => return Ok(None),
        };

        let first = compute_path(oracle, compressor, start, middle.start())?;
        let last = compute_path(oracle, compressor, middle.goal(), goal)?;

        let mut waypoints = first.to_vec();
        waypoints.extend(middle.waypoints().skip(1));
        waypoints.extend(last.iter().skip(1));

        let cost = first.cost() + middle.cost() + last.cost();
        Ok(Some(SubgoalPath::from_waypoints(&waypoints, cost)))
    }
}
