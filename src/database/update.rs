use super::{build::compute_path, AdjacencyRow, Edge, RegionDatabase};
use crate::{
    compress::PathCompressor,
    error::violation,
    oracle::PathOracle,
    path::Path,
    region::{Region, RegionModel},
    region_id,
    utils::IterExt,
    Location, RegionId, Result, StateId,
};

/// A Region that does not have an id yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegionSeed {
    /// The State that will stand in for the Region
    pub representative: StateId,
    /// All States of the Region
    pub members: Vec<StateId>,
    /// The ids of all existing Regions the new Region is connected to
    pub neighbors: Vec<RegionId>,
}

impl RegionSeed {
    /// Creates a new RegionSeed. `members` and `neighbors` may be in any order.
    pub fn new(
        representative: StateId,
        members: impl IntoIterator<Item = StateId>,
        neighbors: impl IntoIterator<Item = RegionId>,
    ) -> RegionSeed {
        RegionSeed {
            representative,
            members: members.into_iter().to_sorted_set(),
            neighbors: neighbors.into_iter().to_sorted_set(),
        }
    }

    fn to_region(&self) -> Region {
        Region::new(
            self.representative,
            self.members.iter().copied(),
            self.neighbors.iter().copied(),
        )
    }
}

/// The effect a single changed Tile has on the Region graph.
///
/// Every edit of the Grid is described by one or more of these, in the order they have to be
/// applied with [`RegionDatabase::apply`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegionChange {
    /// The last open Tile of a Region was blocked
    Elimination {
        /// the Region that disappears
        region: RegionId,
    },
    /// A Region was split into several pieces.
    ///
    /// The first piece keeps the id of the Region, the others get new ids. A single piece
    /// replaces the Region in place and recomputes all of its Paths.
    Partition {
        /// the Region that is split
        region: RegionId,
        /// the new Regions
        pieces: Vec<RegionSeed>,
    },
    /// A Tile was opened that connects to no other Region
    SolitaryCreation {
        /// the new Region. Has no neighbors.
        seed: RegionSeed,
    },
    /// A Tile was opened that forms a new Region next to existing ones
    ConnectedCreation {
        /// the new Region. Has at least one neighbor.
        seed: RegionSeed,
    },
    /// Two Regions stopped being neighbors
    CornerBlocker {
        /// one of the Regions
        a: RegionId,
        /// the other Region
        b: RegionId,
    },
    /// Two Regions became neighbors
    Unblocker {
        /// one of the Regions
        a: RegionId,
        /// the other Region
        b: RegionId,
    },
}

/// Both directions of a connection to an existing Region, calculated before the table changes
struct PlannedLink {
    neighbor: Location,
    forward: Path<StateId>,
    backward: Path<StateId>,
}

impl RegionDatabase {
    /// Patches the database and `model` for a single [`RegionChange`].
    ///
    /// All Paths are calculated before anything is modified, so an error leaves both the
    /// database and `model` untouched. An error always means that the change does not match
    /// the current state of the database; the database should be rebuilt in that case.
    ///
    /// Returns the ids of all Regions that were created or rebuilt.
    ///
    /// ## Errors
    /// - [`Error::UnknownRegion`](crate::Error::UnknownRegion) if a mentioned Region does not
    ///   exist
    /// - [`Error::InvariantViolation`](crate::Error::InvariantViolation) if the affected Rows
    ///   are inconsistent or the change contradicts them (like blocking an edge that does not
    ///   exist)
    /// - [`Error::UnreachablePath`](crate::Error::UnreachablePath) if two Regions that are
    ///   supposed to be neighbors are not connected
    ///
    /// ## Examples
    /// ```
    /// # use region_pathfinding::prelude::*;
    /// let grid = GridMap::new(3, 1);
    /// let oracle = GridOracle::new(&grid, ManhattanNeighborhood::new(3, 1));
    ///
    /// let mut regions = RegionMap::new();
    /// regions.insert_region(1, Region::new(0, [0], []));
    /// let mut database = RegionDatabase::build(
    ///     &regions,
    ///     &oracle,
    ///     &HillClimbCompressor,
    ///     DatabaseConfig::default(),
    /// )
    /// .unwrap();
    ///
    /// let seed = RegionSeed::new(2, [1, 2], [1]);
    /// let created = database
    ///     .apply(
    ///         RegionChange::ConnectedCreation { seed },
    ///         &mut regions,
    ///         &oracle,
    ///         &HillClimbCompressor,
    ///     )
    ///     .unwrap();
    /// assert_eq!(created, vec![2]);
    /// assert_eq!(database.edge(1, 2).unwrap().cost(), 20);
    /// assert_eq!(regions.region(1).unwrap().neighbors(), &[2]);
    /// ```
    pub fn apply<M, O, C>(
        &mut self,
        change: RegionChange,
        model: &mut M,
        oracle: &O,
        compressor: &C,
    ) -> Result<Vec<RegionId>>
    where
        M: RegionModel + ?Sized,
        O: PathOracle + ?Sized,
        C: PathCompressor + ?Sized,
    {
        trace!("applying {:?}", change);
        match change {
            RegionChange::Elimination { region } => {
                self.eliminate(region, model)?;
                Ok(vec![])
            }
            RegionChange::Partition { region, pieces } => {
                self.partition(region, &pieces, model, oracle, compressor)
            }
            RegionChange::SolitaryCreation { seed } => {
                if !seed.neighbors.is_empty() {
                    return Err(violation!(
                        "a solitary region cannot have neighbors ({:?})",
                        seed.neighbors
                    ));
                }
                self.create(&seed, model, oracle, compressor).map(|id| vec![id])
            }
            RegionChange::ConnectedCreation { seed } => {
                if seed.neighbors.is_empty() {
                    return Err(violation!("a connected region needs at least one neighbor"));
                }
                self.create(&seed, model, oracle, compressor).map(|id| vec![id])
            }
            RegionChange::CornerBlocker { a, b } => {
                self.disconnect(a, b, model)?;
                Ok(vec![])
            }
            RegionChange::Unblocker { a, b } => {
                self.connect(a, b, model, oracle, compressor)?;
                Ok(vec![])
            }
        }
    }

    /// Fails if any present entry of the Row at `loc` is duplicated or has no exactly matching
    /// counterpart
    fn check_reciprocal(&self, loc: Location) -> Result<()> {
        let row = self.live_row(loc)?;
        for (_, edge) in row.edges() {
            if row.count_of(edge.target()) > 1 {
                return Err(violation!(
                    "region {} lists {} more than once",
                    region_id(loc),
                    region_id(edge.target())
                ));
            }
            let other = self.row_at(edge.target()).ok_or_else(|| {
                violation!(
                    "region {} points to the freed location {}",
                    region_id(loc),
                    edge.target()
                )
            })?;
            match other.count_of(loc) {
                1 => {}
                0 => {
                    return Err(violation!(
                        "region {} lists {} as a neighbor, but not the other way around",
                        region_id(loc),
                        region_id(edge.target())
                    ))
                }
                _ => {
                    return Err(violation!(
                        "region {} lists {} more than once",
                        region_id(edge.target()),
                        region_id(loc)
                    ))
                }
            }
        }
        Ok(())
    }

    fn targets_of(&self, loc: Location) -> Result<Vec<Location>> {
        Ok(self
            .live_row(loc)?
            .edges()
            .map(|(_, edge)| edge.target())
            .to_vec())
    }

    fn plan_links<O, C>(
        &self,
        representative: StateId,
        neighbors: &[RegionId],
        oracle: &O,
        compressor: &C,
    ) -> Result<Vec<PlannedLink>>
    where
        O: PathOracle + ?Sized,
        C: PathCompressor + ?Sized,
    {
        let mut links: Vec<PlannedLink> = Vec::with_capacity(neighbors.len());
        for &id in neighbors {
            let neighbor = self.location_of(id)?;
            if links.iter().any(|link| link.neighbor == neighbor) {
                return Err(violation!("region {} is listed as a neighbor twice", id));
            }
            let other = self.live_row(neighbor)?.representative();
            links.push(PlannedLink {
                neighbor,
                forward: compute_path(oracle, compressor, representative, other)?,
                backward: compute_path(oracle, compressor, other, representative)?,
            });
        }
        Ok(links)
    }

    /// Adds the planned entries to the Row at `loc` and the reverse entries to the neighbors
    fn link(
        &mut self,
        loc: Location,
        links: Vec<PlannedLink>,
        reuse_tombstones: bool,
    ) -> Result<()> {
        for link in links {
            self.live_row_mut(loc)?
                .append_edge(Edge::new(link.neighbor, link.forward));
            let other = self.live_row_mut(link.neighbor)?;
            let edge = Edge::new(loc, link.backward);
            if reuse_tombstones {
                other.push_edge(edge);
            } else {
                other.append_edge(edge);
            }
        }
        Ok(())
    }

    fn eliminate<M>(&mut self, id: RegionId, model: &mut M) -> Result<()>
    where
        M: RegionModel + ?Sized,
    {
        let loc = self.location_of(id)?;
        self.check_reciprocal(loc)?;
        let targets = self.targets_of(loc)?;

        for &target in targets.iter() {
            self.live_row_mut(target)?.remove_edge(loc);
        }
        self.release(loc)?;

        let mut neighbors = model
            .region(id)
            .map(|region| region.neighbors().to_vec())
            .unwrap_or_default();
        neighbors.extend(targets.iter().map(|&t| region_id(t)));
        for neighbor in neighbors {
            model.remove_neighbor(neighbor, id);
        }
        model.remove_region(id);

        debug!("eliminated region {} with {} neighbors", id, targets.len());
        Ok(())
    }

    fn partition<M, O, C>(
        &mut self,
        id: RegionId,
        pieces: &[RegionSeed],
        model: &mut M,
        oracle: &O,
        compressor: &C,
    ) -> Result<Vec<RegionId>>
    where
        M: RegionModel + ?Sized,
        O: PathOracle + ?Sized,
        C: PathCompressor + ?Sized,
    {
        let loc = self.location_of(id)?;
        if pieces.is_empty() {
            return Err(violation!("region {} is partitioned into nothing", id));
        }
        self.check_reciprocal(loc)?;

        let mut planned = Vec::with_capacity(pieces.len());
        for piece in pieces {
            if piece.neighbors.contains(&id) {
                return Err(violation!(
                    "a piece of region {} lists the region itself as a neighbor",
                    id
                ));
            }
            let links =
                self.plan_links(piece.representative, &piece.neighbors, oracle, compressor)?;
            planned.push(links);
        }
        let targets = self.targets_of(loc)?;
        self.reserve(pieces.len() - 1);

        for &target in targets.iter() {
            self.live_row_mut(target)?.tombstone_edge(loc);
        }
        self.table[loc] = Some(AdjacencyRow::new(pieces[0].representative));
        let mut locations = vec![loc];
        for piece in pieces[1..].iter() {
            let new_loc = self.allocate()?;
            self.table[new_loc] = Some(AdjacencyRow::new(piece.representative));
            locations.push(new_loc);
        }
        for (&piece_loc, links) in locations.iter().zip(planned) {
            self.link(piece_loc, links, true)?;
        }

        let mut old_neighbors = model
            .region(id)
            .map(|region| region.neighbors().to_vec())
            .unwrap_or_default();
        old_neighbors.extend(targets.iter().map(|&t| region_id(t)));
        for neighbor in old_neighbors {
            model.remove_neighbor(neighbor, id);
        }
        let ids = locations.iter().map(|&l| region_id(l)).to_vec();
        for (&piece_id, piece) in ids.iter().zip(pieces) {
            model.insert_region(piece_id, piece.to_region());
            for &neighbor in piece.neighbors.iter() {
                model.add_neighbor(neighbor, piece_id);
            }
        }

        debug!("partitioned region {} into {:?}", id, ids);
        Ok(ids)
    }

    fn create<M, O, C>(
        &mut self,
        seed: &RegionSeed,
        model: &mut M,
        oracle: &O,
        compressor: &C,
    ) -> Result<RegionId>
    where
        M: RegionModel + ?Sized,
        O: PathOracle + ?Sized,
        C: PathCompressor + ?Sized,
    {
        let links = self.plan_links(seed.representative, &seed.neighbors, oracle, compressor)?;

        let loc = self.allocate()?;
        self.table[loc] = Some(AdjacencyRow::new(seed.representative));
        self.link(loc, links, false)?;

        let id = region_id(loc);
        model.insert_region(id, seed.to_region());
        for &neighbor in seed.neighbors.iter() {
            model.add_neighbor(neighbor, id);
        }

        debug!("created region {} with {} neighbors", id, seed.neighbors.len());
        Ok(id)
    }

    fn edge_locations(&self, a: RegionId, b: RegionId) -> Result<(Location, Location)> {
        let la = self.location_of(a)?;
        let lb = self.location_of(b)?;
        if la == lb {
            return Err(violation!("region {} cannot neighbor itself", a));
        }
        Ok((la, lb))
    }

    fn disconnect<M>(&mut self, a: RegionId, b: RegionId, model: &mut M) -> Result<()>
    where
        M: RegionModel + ?Sized,
    {
        let (la, lb) = self.edge_locations(a, b)?;
        let forward = self.live_row(la)?.count_of(lb);
        let backward = self.live_row(lb)?.count_of(la);
        match (forward, backward) {
            (1, 1) => {}
            (0, 0) => {
                return Err(violation!("regions {} and {} are not neighbors", a, b));
            }
            (0, _) | (_, 0) => {
                return Err(violation!(
                    "regions {} and {} list each other only one way",
                    a,
                    b
                ));
            }
            _ => {
                return Err(violation!(
                    "regions {} and {} list each other more than once",
                    a,
                    b
                ));
            }
        }

        self.live_row_mut(la)?.tombstone_edge(lb);
        self.live_row_mut(lb)?.tombstone_edge(la);
        model.remove_neighbor(a, b);
        model.remove_neighbor(b, a);

        debug!("disconnected regions {} and {}", a, b);
        Ok(())
    }

    fn connect<M, O, C>(
        &mut self,
        a: RegionId,
        b: RegionId,
        model: &mut M,
        oracle: &O,
        compressor: &C,
    ) -> Result<()>
    where
        M: RegionModel + ?Sized,
        O: PathOracle + ?Sized,
        C: PathCompressor + ?Sized,
    {
        let (la, lb) = self.edge_locations(a, b)?;
        let row_a = self.live_row(la)?;
        let row_b = self.live_row(lb)?;
        if row_a.count_of(lb) > 0 || row_b.count_of(la) > 0 {
            return Err(violation!("regions {} and {} are already neighbors", a, b));
        }
        let (rep_a, rep_b) = (row_a.representative(), row_b.representative());
        let forward = compute_path(oracle, compressor, rep_a, rep_b)?;
        let backward = compute_path(oracle, compressor, rep_b, rep_a)?;

        self.live_row_mut(la)?.push_edge(Edge::new(lb, forward));
        self.live_row_mut(lb)?.push_edge(Edge::new(la, backward));
        model.add_neighbor(a, b);
        model.add_neighbor(b, a);

        debug!("connected regions {} and {}", a, b);
        Ok(())
    }

    /// Recalculates every stored Path that may have changed its Cost because the Tiles in
    /// `touched` were blocked (`now_blocked`) or opened.
    ///
    /// Structural changes only fix the Paths of Regions that were created or rebuilt. The
    /// optimal Path between two untouched neighbors can still run through a changed Tile, and
    /// opening a Tile can create a shortcut. An entry from `a` to `b` is recalculated if the
    /// heuristic distance from `a` over one of the `touched` States to `b` does not exceed
    /// its Cost (blocked) or is below it (opened). `touched` should contain every State whose
    /// moves were affected by the edit.
    ///
    /// Like [`apply`](RegionDatabase::apply), all Paths are calculated before the table is
    /// changed. Returns the number of recalculated entries.
    pub fn revalidate_edges<O, C>(
        &mut self,
        touched: &[StateId],
        now_blocked: bool,
        oracle: &O,
        compressor: &C,
    ) -> Result<usize>
    where
        O: PathOracle + ?Sized,
        C: PathCompressor + ?Sized,
    {
        let mut stale = vec![];
        for (loc, row) in self.table.iter().enumerate() {
            let row = match row {
                Some(row) => row,
                None => continue,
            };
            let from = row.representative();
            for (k, edge) in row.edges() {
                let to = self.live_row(edge.target())?.representative();
                let affected = touched.iter().any(|&state| {
                    let detour = oracle.heuristic(from, state) + oracle.heuristic(state, to);
                    if now_blocked {
                        detour <= edge.cost()
                    } else {
                        detour < edge.cost()
                    }
                });
                if affected {
                    stale.push((loc, k, compute_path(oracle, compressor, from, to)?));
                }
            }
        }

        let count = stale.len();
        for (loc, k, path) in stale {
            self.live_row_mut(loc)?.replace_path(k, path);
        }
        trace!("revalidated {} entries", count);
        Ok(count)
    }
}
