use env_logger::Env;
use hashbrown::HashMap;
use log::info;
use nanorand::{Rng, WyRand};
use region_pathfinding::{prelude::*, region_location};

// Setup logging output
fn init() {
    let env = Env::default()
        .filter_or("MY_LOG_LEVEL", "info") // Change this to debug to see every change.
        .write_style_or("MY_LOG_STYLE", "always");

    let _ = env_logger::Builder::from_env(env).is_test(true).try_init();
}

type Layout = Vec<(StateId, Vec<StateId>, Vec<(StateId, Cost)>)>;

/// Every Region as (representative, members, (neighbor representative, Cost) per edge).
///
/// Independent of the ids, so that an updated database can be compared to a rebuilt one.
fn layout<M: RegionModel>(model: &M, db: &RegionDatabase) -> Layout {
    let mut result = vec![];
    for id in model.region_ids() {
        let region = model.region(id).unwrap();
        let mut neighbors = db.neighbor_ids(id);
        neighbors.sort_unstable();
        assert_eq!(neighbors, region.neighbors(), "neighbors of region {}", id);
        assert_eq!(db.representative_of(id), Some(region.representative()));

        let mut edges: Vec<(StateId, Cost)> = neighbors
            .iter()
            .map(|&n| {
                let edge = db.edge(id, n).unwrap();
                (db.representative_of(n).unwrap(), edge.cost())
            })
            .collect();
        edges.sort_unstable();
        result.push((region.representative(), region.members().to_vec(), edges));
    }
    result.sort();
    result
}

fn build<N: Neighborhood>(
    grid: &GridMap,
    neighborhood: N,
    sector_size: usize,
) -> (SectorAbstraction<N>, RegionDatabase) {
    let abstraction = SectorAbstraction::new(grid, neighborhood.clone(), sector_size);
    let db = RegionDatabase::build(
        &abstraction,
        &GridOracle::new(grid, neighborhood),
        &HillClimbCompressor,
        DatabaseConfig::default(),
    )
    .unwrap();
    (abstraction, db)
}

fn toggle<N: Neighborhood>(
    grid: &mut GridMap,
    abstraction: &mut SectorAbstraction<N>,
    db: &mut RegionDatabase,
    cell: StateId,
) {
    let blocked = grid.is_open(cell);
    grid.set_blocked(cell, blocked);
    abstraction.apply_edit(grid, cell, db, &HillClimbCompressor).unwrap();
    db.check_invariants().unwrap();
}

/// A [`PathOracle`] answering from a fixed table of direct connections
struct TableOracle {
    costs: HashMap<(StateId, StateId), Cost>,
}

impl TableOracle {
    fn new(connections: &[(StateId, StateId, Cost)]) -> TableOracle {
        let mut costs = HashMap::new();
        for &(a, b, cost) in connections {
            costs.insert((a, b), cost);
            costs.insert((b, a), cost);
        }
        TableOracle { costs }
    }
}

impl PathOracle for TableOracle {
    fn find_optimal_path(&self, from: StateId, to: StateId) -> Option<Path<StateId>> {
        if from == to {
            return Some(Path::new(vec![from], 0));
        }
        self.costs
            .get(&(from, to))
            .map(|&cost| Path::new(vec![from, to], cost))
    }
    fn is_hill_climb_reachable(&self, from: StateId, to: StateId) -> bool {
        from == to || self.costs.contains_key(&(from, to))
    }
    fn heuristic(&self, _: StateId, _: StateId) -> Cost {
        0
    }
}

#[test]
fn direct_neighbor() {
    let grid = GridMap::new(2, 2);
    let oracle = GridOracle::new(&grid, MooreNeighborhood::new(2, 2));
    let mut regions = RegionMap::new();
    regions.insert_region(1, Region::new(0, [0], [2]));
    regions.insert_region(2, Region::new(3, [3], [1]));
    let db = RegionDatabase::build(
        &regions,
        &oracle,
        &HillClimbCompressor,
        DatabaseConfig::default(),
    )
    .unwrap();

    let path = db.find_region_path(1, 2).unwrap().unwrap();
    assert_eq!(path.cost(), 14);
    assert_eq!(path.waypoints().collect::<Vec<_>>(), vec![0, 3]);
    assert_eq!(db.edge(1, 2).unwrap().path().as_slice(), &[0, 3]);
    assert_eq!(db.edge(2, 1).unwrap().cost(), 14);
}

#[test]
fn multi_hop() {
    let oracle = TableOracle::new(&[(100, 200, 10), (200, 300, 12)]);
    let mut regions = RegionMap::new();
    regions.insert_region(1, Region::new(100, [100], [2]));
    regions.insert_region(2, Region::new(200, [200], [1, 3]));
    regions.insert_region(3, Region::new(300, [300], [2]));
    let db = RegionDatabase::build(
        &regions,
        &oracle,
        &IdentityCompressor,
        DatabaseConfig::default(),
    )
    .unwrap();

    let path = db.find_region_path(1, 3).unwrap().unwrap();
    assert_eq!(path.cost(), 22);
    assert_eq!(path.waypoints().collect::<Vec<_>>(), vec![100, 200, 300]);

    let back = db.find_region_path(3, 1).unwrap().unwrap();
    assert_eq!(back.cost(), 22);
    assert_eq!(back.waypoints().collect::<Vec<_>>(), vec![300, 200, 100]);

    let path = db
        .find_path(&regions, 100, 300, &oracle, &IdentityCompressor)
        .unwrap()
        .unwrap();
    assert_eq!(path.cost(), 22);
}

#[test]
fn eliminated_region() {
    let mut grid = GridMap::from_ascii(
        "\
        ...\n\
        ...",
    );
    let (mut abstraction, mut db) = build(&grid, ManhattanNeighborhood::new(3, 2), 1);
    let a = abstraction.regions().region_of(0).unwrap();
    let b = abstraction.regions().region_of(1).unwrap();
    let c = abstraction.regions().region_of(2).unwrap();
    assert_eq!(db.find_region_path(a, c).unwrap().unwrap().cost(), 20);

    grid.set_blocked(1, true);
    let created = abstraction
        .apply_edit(&grid, 1, &mut db, &HillClimbCompressor)
        .unwrap();
    assert!(created.is_empty());
    db.check_invariants().unwrap();

    assert!(!db.contains(b));
    assert!(db.free_locations().contains(&region_location(b).unwrap()));
    assert!(!db.neighbor_ids(a).contains(&b));
    assert!(!db.neighbor_ids(c).contains(&b));
    assert_eq!(db.find_region_path(b, c), Err(Error::UnknownRegion(b)));

    let detour = db.find_region_path(a, c).unwrap().unwrap();
    assert_eq!(detour.cost(), 40);
    assert_eq!(detour.waypoints().collect::<Vec<_>>(), vec![0, 3, 4, 5, 2]);
}

#[test]
fn reopened_corner() {
    let mut grid = GridMap::from_ascii(
        "\
        .@\n\
        @.",
    );
    let (mut abstraction, mut db) = build(&grid, MooreNeighborhood::new(2, 2), 1);
    let d = abstraction.regions().region_of(0).unwrap();
    let e = abstraction.regions().region_of(3).unwrap();
    assert_eq!(db.find_region_path(d, e).unwrap(), None);

    toggle(&mut grid, &mut abstraction, &mut db, 1);
    assert!(db.edge(d, e).is_none());
    assert_eq!(db.find_region_path(d, e).unwrap().unwrap().cost(), 20);

    toggle(&mut grid, &mut abstraction, &mut db, 2);
    assert_eq!(db.edge(d, e).unwrap().cost(), 14);
    let path = db.find_region_path(d, e).unwrap().unwrap();
    assert_eq!(path.cost(), 14);
    assert_eq!(path.waypoints().collect::<Vec<_>>(), vec![0, 3]);

    toggle(&mut grid, &mut abstraction, &mut db, 1);
    toggle(&mut grid, &mut abstraction, &mut db, 2);
    assert_eq!(db.find_region_path(d, e).unwrap(), None);
}

#[test]
fn split_region() {
    let mut grid = GridMap::from_ascii(
        "\
        .@....\n\
        ......\n\
        .@....",
    );
    let (mut abstraction, mut db) = build(&grid, ManhattanNeighborhood::new(6, 3), 3);
    let f = abstraction.regions().region_of(0).unwrap();
    let g = abstraction.regions().region_of(3).unwrap();
    assert_eq!(db.neighbor_ids(g), vec![f]);
    let capacity = db.capacity();

    grid.set_blocked(7, true);
    let created = abstraction
        .apply_edit(&grid, 7, &mut db, &HillClimbCompressor)
        .unwrap();
    db.check_invariants().unwrap();

    let f2 = abstraction.regions().region_of(2).unwrap();
    assert_ne!(f, f2);
    assert_eq!(abstraction.regions().region_of(12), Some(f));
    assert_eq!(abstraction.regions().region_of(14), Some(f2));
    assert!(created.contains(&f) && created.contains(&f2));
    assert!(db.capacity() > capacity);

    assert_eq!(db.representative_of(f), Some(6));
    assert_eq!(db.representative_of(f2), Some(8));
    assert!(db.neighbor_ids(f).is_empty());
    assert_eq!(db.neighbor_ids(g), vec![f2]);
    assert_eq!(db.edge(f2, g).unwrap().cost(), 20);
    assert_eq!(db.find_region_path(f, g).unwrap(), None);
}

#[test]
fn updates_match_a_rebuild() {
    init();
    const SIZE: usize = 12;
    let mut rng = WyRand::new_seed(17);
    let neighborhood = MooreNeighborhood::new(SIZE, SIZE);

    let mut grid = GridMap::new(SIZE, SIZE);
    for state in 0..grid.len() as StateId {
        if rng.generate_range(0..4u32) == 0 {
            grid.set_blocked(state, true);
        }
    }
    let (mut abstraction, mut db) = build(&grid, neighborhood, 4);

    for round in 0..8 {
        for _ in 0..10 {
            let cell = rng.generate_range(0..grid.len()) as StateId;
            toggle(&mut grid, &mut abstraction, &mut db, cell);
        }

        info!(
            "round {}: {} regions in {} locations",
            round,
            db.region_count(),
            db.capacity()
        );
        let (fresh, fresh_db) = build(&grid, neighborhood, 4);
        assert_eq!(
            layout(&abstraction, &db),
            layout(&fresh, &fresh_db),
            "round {}",
            round
        );

        let oracle = GridOracle::new(&grid, neighborhood);
        for _ in 0..20 {
            let start = rng.generate_range(0..grid.len()) as StateId;
            let goal = rng.generate_range(0..grid.len()) as StateId;
            let updated = db
                .find_path(&abstraction, start, goal, &oracle, &HillClimbCompressor)
                .unwrap();
            let rebuilt = fresh_db
                .find_path(&fresh, start, goal, &oracle, &HillClimbCompressor)
                .unwrap();
            assert_eq!(
                updated.map(|p| p.cost()),
                rebuilt.map(|p| p.cost()),
                "{} -> {} in round {}",
                start,
                goal,
                round
            );
        }
    }

    let json = serde_json::to_string(&db.snapshot()).unwrap();
    let copy = RegionDatabase::from_snapshot(serde_json::from_str(&json).unwrap(), *db.config())
        .unwrap();
    assert_eq!(copy.snapshot(), db.snapshot());
    assert_eq!(layout(&abstraction, &copy), layout(&abstraction, &db));
}

#[test]
fn wall_placed_and_removed() {
    let mut grid = GridMap::from_ascii(
        "\
        ........\n\
        ..@.....\n\
        ..@..@..\n\
        .....@..\n\
        ...@....\n\
        ...@@@..\n\
        ........\n\
        ........",
    );
    let (mut abstraction, mut db) = build(&grid, MooreNeighborhood::new(8, 8), 4);
    let original = layout(&abstraction, &db);

    for cell in [0, 11, 19, 27, 28, 35, 36, 43, 63] {
        toggle(&mut grid, &mut abstraction, &mut db, cell);
        toggle(&mut grid, &mut abstraction, &mut db, cell);
        assert_eq!(layout(&abstraction, &db), original, "toggling {}", cell);
    }
}

/// The Cost between every two Regions, `None` if they are not connected
fn cost_matrix(db: &RegionDatabase) -> Vec<Option<Cost>> {
    let ids: Vec<RegionId> = db.region_ids().collect();
    let mut costs = vec![];
    for &a in &ids {
        for &b in &ids {
            costs.push(db.find_region_path(a, b).unwrap().map(|path| path.cost()));
        }
    }
    costs
}

fn never_cheaper(before: &[Option<Cost>], after: &[Option<Cost>]) -> bool {
    before.iter().zip(after).all(|pair| match pair {
        (Some(before), Some(after)) => after >= before,
        (Some(_), None) => true,
        (None, after) => after.is_none(),
    })
}

#[test]
fn costs_are_monotone() {
    let grid = GridMap::new(9, 9);
    let neighborhood = MooreNeighborhood::new(9, 9);
    let oracle = GridOracle::new(&grid, neighborhood);
    let (mut abstraction, mut db) = build(&grid, neighborhood, 3);
    let center = abstraction.regions().region_of(grid.state_at((4, 4))).unwrap();
    let right = abstraction.regions().region_of(grid.state_at((7, 4))).unwrap();
    let corner = abstraction.regions().region_of(grid.state_at((8, 8))).unwrap();
    let opposite = abstraction.regions().region_of(grid.state_at((0, 0))).unwrap();
    let original = cost_matrix(&db);

    db.apply(
        RegionChange::CornerBlocker { a: center, b: right },
        &mut abstraction,
        &oracle,
        &HillClimbCompressor,
    )
    .unwrap();
    db.check_invariants().unwrap();
    let blocked = cost_matrix(&db);
    assert!(never_cheaper(&original, &blocked));
    assert_ne!(original, blocked);

    db.apply(
        RegionChange::Unblocker { a: center, b: right },
        &mut abstraction,
        &oracle,
        &HillClimbCompressor,
    )
    .unwrap();
    assert!(never_cheaper(&cost_matrix(&db), &blocked));
    assert_eq!(cost_matrix(&db), original);

    db.apply(
        RegionChange::Unblocker { a: corner, b: opposite },
        &mut abstraction,
        &oracle,
        &HillClimbCompressor,
    )
    .unwrap();
    db.check_invariants().unwrap();
    assert!(never_cheaper(&cost_matrix(&db), &original));
    assert_eq!(db.edge(opposite, corner).unwrap().cost(), 6 * 14);
}

#[test]
fn errors() {
    let grid = GridMap::new(4, 1);
    let oracle = GridOracle::new(&grid, ManhattanNeighborhood::new(4, 1));
    let mut regions = RegionMap::new();
    regions.insert_region(1, Region::new(0, [0, 1], [2]));
    regions.insert_region(2, Region::new(3, [2, 3], [1]));
    let mut db = RegionDatabase::build(
        &regions,
        &oracle,
        &HillClimbCompressor,
        DatabaseConfig::default(),
    )
    .unwrap();

    assert_eq!(db.find_region_path(1, 7), Err(Error::UnknownRegion(7)));
    assert_eq!(db.find_region_path(0, 1), Err(Error::UnknownRegion(0)));

    let result = db.apply(
        RegionChange::Unblocker { a: 1, b: 2 },
        &mut regions,
        &oracle,
        &HillClimbCompressor,
    );
    assert!(matches!(result, Err(Error::InvariantViolation(_))));
    let result = db.apply(
        RegionChange::Elimination { region: 5 },
        &mut regions,
        &oracle,
        &HillClimbCompressor,
    );
    assert_eq!(result, Err(Error::UnknownRegion(5)));
    db.check_invariants().unwrap();

    let mut blocked = grid.clone();
    blocked.set_blocked(2, true);
    let result = RegionDatabase::build(
        &regions,
        &GridOracle::new(&blocked, ManhattanNeighborhood::new(4, 1)),
        &HillClimbCompressor,
        DatabaseConfig::default(),
    );
    assert!(matches!(result, Err(Error::UnreachablePath { .. })));
}
