extern crate region_pathfinding;
use env_logger::Env;

use criterion::{criterion_group, criterion_main, Criterion};

use nanorand::{Rng, WyRand};
use region_pathfinding::prelude::*;

fn uniform_map(width: usize, height: usize) -> GridMap {
    GridMap::new(width, height)
}

fn random_map(width: usize, height: usize) -> GridMap {
    let mut grid = GridMap::new(width, height);
    let mut rng = WyRand::new_seed(4);
    for state in 0..grid.len() as StateId {
        if rng.generate_range(0..10u32) == 0 {
            grid.set_blocked(state, true);
        }
    }
    // keep the corners open for the queries
    grid.set_blocked(0, false);
    grid.set_blocked(grid.len() as StateId - 1, false);
    grid
}

fn build(
    grid: &GridMap,
    sector_size: usize,
) -> (SectorAbstraction<MooreNeighborhood>, RegionDatabase) {
    let neighborhood = MooreNeighborhood::new(grid.width(), grid.height());
    let abstraction = SectorAbstraction::new(grid, neighborhood, sector_size);
    let oracle = GridOracle::new(grid, neighborhood);
    #[cfg(feature = "parallel")]
    let database = RegionDatabase::build_parallel(
        &abstraction,
        &oracle,
        &HillClimbCompressor,
        DatabaseConfig::default(),
    );
    #[cfg(not(feature = "parallel"))]
    let database = RegionDatabase::build(
        &abstraction,
        &oracle,
        &HillClimbCompressor,
        DatabaseConfig::default(),
    );
    (abstraction, database.unwrap())
}

#[allow(unused)]
// Setup logging output
fn init() {
    let env = Env::default()
        .filter_or("MY_LOG_LEVEL", "debug") // Change this from debug to trace to see every query.
        .write_style_or("MY_LOG_STYLE", "always");

    let _ = env_logger::Builder::from_env(env).is_test(true).try_init();
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("Build Database");
    group.sample_size(10);

    // Log to stdout
    init();

    let sector_size = 16;
    for map_size in [64, 256] {
        let (width, height) = (map_size, map_size);
        for (name, grid) in [
            ("Uniform", uniform_map(width, height)),
            ("Random", random_map(width, height)),
        ] {
            let neighborhood = MooreNeighborhood::new(width, height);
            let abstraction = SectorAbstraction::new(&grid, neighborhood, sector_size);
            let oracle = GridOracle::new(&grid, neighborhood);

            let id = format!(
                "Build, {} Map, Single Threaded, Map Size: ({}, {}), Sector Size: {}",
                name, width, height, sector_size
            );
            group.bench_function(&id, |b| {
                b.iter(|| {
                    RegionDatabase::build(
                        &abstraction,
                        &oracle,
                        &HillClimbCompressor,
                        DatabaseConfig::default(),
                    )
                })
            });

            #[cfg(feature = "parallel")]
            {
                let id = format!(
                    "Build, {} Map, Parallel, Map Size: ({}, {}), Sector Size: {}",
                    name, width, height, sector_size
                );
                group.bench_function(&id, |b| {
                    b.iter(|| {
                        RegionDatabase::build_parallel(
                            &abstraction,
                            &oracle,
                            &HillClimbCompressor,
                            DatabaseConfig::default(),
                        )
                    })
                });
            }
        }
    }
}

fn bench_apply_edit(c: &mut Criterion) {
    let mut group = c.benchmark_group("Apply Edit");

    let (width, height) = (256, 256);
    let sector_size = 16;
    let mut grid = random_map(width, height);
    let (mut abstraction, mut database) = build(&grid, sector_size);

    // a Tile in the middle of a Sector and one on the border between four Sectors
    for (name, point) in [("Inner Tile", (8, 8)), ("Sector Corner", (15, 15))] {
        let cell = grid.state_at(point);
        let id = format!(
            "Toggle {}, Random Map, Map Size: ({}, {}), Sector Size: {}",
            name, width, height, sector_size
        );
        group.bench_function(&id, |b| {
            b.iter(|| {
                // toggle twice to end up with the same map
                for _ in 0..2 {
                    let blocked = grid.is_open(cell);
                    grid.set_blocked(cell, blocked);
                    abstraction
                        .apply_edit(&grid, cell, &mut database, &HillClimbCompressor)
                        .unwrap();
                }
            })
        });
    }
}

fn bench_find_path(c: &mut Criterion) {
    let mut group = c.benchmark_group("Find Path");

    let sector_size = 16;
    for map_size in [64, 256] {
        let (width, height) = (map_size, map_size);
        for (name, grid) in [
            ("Uniform", uniform_map(width, height)),
            ("Random", random_map(width, height)),
        ] {
            let (abstraction, database) = build(&grid, sector_size);
            let oracle = GridOracle::new(&grid, MooreNeighborhood::new(width, height));
            let start = 0;
            let goal = grid.len() as StateId - 1;

            let id = format!(
                "Region Path, {} Map, Map Size: ({}, {}), Sector Size: {}",
                name, width, height, sector_size
            );
            let start_region = abstraction.regions().region_of(start).unwrap();
            let goal_region = abstraction.regions().region_of(goal).unwrap();
            group.bench_function(&id, |b| {
                b.iter(|| database.find_region_path(start_region, goal_region))
            });

            let id = format!(
                "Full Path, {} Map, Map Size: ({}, {}), Sector Size: {}",
                name, width, height, sector_size
            );
            group.bench_function(&id, |b| {
                b.iter(|| {
                    database.find_path(&abstraction, start, goal, &oracle, &HillClimbCompressor)
                })
            });

            let id = format!(
                "Plain A*, {} Map, Map Size: ({}, {})",
                name, width, height
            );
            group.bench_function(&id, |b| b.iter(|| oracle.find_optimal_path(start, goal)));
        }
    }
}

criterion_group!(benches, bench_build, bench_apply_edit, bench_find_path);
criterion_main!(benches);
