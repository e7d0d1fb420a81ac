#![warn(
    missing_docs,
    missing_debug_implementations,
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unstable_features,
    unused_import_braces,
    unused_qualifications
)]

//! A crate to store and incrementally maintain compressed Paths between the Regions of a Grid.
//!
//! ## Introduction
//! Searching a large Grid with A* for every request is expensive, so this crate splits the
//! Grid into Regions: small connected groups of open Tiles, each with one representative
//! Tile. For every pair of neighboring Regions, the optimal Path between their representatives
//! is calculated once, compressed to a short list of Subgoals and stored in a
//! [`RegionDatabase`]. Answering a request then only means searching the (much smaller)
//! Region Graph and stitching the stored Segments together.
//!
//! The interesting part is keeping that database up to date: when a single Tile of the Grid
//! becomes a wall or stops being one, the Regions around it may disappear, split, appear or
//! gain and lose neighbors. [`RegionDatabase::apply`] patches the stored Paths for each of
//! those [`RegionChange`]s in place, recycling the storage slots of removed Regions, so that
//! the database answers exactly as if it had been rebuilt from scratch.
//!
//! ## Examples
//! Building the database:
//! ```
//! use region_pathfinding::prelude::*;
//!
//! let grid = GridMap::from_ascii(
//!     "\
//!     ......\n\
//!     ..@@..\n\
//!     ......\n\
//!     ......",
//! );
//! let neighborhood = MooreNeighborhood::new(grid.width(), grid.height());
//! let regions = SectorAbstraction::new(&grid, neighborhood, 3);
//!
//! let database = RegionDatabase::build(
//!     &regions,
//!     &GridOracle::new(&grid, neighborhood),
//!     &HillClimbCompressor,
//!     DatabaseConfig::default(),
//! )
//! .unwrap();
//!
//! let (start, goal) = (grid.state_at((0, 0)), grid.state_at((5, 3)));
//! let path = database
//!     .find_path(&regions, start, goal, &GridOracle::new(&grid, neighborhood), &HillClimbCompressor)
//!     .unwrap();
//! assert!(path.is_some());
//! ```
//!
//! ### Updating the database
//! The database never stores the Grid. After changing a Tile, tell the abstraction about it,
//! which classifies the change and lets the database patch itself:
//! ```
//! # use region_pathfinding::prelude::*;
//! #
//! # let mut grid = GridMap::from_ascii(
//! #     "\
//! #     ......\n\
//! #     ..@@..\n\
//! #     ......\n\
//! #     ......",
//! # );
//! # let neighborhood = MooreNeighborhood::new(grid.width(), grid.height());
//! # let mut regions = SectorAbstraction::new(&grid, neighborhood, 3);
//! # let mut database = RegionDatabase::build(
//! #     &regions,
//! #     &GridOracle::new(&grid, neighborhood),
//! #     &HillClimbCompressor,
//! #     DatabaseConfig::default(),
//! # )
//! # .unwrap();
//! let cell = grid.state_at((2, 2));
//! grid.set_blocked(cell, true);
//!
//! regions
//!     .apply_edit(&grid, cell, &mut database, &HillClimbCompressor)
//!     .unwrap();
//!
//! database.check_invariants().unwrap();
//! ```

/// Identifies a single Tile (State) of the Grid: `y * width + x`
pub type StateId = u32;

/// The Type used to reference a Region
///
/// Valid identifiers start at [`REGION_ID_OFFSET`], so that `0` can mean "no Region".
pub type RegionId = u32;

/// Index of a Region inside the arrays of the [`RegionDatabase`]
pub type Location = usize;

/// The Cost of a Path. Costs are always integers.
pub type Cost = usize;

/// A shorthand for Points on the grid
pub type Point = (usize, usize);

/// The first valid [`RegionId`]
pub const REGION_ID_OFFSET: RegionId = 1;

/// Converts a [`RegionId`] into its [`Location`], or `None` for the reserved ids below
/// [`REGION_ID_OFFSET`]
pub fn region_location(id: RegionId) -> Option<Location> {
    id.checked_sub(REGION_ID_OFFSET).map(|loc| loc as Location)
}

/// Converts a [`Location`] back into the [`RegionId`] stored there
pub fn region_id(location: Location) -> RegionId {
    location as RegionId + REGION_ID_OFFSET
}

#[cfg(feature = "log")]
macro_rules! debug {
    ($($arg:tt)*) => {
        log::debug!($($arg)*)
    };
}
#[cfg(not(feature = "log"))]
macro_rules! debug {
    ($($arg:tt)*) => {{
        let _ = format_args!($($arg)*);
    }};
}

#[cfg(feature = "log")]
macro_rules! trace {
    ($($arg:tt)*) => {
        log::trace!($($arg)*)
    };
}
#[cfg(not(feature = "log"))]
macro_rules! trace {
    ($($arg:tt)*) => {{
        let _ = format_args!($($arg)*);
    }};
}

mod error;
pub use error::{Error, Result};

mod utils;

pub mod neighbors;

pub mod grid;

pub mod path;

pub mod oracle;

pub mod compress;

pub mod region;

pub mod abstraction;

pub mod database;
pub use database::{DatabaseConfig, RegionChange, RegionDatabase, RegionSeed};

/// The prelude for this crate.
pub mod prelude {
    pub use crate::{
        abstraction::SectorAbstraction,
        compress::{HillClimbCompressor, IdentityCompressor, PathCompressor},
        database::{DatabaseConfig, RegionChange, RegionDatabase, RegionSeed, TableSnapshot},
        grid::GridMap,
        neighbors::{ManhattanNeighborhood, MooreNeighborhood, Neighborhood},
        oracle::{GridOracle, PathOracle},
        path::{Path, SubgoalPath},
        region::{Region, RegionMap, RegionModel},
        Cost, Error, Location, Point, RegionId, StateId, REGION_ID_OFFSET,
    };
}
