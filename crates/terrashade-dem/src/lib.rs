//! # terrashade-dem
//!
//! Reader for SRTM elevation tiles.
//!
//! ## Overview
//!
//! SRTM tiles cover one degree of latitude and longitude each and come in
//! two resolutions:
//! - SRTM3: 1201 x 1201 samples, 3 arc-second (~90 m)
//! - SRTM1: 3601 x 3601 samples, 1 arc-second (~30 m)
//!
//! Each sample is a big-endian signed 16-bit altitude in meters. The value
//! -32768 marks a void. Tiles are named after their south-west corner, e.g.
//! `N47E011.hgt`, and are usually shipped as single-member zip archives.
//!
//! ## Example
//!
//! ```no_run
//! use terrashade_dem::{ElevationTile, TileDirectory};
//!
//! // Index a directory of tiles and load the one covering a point
//! let mut directory = TileDirectory::new();
//! directory.add_directory("srtm")?;
//! let tile = directory.load_tile(47.42, 10.98)?;
//!
//! // Or load a tile file directly
//! let tile = ElevationTile::from_file("srtm/N47E010.hgt.zip", 47, 10)?;
//! match tile.altitude(47.42, 10.98)? {
//!     Some(altitude) => println!("Altitude: {altitude} meters"),
//!     None => println!("No data"),
//! }
//! # Ok::<(), terrashade_dem::DemError>(())
//! ```

mod container;
mod directory;
mod error;
mod source;
mod tile;

pub use container::ContainerKind;
pub use directory::{TileDirectory, TileKey};
pub use error::DemError;
pub use source::ElevationSource;
pub use tile::{ElevationTile, TileResolution, VOID_VALUE};

/// Result type for DEM operations.
pub type Result<T> = std::result::Result<T, DemError>;
