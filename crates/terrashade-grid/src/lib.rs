//! # terrashade-grid
//!
//! Square planar grids centred on a geographic point, and height maps
//! sampled onto them.
//!
//! A [`ProjectedGrid`] fixes a projection, a resolution in planar units per
//! cell and a side length in cells. Cell `(col, row)` has row 0 at the
//! southern edge. A [`HeightMap`] pairs a grid with one altitude per cell,
//! sampled at cell centres from any [`terrashade_dem::ElevationSource`].
//!
//! ```no_run
//! use terrashade_dem::TileDirectory;
//! use terrashade_grid::{HeightMap, MapProjection, ProjectedGrid};
//!
//! let mut tiles = TileDirectory::new();
//! tiles.add_directory("srtm")?;
//! let tile = tiles.load_tile(47.42, 10.98)?;
//!
//! let grid = ProjectedGrid::new(47.42, 10.98, 30.0, 1000, MapProjection::utm_for(47.42, 10.98))?;
//! let map = HeightMap::sample(grid, &tile);
//! map.save_to_file("zugspitze.json")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod error;
mod grid;
mod heightmap;
mod projection;

pub use error::GridError;
pub use grid::{GeoBounds, PlanarBounds, ProjectedGrid};
pub use heightmap::{ElevationGrid, HeightMap};
pub use projection::{
    utm_zone, MapProjection, Projection, TransverseMercator, EARTH_RADIUS_M,
    WEB_MERCATOR_RADIUS_M,
};

/// Result type for grid operations.
pub type Result<T> = std::result::Result<T, GridError>;
