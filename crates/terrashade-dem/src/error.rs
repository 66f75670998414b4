//! Error types for the DEM crate.

use thiserror::Error;

/// Errors that can occur when working with elevation tiles.
#[derive(Debug, Error)]
pub enum DemError {
    /// I/O error reading a file or stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Zip archive could not be read.
    #[error("Zip archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// The tile data does not match a supported SRTM layout.
    #[error("Invalid tile data for {lat}, {lon}: {reason}")]
    InvalidTileFormat {
        /// Latitude of the tile's south-west corner.
        lat: i32,
        /// Longitude of the tile's south-west corner.
        lon: i32,
        /// What was wrong with the data.
        reason: String,
    },

    /// Coordinate lies outside the square covered by the tile.
    #[error("Tile {tile_lat}, {tile_lon} does not contain data for ({lat}, {lon})")]
    OutOfTileBounds {
        /// Latitude of the tile's south-west corner.
        tile_lat: i32,
        /// Longitude of the tile's south-west corner.
        tile_lon: i32,
        /// Requested latitude.
        lat: f64,
        /// Requested longitude.
        lon: f64,
    },

    /// No tile in the directory covers the coordinate.
    #[error("No tile for {lat}, {lon} available")]
    NoSuchTile {
        /// Latitude of the missing tile's south-west corner.
        lat: i32,
        /// Longitude of the missing tile's south-west corner.
        lon: i32,
    },

    /// Invalid tile filename - cannot parse coordinates.
    #[error("Invalid tile filename: {0}")]
    InvalidFilename(String),
}
