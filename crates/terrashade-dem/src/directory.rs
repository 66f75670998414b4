//! Index of SRTM tiles stored in a local directory.

use crate::{DemError, ElevationTile, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// File suffixes recognised as tiles.
const TILE_SUFFIXES: [&str; 3] = [".hgt", ".hgt.zip", ".hgt.gz"];

/// Tile key based on the south-west corner of the tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileKey {
    /// Latitude of the south-west corner (negative for south).
    pub lat: i32,
    /// Longitude of the south-west corner (negative for west).
    pub lon: i32,
}

impl TileKey {
    /// The tile covering a coordinate.
    ///
    /// For example, coordinate (47.5, 11.2) is in tile N47E011 and
    /// (-3.2, -71.9) is in tile S04W072.
    pub fn from_coord(lat: f64, lon: f64) -> Self {
        TileKey {
            lat: lat.floor() as i32,
            lon: lon.floor() as i32,
        }
    }

    /// Parse a key from an SRTM filename like `N47E011.hgt.zip`.
    pub fn from_filename(filename: &str) -> Option<Self> {
        let stem = filename.split('.').next()?;
        let mut chars = stem.chars().peekable();

        let is_north = match chars.next()?.to_ascii_uppercase() {
            'N' => true,
            'S' => false,
            _ => return None,
        };

        let mut lat_str = String::new();
        while let Some(&d) = chars.peek() {
            if d.is_ascii_digit() {
                lat_str.push(d);
                chars.next();
            } else {
                break;
            }
        }

        let is_east = match chars.next()?.to_ascii_uppercase() {
            'E' => true,
            'W' => false,
            _ => return None,
        };

        let lon_str: String = chars.collect();
        if lat_str.is_empty() || lon_str.is_empty() || !lon_str.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }

        let lat: i32 = lat_str.parse().ok()?;
        let lon: i32 = lon_str.parse().ok()?;

        Some(TileKey {
            lat: if is_north { lat } else { -lat },
            lon: if is_east { lon } else { -lon },
        })
    }

    /// Canonical filename stem, e.g. `N47E011`.
    pub fn stem(&self) -> String {
        format!(
            "{}{:02}{}{:03}",
            if self.lat >= 0 { 'N' } else { 'S' },
            self.lat.abs(),
            if self.lon >= 0 { 'E' } else { 'W' },
            self.lon.abs()
        )
    }
}

/// Tiles available in one or more directories, indexed by corner.
///
/// Indexing only scans filenames. Each call to [`TileDirectory::load_tile`]
/// decodes the tile from disk; nothing is kept in memory between calls.
#[derive(Debug, Default)]
pub struct TileDirectory {
    tile_paths: HashMap<TileKey, PathBuf>,
}

impl TileDirectory {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add all SRTM tile files from a directory to the index.
    ///
    /// When several containers exist for the same tile, the one whose path
    /// sorts first wins (so `N47E011.hgt` beats `N47E011.hgt.zip`).
    ///
    /// Returns the number of tiles indexed.
    pub fn add_directory<P: AsRef<Path>>(&mut self, dir: P) -> Result<usize> {
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir.as_ref())? {
            let path = entry?.path();
            if path.is_file() {
                paths.push(path);
            }
        }
        paths.sort();

        let mut count = 0;
        for path in paths {
            let Some(filename) = path.file_name().and_then(|s| s.to_str()) else {
                continue;
            };
            if !is_tile_filename(filename) {
                continue;
            }
            if let Some(key) = TileKey::from_filename(filename) {
                if !self.tile_paths.contains_key(&key) {
                    tracing::debug!(tile = %key.stem(), path = %path.display(), "Indexed tile");
                    self.tile_paths.insert(key, path);
                    count += 1;
                }
            }
        }

        Ok(count)
    }

    /// Add a single tile file to the index.
    pub fn add_file<P: AsRef<Path>>(&mut self, path: P) -> Result<TileKey> {
        let path = path.as_ref();
        let filename = path
            .file_name()
            .and_then(|s| s.to_str())
            .ok_or_else(|| DemError::InvalidFilename(path.display().to_string()))?;

        let key = TileKey::from_filename(filename)
            .ok_or_else(|| DemError::InvalidFilename(filename.to_string()))?;

        self.tile_paths.insert(key, path.to_path_buf());
        Ok(key)
    }

    /// Whether a tile covering the coordinate is indexed.
    pub fn has_tile(&self, lat: f64, lon: f64) -> bool {
        self.tile_paths.contains_key(&TileKey::from_coord(lat, lon))
    }

    /// Number of indexed tiles.
    pub fn tile_count(&self) -> usize {
        self.tile_paths.len()
    }

    /// Path of the tile covering a coordinate, if indexed.
    pub fn tile_path(&self, lat: f64, lon: f64) -> Option<&Path> {
        self.tile_paths
            .get(&TileKey::from_coord(lat, lon))
            .map(PathBuf::as_path)
    }

    /// Load the tile covering a coordinate.
    pub fn load_tile(&self, lat: f64, lon: f64) -> Result<ElevationTile> {
        let key = TileKey::from_coord(lat, lon);
        let path = self.tile_paths.get(&key).ok_or(DemError::NoSuchTile {
            lat: key.lat,
            lon: key.lon,
        })?;
        ElevationTile::from_file(path, key.lat, key.lon)
    }
}

fn is_tile_filename(filename: &str) -> bool {
    let lower = filename.to_ascii_lowercase();
    TILE_SUFFIXES.iter().any(|suffix| lower.ends_with(suffix))
}
