//! Single SRTM tile representation.

use crate::container::{self, ContainerKind};
use crate::{DemError, Result};
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use std::time::Instant;
use terrashade_metrics::metric_defs;

/// Sample value marking areas without elevation data.
pub const VOID_VALUE: i16 = -32768;

/// The two SRTM grid resolutions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileResolution {
    /// 3 arc-second data, 1201 x 1201 samples.
    Srtm3,
    /// 1 arc-second data, 3601 x 3601 samples.
    Srtm1,
}

impl TileResolution {
    /// Samples per tile edge.
    pub const fn size(self) -> usize {
        match self {
            TileResolution::Srtm3 => 1201,
            TileResolution::Srtm1 => 3601,
        }
    }

    /// Angular spacing between samples in arc-seconds.
    pub const fn arc_seconds(self) -> u32 {
        match self {
            TileResolution::Srtm3 => 3,
            TileResolution::Srtm1 => 1,
        }
    }

    /// Match an edge length against the supported resolutions.
    pub fn from_size(size: usize) -> Option<Self> {
        match size {
            1201 => Some(TileResolution::Srtm3),
            3601 => Some(TileResolution::Srtm1),
            _ => None,
        }
    }
}

/// One degree by one degree of SRTM elevation samples.
///
/// The tile holds data for the area from (lat, lon) to (lat+1, lon+1)
/// inclusive, so adjacent tiles share one row or column of samples. Every
/// point of the half-open square can therefore be interpolated from a
/// single tile.
#[derive(Debug, Clone)]
pub struct ElevationTile {
    /// Latitude of the south-west corner.
    lat: i32,
    /// Longitude of the south-west corner.
    lon: i32,
    resolution: TileResolution,
    /// Samples in row-major order, north to south, west to east.
    data: Vec<i16>,
}

impl ElevationTile {
    /// Decode a tile from big-endian sample bytes.
    ///
    /// The byte count must be `2 * size * size` for a supported `size`.
    pub fn from_bytes(bytes: &[u8], lat: i32, lon: i32) -> Result<Self> {
        let invalid = |reason: String| DemError::InvalidTileFormat { lat, lon, reason };

        if bytes.len() % 2 != 0 {
            return Err(invalid(format!("odd byte count {}", bytes.len())));
        }
        let samples = bytes.len() / 2;
        let size = (samples as f64).sqrt() as usize;
        let resolution = TileResolution::from_size(size)
            .ok_or_else(|| invalid(format!("unsupported grid size {size}")))?;
        if size * size != samples {
            return Err(invalid(format!("{samples} samples is not a {size}x{size} grid")));
        }

        let data = bytes
            .chunks_exact(2)
            .map(|pair| i16::from_be_bytes([pair[0], pair[1]]))
            .collect();

        Ok(Self {
            lat,
            lon,
            resolution,
            data,
        })
    }

    /// Build a tile from samples that are already in host order.
    ///
    /// `samples` uses the on-disk layout: the first sample is the north-west
    /// corner.
    pub fn from_samples(samples: Vec<i16>, lat: i32, lon: i32) -> Result<Self> {
        let size = (samples.len() as f64).sqrt() as usize;
        let resolution = TileResolution::from_size(size)
            .filter(|_| size * size == samples.len())
            .ok_or_else(|| DemError::InvalidTileFormat {
                lat,
                lon,
                reason: format!("{} samples is not a supported grid", samples.len()),
            })?;

        Ok(Self {
            lat,
            lon,
            resolution,
            data: samples,
        })
    }

    /// Decode a tile from an uncompressed sample stream.
    pub fn from_reader<R: Read>(reader: R, lat: i32, lon: i32) -> Result<Self> {
        Self::from_bytes(&container::read_bounded(reader)?, lat, lon)
    }

    /// Decode a tile from a zip archive holding exactly one member.
    pub fn from_archive<R: Read + Seek>(reader: R, lat: i32, lon: i32) -> Result<Self> {
        Self::from_bytes(&container::unpack_zip(reader, lat, lon)?, lat, lon)
    }

    /// Decode a tile from a gzip-compressed sample stream.
    pub fn from_gzip<R: Read>(reader: R, lat: i32, lon: i32) -> Result<Self> {
        Self::from_bytes(&container::unpack_gzip(reader)?, lat, lon)
    }

    /// Load a tile from a file, detecting the container from its contents.
    pub fn from_file<P: AsRef<Path>>(path: P, lat: i32, lon: i32) -> Result<Self> {
        let path = path.as_ref();
        let start = Instant::now();
        let mut file = std::fs::File::open(path)?;

        let mut header = [0u8; 4];
        let read = file.read(&mut header)?;
        file.seek(SeekFrom::Start(0))?;
        let kind = ContainerKind::detect(&header[..read]);

        let tile = match kind {
            ContainerKind::Zip => Self::from_archive(file, lat, lon)?,
            ContainerKind::Gzip => Self::from_gzip(file, lat, lon)?,
            ContainerKind::Raw => Self::from_reader(file, lat, lon)?,
        };

        let elapsed = start.elapsed();
        metrics::counter!(metric_defs::TILES_LOADED.name, "container" => kind.as_str()).increment(1);
        metrics::histogram!(metric_defs::TILE_DECODE_TIME.name).record(elapsed.as_secs_f64() * 1000.0);
        tracing::info!(
            path = %path.display(),
            container = %kind,
            size = tile.size(),
            "Loaded elevation tile {}, {} in {:?}",
            lat,
            lon,
            elapsed
        );

        Ok(tile)
    }

    /// Latitude of the south-west corner.
    pub fn lat(&self) -> i32 {
        self.lat
    }

    /// Longitude of the south-west corner.
    pub fn lon(&self) -> i32 {
        self.lon
    }

    /// Samples per edge.
    pub fn size(&self) -> usize {
        self.resolution.size()
    }

    pub fn resolution(&self) -> TileResolution {
        self.resolution
    }

    /// Whether `(lat, lon)` lies in the half-open square this tile answers for.
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        let lat_frac = lat - self.lat as f64;
        let lon_frac = lon - self.lon as f64;
        (0.0..1.0).contains(&lat_frac) && (0.0..1.0).contains(&lon_frac)
    }

    /// Sample at grid column `x`, row `y`, with row 0 the southern edge.
    ///
    /// Returns `None` for void samples.
    ///
    /// # Panics
    /// Panics if `x` or `y` is not below the tile size.
    pub fn pixel(&self, x: usize, y: usize) -> Option<i16> {
        let size = self.size();
        assert!(x < size, "x: {x} < {size}");
        assert!(y < size, "y: {y} < {size}");
        // Storage runs north to south, rows are numbered south to north.
        let value = self.data[x + size * (size - y - 1)];
        (value != VOID_VALUE).then_some(value)
    }

    /// Interpolated altitude in meters at a geographic coordinate.
    ///
    /// Uses the four neighbouring samples. Void neighbours drop out of the
    /// average; `Ok(None)` means every contributing sample was void.
    pub fn altitude(&self, lat: f64, lon: f64) -> Result<Option<f64>> {
        if !self.contains(lat, lon) {
            return Err(DemError::OutOfTileBounds {
                tile_lat: self.lat,
                tile_lon: self.lon,
                lat,
                lon,
            });
        }

        let span = (self.size() - 1) as f64;
        let max_base = self.size() - 2;
        let x = (lon - self.lon as f64) * span;
        let y = (lat - self.lat as f64) * span;

        let x_int = (x.floor() as usize).min(max_base);
        let y_int = (y.floor() as usize).min(max_base);
        let x_frac = x - x_int as f64;
        let y_frac = y - y_int as f64;

        let value00 = self.pixel(x_int, y_int).map(f64::from);
        let value10 = self.pixel(x_int + 1, y_int).map(f64::from);
        let value01 = self.pixel(x_int, y_int + 1).map(f64::from);
        let value11 = self.pixel(x_int + 1, y_int + 1).map(f64::from);

        let south = weighted_average(value00, value10, x_frac);
        let north = weighted_average(value01, value11, x_frac);
        Ok(weighted_average(south, north, y_frac))
    }
}

/// Weighted average of two possibly void values.
///
/// A single void input yields the other value; two void inputs yield void.
fn weighted_average(value1: Option<f64>, value2: Option<f64>, weight: f64) -> Option<f64> {
    match (value1, value2) {
        (None, v) | (v, None) => v,
        (Some(v1), Some(v2)) => Some(v2 * weight + v1 * (1.0 - weight)),
    }
}
