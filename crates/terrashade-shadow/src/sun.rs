//! Sun direction in grid space.

use crate::{Result, ShadowError};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use terrashade_grid::Projection;

/// Latitude offset (degrees) used to measure where north points on a grid.
const NORTH_PROBE_DEG: f64 = 0.2;

/// Unit vector pointing from the ground towards the sun.
///
/// `x` points along grid columns (east), `y` along grid rows (north) and
/// `z` straight up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SunVector {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl SunVector {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Sun vector for a solar position.
    ///
    /// `azimuth` is measured from south, positive towards west, and
    /// `altitude` above the horizon, both in radians. `north_deviation` is
    /// the angle between grid north and true north, see
    /// [`projection_north_deviation`].
    pub fn from_solar_position(azimuth: f64, altitude: f64, north_deviation: f64) -> Self {
        let heading = azimuth - north_deviation;
        Self {
            x: -heading.sin() * altitude.cos(),
            y: -heading.cos() * altitude.cos(),
            z: altitude.sin(),
        }
    }

    /// True when the sun has no horizontal component.
    pub fn is_overhead(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    pub fn is_above_horizon(&self) -> bool {
        self.z > 0.0
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// Angle, in radians, by which true north at `(lat, lng)` deviates from the
/// planar `+y` axis of `projection`. Positive when north leans east.
pub fn projection_north_deviation<P: Projection + ?Sized>(projection: &P, lat: f64, lng: f64) -> f64 {
    let (x1, y1) = projection.forward(lng, lat - NORTH_PROBE_DEG);
    let (x2, y2) = projection.forward(lng, lat + NORTH_PROBE_DEG);
    (x2 - x1).atan2(y2 - y1)
}

/// Everything besides the height map needed to reproduce one render.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShadowParams {
    pub sun: SunVector,
    /// Observer eye height above the ground, in height map units.
    pub view_alt: f64,
}

impl ShadowParams {
    pub fn new(sun: SunVector, view_alt: f64) -> Self {
        Self { sun, view_alt }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if !self.sun.is_finite() {
            return Err(ShadowError::InvalidParams(format!(
                "sun vector {:?} is not finite",
                self.sun
            )));
        }
        if !self.view_alt.is_finite() {
            return Err(ShadowError::InvalidParams(format!(
                "view altitude {} is not finite",
                self.view_alt
            )));
        }
        Ok(())
    }

    /// Write the parameters as JSON.
    pub fn save<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    pub fn save_to_file<Q: AsRef<Path>>(&self, path: Q) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.save(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    pub fn load<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn load_from_file<Q: AsRef<Path>>(path: Q) -> Result<Self> {
        Self::load(BufReader::new(File::open(path)?))
    }
}
