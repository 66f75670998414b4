//! YAML run configuration.
//!
//! Every field has a default, so an empty file (or no file) is valid.
//! Command-line flags override whatever the file sets.
//!
//! ```yaml
//! grid:
//!   lat: 47.42
//!   lng: 10.98
//!   resolution: 30.0
//!   size: 1000
//!   projection: utm
//! tiles: srtm/
//! view_alt: 1.5
//! caster: parallel
//! output:
//!   png: true
//!   geojson: false
//! timelapse:
//!   step_minutes: 15
//! ```

use crate::{Result, RunnerError};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use terrashade_grid::MapProjection;
use terrashade_shadow::CasterKind;

pub const DEFAULT_VIEW_ALT: f64 = 1.5;
pub const DEFAULT_RESOLUTION: f64 = 30.0;
pub const DEFAULT_SIZE: usize = 1000;
pub const DEFAULT_STEP_MINUTES: u32 = 15;

fn default_view_alt() -> f64 {
    DEFAULT_VIEW_ALT
}

fn default_resolution() -> f64 {
    DEFAULT_RESOLUTION
}

fn default_size() -> usize {
    DEFAULT_SIZE
}

fn default_step_minutes() -> u32 {
    DEFAULT_STEP_MINUTES
}

fn default_true() -> bool {
    true
}

/// Root of a run configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunnerConfig {
    #[serde(default)]
    pub grid: GridConfig,
    /// A tile file, or a directory of tiles.
    #[serde(default)]
    pub tiles: Option<PathBuf>,
    /// Observer eye height above the ground, in meters.
    #[serde(default = "default_view_alt")]
    pub view_alt: f64,
    #[serde(default)]
    pub caster: CasterKind,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub timelapse: TimelapseConfig,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            tiles: None,
            view_alt: DEFAULT_VIEW_ALT,
            caster: CasterKind::default(),
            output: OutputConfig::default(),
            timelapse: TimelapseConfig::default(),
        }
    }
}

impl RunnerConfig {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let config: Self = serde_yaml::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let config = Self::from_reader(BufReader::new(File::open(path)?))?;
        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Load `path` if given, defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.view_alt.is_finite() || self.view_alt < 0.0 {
            return Err(RunnerError::Config(format!(
                "view_alt must be a non-negative number, got {}",
                self.view_alt
            )));
        }
        if self.timelapse.step_minutes == 0 {
            return Err(RunnerError::Config("timelapse.step_minutes must be at least 1".into()));
        }
        self.grid.validate()
    }
}

/// Where and how finely to sample terrain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GridConfig {
    /// Latitude of the grid centre.
    #[serde(default)]
    pub lat: Option<f64>,
    /// Longitude of the grid centre.
    #[serde(default)]
    pub lng: Option<f64>,
    /// Meters per cell.
    #[serde(default = "default_resolution")]
    pub resolution: f64,
    /// Cells per side.
    #[serde(default = "default_size")]
    pub size: usize,
    #[serde(default)]
    pub projection: ProjectionKind,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            lat: None,
            lng: None,
            resolution: DEFAULT_RESOLUTION,
            size: DEFAULT_SIZE,
            projection: ProjectionKind::default(),
        }
    }
}

impl GridConfig {
    /// The configured centre, `(lat, lng)`.
    pub fn centre(&self) -> Result<(f64, f64)> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Ok((lat, lng)),
            _ => Err(RunnerError::Config("grid centre needs both lat and lng".into())),
        }
    }

    fn validate(&self) -> Result<()> {
        if let Some(lat) = self.lat {
            if !(-90.0..=90.0).contains(&lat) {
                return Err(RunnerError::Config(format!("latitude {lat} out of range")));
            }
        }
        if let Some(lng) = self.lng {
            if !(-180.0..=180.0).contains(&lng) {
                return Err(RunnerError::Config(format!("longitude {lng} out of range")));
            }
        }
        if !(self.resolution.is_finite() && self.resolution > 0.0) {
            return Err(RunnerError::Config(format!(
                "resolution must be positive, got {}",
                self.resolution
            )));
        }
        if self.size == 0 {
            return Err(RunnerError::Config("size must be at least 1".into()));
        }
        Ok(())
    }
}

/// Projection families selectable from configuration.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionKind {
    /// Transverse Mercator in the UTM zone of the grid centre.
    #[default]
    Utm,
    WebMercator,
    /// Equirectangular with true scale at the grid centre.
    Equirectangular,
}

impl ProjectionKind {
    pub fn resolve(self, lat: f64, lng: f64) -> MapProjection {
        match self {
            ProjectionKind::Utm => MapProjection::utm_for(lat, lng),
            ProjectionKind::WebMercator => MapProjection::WebMercator,
            ProjectionKind::Equirectangular => MapProjection::Equirectangular { lat_ts: lat },
        }
    }
}

/// Which artifacts to write per rendered frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default = "default_true")]
    pub png: bool,
    #[serde(default)]
    pub geojson: bool,
    /// Write the sun vector and observer height next to each frame.
    #[serde(default = "default_true")]
    pub params: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            png: true,
            geojson: false,
            params: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimelapseConfig {
    #[serde(default = "default_step_minutes")]
    pub step_minutes: u32,
}

impl Default for TimelapseConfig {
    fn default() -> Self {
        Self {
            step_minutes: DEFAULT_STEP_MINUTES,
        }
    }
}
