//! # terrashade-shadow
//!
//! Terrain shadow casting over projected height maps.
//!
//! A [`ShadowMap`] borrows an elevation grid and fixes one sun position. A
//! [`ShadowCaster`] traces a sightline from every cell towards the sun and
//! returns an [`IlluminationGrid`], which the [`export`] functions write as a
//! PNG or as GeoJSON polygons.
//!
//! ```no_run
//! use terrashade_grid::HeightMap;
//! use terrashade_shadow::{export, CasterKind, ShadowMap, ShadowParams, SunVector};
//!
//! let map: HeightMap = HeightMap::load_from_file("zugspitze.json")?;
//! let params = ShadowParams::new(SunVector::from_solar_position(0.4, 0.2, 0.0), 1.5);
//! let shadow_map = ShadowMap::for_heightmap(&map, &params)?;
//! let lit = CasterKind::Parallel.caster().render(&shadow_map);
//! export::save_png(&lit, "shadows.png")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod caster;
mod error;
pub mod export;
mod illumination;
mod shadow_map;
mod sun;

pub use caster::{CasterKind, ParallelCaster, SerialCaster, ShadowCaster};
pub use error::ShadowError;
pub use illumination::IlluminationGrid;
pub use shadow_map::ShadowMap;
pub use sun::{projection_north_deviation, ShadowParams, SunVector};

/// Result type for shadow operations.
pub type Result<T> = std::result::Result<T, ShadowError>;
