//! Point elevation sources.

use crate::{ElevationTile, Result};

/// Anything that can answer point altitude queries.
///
/// `Ok(None)` is a void answer: the source covers the point but has no
/// elevation for it. Implementations must be `Sync` so grids can be sampled
/// from several threads at once.
pub trait ElevationSource: Sync {
    /// Altitude in meters at a geographic coordinate.
    fn altitude(&self, lat: f64, lon: f64) -> Result<Option<f64>>;
}

impl ElevationSource for ElevationTile {
    fn altitude(&self, lat: f64, lon: f64) -> Result<Option<f64>> {
        ElevationTile::altitude(self, lat, lon)
    }
}

impl<T: ElevationSource + ?Sized> ElevationSource for &T {
    fn altitude(&self, lat: f64, lon: f64) -> Result<Option<f64>> {
        (**self).altitude(lat, lon)
    }
}
