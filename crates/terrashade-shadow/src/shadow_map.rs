//! Per-cell sightline tracing towards the sun.

use crate::sun::ShadowParams;
use crate::Result;
use terrashade_grid::{ElevationGrid, HeightMap};

/// An elevation grid prepared for tracing with one sun position.
///
/// Cheap to build. The altitude range is taken from the elevation grid,
/// which computes it once when it is constructed.
#[derive(Debug, Clone)]
pub struct ShadowMap<'a> {
    elevations: &'a ElevationGrid,
    size: usize,
    sun_x: f64,
    sun_y: f64,
    /// Vertical component scaled by the grid resolution, so that it is
    /// expressed in altitude units per cell.
    sun_z: f64,
    view_alt: f64,
    min: f64,
    max: f64,
    /// Ray rise per step along the dominant axis. `None` for an overhead sun.
    zv: Option<f64>,
}

impl<'a> ShadowMap<'a> {
    /// Prepare `elevations`, whose cells are `resolution` altitude units
    /// wide, for tracing.
    pub fn new(elevations: &'a ElevationGrid, resolution: f64, params: &ShadowParams) -> Result<Self> {
        params.validate()?;
        let sun = params.sun;
        let sun_z = sun.z * resolution;
        let horizontal = sun.x.hypot(sun.y);
        let zv = (horizontal > 0.0).then(|| sun_z / horizontal);

        // With no known cells every cell is unlit and the range is unused.
        let min = elevations.min_height().unwrap_or(0.0);
        let max = elevations.max_height().unwrap_or(0.0);

        Ok(Self {
            elevations,
            size: elevations.size(),
            sun_x: sun.x,
            sun_y: sun.y,
            sun_z,
            view_alt: params.view_alt,
            min,
            max,
            zv,
        })
    }

    /// Prepare a height map, using its grid resolution.
    pub fn for_heightmap<P>(map: &'a HeightMap<P>, params: &ShadowParams) -> Result<Self> {
        Self::new(map.elevations(), map.grid().resolution(), params)
    }

    /// Cells per side.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Vertical sun component in altitude units per cell.
    pub fn sun_z(&self) -> f64 {
        self.sun_z
    }

    pub fn elevations(&self) -> &ElevationGrid {
        self.elevations
    }

    /// Whether cell `(col, row)` has an unobstructed line of sight to the sun.
    ///
    /// The ray starts `view_alt` above the cell and steps cell by cell along
    /// the sun's horizontal direction, rising by a fixed amount per step. It
    /// is blocked by the first cell strictly higher than the ray. It escapes
    /// once it leaves the grid, or once it reaches the grid's lowest or
    /// highest altitude, including at the start.
    ///
    /// A cell without a known altitude is never lit. Unknown cells along the
    /// ray never block it.
    ///
    /// # Panics
    /// Panics if the cell lies outside the grid.
    pub fn is_lit(&self, col: usize, row: usize) -> bool {
        let Some(ground) = self.elevations.height(col, row) else {
            return false;
        };
        let Some(zv) = self.zv else {
            return true;
        };

        let size = self.size as i64;
        let (x0, y0) = (col as f64, row as f64);
        let x1 = x0 + self.sun_x * self.size as f64;
        let y1 = y0 + self.sun_y * self.size as f64;

        let steep = (y1 - y0).abs() > (x1 - x0).abs();
        let (x0, y0, x1, y1) = if steep { (y0, x0, y1, x1) } else { (x0, y0, x1, y1) };

        let deltax = (x1 - x0).abs();
        let deltay = (y1 - y0).abs();
        let xstep: i64 = if x0 < x1 { 1 } else { -1 };
        let ystep: i64 = if y0 < y1 { 1 } else { -1 };

        let mut error = -deltax / 2.0;
        let mut x = x0 as i64;
        let mut y = y0 as i64;
        let mut z = ground + self.view_alt;
        if self.escapes(z) {
            return true;
        }

        loop {
            error += deltay;
            if error > 0.0 {
                y += ystep;
                error -= deltax;
            }
            x += xstep;
            z += zv;

            let (c, r) = if steep { (y, x) } else { (x, y) };
            if c < 0 || r < 0 || c >= size || r >= size {
                return true;
            }
            if self.escapes(z) {
                return true;
            }
            if let Some(terrain) = self.elevations.height(c as usize, r as usize) {
                if terrain > z {
                    return false;
                }
            }
        }
    }

    /// A ray at or beyond either altitude extreme can no longer be blocked.
    fn escapes(&self, z: f64) -> bool {
        z <= self.min || z >= self.max
    }
}
