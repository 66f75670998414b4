//! Square planar windows centred on a geographic point.

use crate::projection::{MapProjection, Projection};
use crate::{GridError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Planar bounds of a grid, in projection units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanarBounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

/// Geographic bounding box of a grid, in degrees.
///
/// Obtained by unprojecting the south-west and north-east planar corners,
/// so it is only approximate for projections that are not aligned with
/// meridians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

/// A square window of `size` x `size` cells in planar coordinates.
///
/// Cell `(col, row)` covers grid coordinates `[col, col+1) x [row, row+1)`;
/// row 0 is the southern edge and column 0 the western edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectedGrid<P = MapProjection> {
    /// Latitude of the centre.
    lat: f64,
    /// Longitude of the centre.
    lng: f64,
    /// Planar units per cell.
    resolution: f64,
    /// Cells per side.
    size: usize,
    /// Planar side length, `size * resolution`.
    psize: f64,
    projection: P,
    bounds: PlanarBounds,
    geo_bounds: GeoBounds,
}

impl<P: Projection> ProjectedGrid<P> {
    /// Build a grid centred on `(lat, lng)`.
    pub fn new(lat: f64, lng: f64, resolution: f64, size: usize, projection: P) -> Result<Self> {
        if !(resolution.is_finite() && resolution > 0.0) {
            return Err(GridError::InvalidGrid(format!(
                "resolution must be positive, got {resolution}"
            )));
        }
        if size == 0 {
            return Err(GridError::InvalidGrid("size must be at least one cell".into()));
        }

        let psize = size as f64 * resolution;
        let (cx, cy) = projection.forward(lng, lat);
        if !(cx.is_finite() && cy.is_finite()) {
            return Err(GridError::Projection(format!(
                "centre ({lat}, {lng}) projected to ({cx}, {cy})"
            )));
        }

        let bounds = PlanarBounds {
            min_x: cx - psize / 2.0,
            min_y: cy - psize / 2.0,
            max_x: cx + psize / 2.0,
            max_y: cy + psize / 2.0,
        };

        let (west, south) = projection.inverse(bounds.min_x, bounds.min_y);
        let (east, north) = projection.inverse(bounds.max_x, bounds.max_y);
        let geo_bounds = GeoBounds {
            south,
            west,
            north,
            east,
        };
        if ![south, west, north, east].iter().all(|v| v.is_finite()) {
            return Err(GridError::Projection(format!(
                "grid corners unprojected to {geo_bounds:?}"
            )));
        }

        Ok(Self {
            lat,
            lng,
            resolution,
            size,
            psize,
            projection,
            bounds,
            geo_bounds,
        })
    }

    /// Continuous `(col, row)` grid coordinates of a geographic point.
    pub fn to_grid_index(&self, lat: f64, lng: f64) -> (f64, f64) {
        let (x, y) = self.projection.forward(lng, lat);
        self.planar_to_grid_index(x, y)
    }

    /// Continuous `(col, row)` grid coordinates of a planar point.
    pub fn planar_to_grid_index(&self, x: f64, y: f64) -> (f64, f64) {
        (
            (x - self.bounds.min_x) / self.psize * self.size as f64,
            (y - self.bounds.min_y) / self.psize * self.size as f64,
        )
    }

    /// The cell containing a geographic point, if it lies inside the grid.
    pub fn cell_at(&self, lat: f64, lng: f64) -> Option<(usize, usize)> {
        let (col, row) = self.to_grid_index(lat, lng);
        let in_range = |v: f64| v >= 0.0 && v < self.size as f64;
        (in_range(col) && in_range(row)).then(|| (col as usize, row as usize))
    }

    /// Planar coordinates of continuous grid coordinates.
    pub fn grid_index_to_planar(&self, col: f64, row: f64) -> (f64, f64) {
        (
            self.bounds.min_x + col / self.size as f64 * self.psize,
            self.bounds.min_y + row / self.size as f64 * self.psize,
        )
    }

    /// Geographic `(lat, lng)` of continuous grid coordinates.
    pub fn grid_index_to_lat_lng(&self, col: f64, row: f64) -> (f64, f64) {
        let (x, y) = self.grid_index_to_planar(col, row);
        self.planar_to_lat_lng(x, y)
    }

    /// Geographic `(lat, lng)` of a planar point.
    pub fn planar_to_lat_lng(&self, x: f64, y: f64) -> (f64, f64) {
        let (lng, lat) = self.projection.inverse(x, y);
        (lat, lng)
    }

    /// Geographic `(lat, lng)` of the centre of cell `(col, row)`.
    pub fn cell_center_lat_lng(&self, col: usize, row: usize) -> (f64, f64) {
        self.grid_index_to_lat_lng(col as f64 + 0.5, row as f64 + 0.5)
    }
}

impl<P> ProjectedGrid<P> {
    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lng(&self) -> f64 {
        self.lng
    }

    /// Planar units per cell.
    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    /// Cells per side.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Planar side length.
    pub fn psize(&self) -> f64 {
        self.psize
    }

    pub fn bounds(&self) -> PlanarBounds {
        self.bounds
    }

    pub fn geo_bounds(&self) -> GeoBounds {
        self.geo_bounds
    }

    pub fn projection(&self) -> &P {
        &self.projection
    }
}

impl<P: Serialize> ProjectedGrid<P> {
    /// Write the grid definition as JSON.
    pub fn save<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer(writer, self)?;
        Ok(())
    }

    /// Write the grid definition to a file.
    pub fn save_to_file<Q: AsRef<Path>>(&self, path: Q) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.save(&mut writer)?;
        writer.flush()?;
        Ok(())
    }
}

impl<P: DeserializeOwned> ProjectedGrid<P> {
    /// Restore a grid written by [`ProjectedGrid::save`].
    pub fn load<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Restore a grid from a file.
    pub fn load_from_file<Q: AsRef<Path>>(path: Q) -> Result<Self> {
        Self::load(BufReader::new(File::open(path)?))
    }
}
