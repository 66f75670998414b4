//! Writing illumination grids as images and geographic polygons.

use crate::illumination::IlluminationGrid;
use crate::{Result, ShadowError};
use image::{GrayImage, ImageFormat, Luma};
use serde_json::{json, Value};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use terrashade_grid::{Projection, ProjectedGrid};

/// Grey level of a lit pixel.
pub const LIT: u8 = 255;
/// Grey level of a shadowed pixel.
pub const SHADOWED: u8 = 0;

/// `(lat, lng)` corners of one cell, counter-clockwise from south-west.
pub type CellFootprint = [(f64, f64); 4];

/// Grayscale image of `illumination`, north up.
pub fn to_image(illumination: &IlluminationGrid) -> GrayImage {
    let size = illumination.size() as u32;
    GrayImage::from_fn(size, size, |x, y| {
        let row = (size - 1 - y) as usize;
        if illumination.is_lit(x as usize, row) {
            Luma([LIT])
        } else {
            Luma([SHADOWED])
        }
    })
}

/// Write `illumination` as an 8-bit grayscale PNG.
pub fn save_png<Q: AsRef<Path>>(illumination: &IlluminationGrid, path: Q) -> Result<()> {
    to_image(illumination).save_with_format(path.as_ref(), ImageFormat::Png)?;
    tracing::debug!(path = %path.as_ref().display(), "Wrote illumination image");
    Ok(())
}

fn check_size<P>(grid: &ProjectedGrid<P>, illumination: &IlluminationGrid) -> Result<()> {
    if grid.size() != illumination.size() {
        return Err(ShadowError::SizeMismatch {
            expected: grid.size(),
            actual: illumination.size(),
        });
    }
    Ok(())
}

/// Geographic footprint of every lit cell, in `lit_cells` order.
///
/// Corners are placed on the planar cell edges and then unprojected.
pub fn lit_polygons<P: Projection>(
    grid: &ProjectedGrid<P>,
    illumination: &IlluminationGrid,
) -> Result<Vec<CellFootprint>> {
    check_size(grid, illumination)?;
    Ok(illumination
        .lit_cells()
        .map(|(col, row)| cell_footprint(grid, col, row))
        .collect())
}

/// Geographic corners of cell `(col, row)`.
pub fn cell_footprint<P: Projection>(grid: &ProjectedGrid<P>, col: usize, row: usize) -> CellFootprint {
    let (c, r) = (col as f64, row as f64);
    [
        grid.grid_index_to_lat_lng(c, r),
        grid.grid_index_to_lat_lng(c + 1.0, r),
        grid.grid_index_to_lat_lng(c + 1.0, r + 1.0),
        grid.grid_index_to_lat_lng(c, r + 1.0),
    ]
}

/// GeoJSON `FeatureCollection` with one polygon per lit cell.
pub fn to_geojson<P: Projection>(grid: &ProjectedGrid<P>, illumination: &IlluminationGrid) -> Result<Value> {
    check_size(grid, illumination)?;
    let features: Vec<Value> = illumination
        .lit_cells()
        .map(|(col, row)| {
            let corners = cell_footprint(grid, col, row);
            // GeoJSON positions are [lng, lat] and rings repeat their first position.
            let mut ring: Vec<[f64; 2]> = corners.iter().map(|&(lat, lng)| [lng, lat]).collect();
            ring.push(ring[0]);
            json!({
                "type": "Feature",
                "properties": { "col": col, "row": row },
                "geometry": { "type": "Polygon", "coordinates": [ring] },
            })
        })
        .collect();

    Ok(json!({
        "type": "FeatureCollection",
        "features": features,
    }))
}

/// Write the lit-cell polygons as GeoJSON.
pub fn write_geojson<P: Projection, W: Write>(
    grid: &ProjectedGrid<P>,
    illumination: &IlluminationGrid,
    writer: W,
) -> Result<()> {
    serde_json::to_writer(writer, &to_geojson(grid, illumination)?)?;
    Ok(())
}

pub fn save_geojson<P: Projection, Q: AsRef<Path>>(
    grid: &ProjectedGrid<P>,
    illumination: &IlluminationGrid,
    path: Q,
) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path.as_ref())?);
    write_geojson(grid, illumination, &mut writer)?;
    writer.flush()?;
    tracing::debug!(
        path = %path.as_ref().display(),
        polygons = illumination.lit_count(),
        "Wrote lit polygons"
    );
    Ok(())
}
