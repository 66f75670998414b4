//! Elevation samples aligned to a projected grid.

use crate::grid::ProjectedGrid;
use crate::projection::{MapProjection, Projection};
use crate::{GridError, Result};
use rayon::prelude::*;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::time::Instant;
use terrashade_dem::{DemError, ElevationSource};
use terrashade_metrics::metric_defs;

/// A square grid of altitudes, row 0 south, with unknown cells as `None`.
///
/// The extrema over the known cells are computed once on construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ElevationGridData")]
pub struct ElevationGrid {
    size: usize,
    /// Row-major, `heights[row * size + col]`.
    heights: Vec<Option<f64>>,
    #[serde(skip)]
    extrema: Option<(f64, f64)>,
}

#[derive(Deserialize)]
struct ElevationGridData {
    size: usize,
    heights: Vec<Option<f64>>,
}

impl TryFrom<ElevationGridData> for ElevationGrid {
    type Error = GridError;

    fn try_from(data: ElevationGridData) -> Result<Self> {
        ElevationGrid::new(data.size, data.heights)
    }
}

impl ElevationGrid {
    /// Wrap `size * size` row-major heights.
    pub fn new(size: usize, heights: Vec<Option<f64>>) -> Result<Self> {
        let expected = size * size;
        if heights.len() != expected {
            return Err(GridError::SizeMismatch {
                expected,
                actual: heights.len(),
            });
        }

        Ok(Self::from_rows(size, heights))
    }

    fn from_rows(size: usize, heights: Vec<Option<f64>>) -> Self {
        let extrema = heights.iter().flatten().fold(None, |acc, &h| match acc {
            None => Some((h, h)),
            Some((lo, hi)) => Some((f64::min(lo, h), f64::max(hi, h))),
        });

        Self {
            size,
            heights,
            extrema,
        }
    }

    /// Grid where every cell has the same known altitude.
    pub fn flat(size: usize, altitude: f64) -> Self {
        Self {
            size,
            heights: vec![Some(altitude); size * size],
            extrema: Some((altitude, altitude)),
        }
    }

    /// Cells per side.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Altitude of cell `(col, row)`, or `None` if unknown.
    ///
    /// # Panics
    /// Panics if the cell lies outside the grid.
    #[inline]
    pub fn height(&self, col: usize, row: usize) -> Option<f64> {
        assert!(col < self.size && row < self.size, "cell ({col}, {row}) outside {}", self.size);
        self.heights[row * self.size + col]
    }

    /// Row-major heights.
    pub fn heights(&self) -> &[Option<f64>] {
        &self.heights
    }

    /// Lowest known altitude.
    pub fn min_height(&self) -> Option<f64> {
        self.extrema.map(|(lo, _)| lo)
    }

    /// Highest known altitude.
    pub fn max_height(&self) -> Option<f64> {
        self.extrema.map(|(_, hi)| hi)
    }

    /// Number of cells with an unknown altitude.
    pub fn unknown_count(&self) -> usize {
        self.heights.iter().filter(|h| h.is_none()).count()
    }
}

/// Per-row tallies gathered while sampling.
#[derive(Debug, Default, Clone, Copy)]
struct SampleTally {
    void: usize,
    out_of_tile: usize,
    failed: usize,
}

impl SampleTally {
    fn merge(self, other: Self) -> Self {
        Self {
            void: self.void + other.void,
            out_of_tile: self.out_of_tile + other.out_of_tile,
            failed: self.failed + other.failed,
        }
    }

    fn total(&self) -> usize {
        self.void + self.out_of_tile + self.failed
    }
}

/// A projected grid together with the terrain sampled onto it.
///
/// Built once per location and persisted, then reused for every render
/// at that location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeightMap<P = MapProjection> {
    grid: ProjectedGrid<P>,
    elevations: ElevationGrid,
}

impl<P> HeightMap<P> {
    /// Pair a grid with elevations of matching size.
    pub fn from_elevations(grid: ProjectedGrid<P>, elevations: ElevationGrid) -> Result<Self> {
        if grid.size() != elevations.size() {
            return Err(GridError::SizeMismatch {
                expected: grid.size() * grid.size(),
                actual: elevations.heights().len(),
            });
        }
        Ok(Self { grid, elevations })
    }

    pub fn grid(&self) -> &ProjectedGrid<P> {
        &self.grid
    }

    pub fn elevations(&self) -> &ElevationGrid {
        &self.elevations
    }
}

impl<P: Projection + Sync> HeightMap<P> {
    /// Sample `source` at the centre of every cell of `grid`.
    ///
    /// Cells the source cannot answer (void data, or a point outside the
    /// source's coverage) become unknown. They are counted and logged but
    /// never abort the build.
    pub fn sample<S: ElevationSource + ?Sized>(grid: ProjectedGrid<P>, source: &S) -> Self {
        let start = Instant::now();
        let size = grid.size();

        let rows: Vec<(Vec<Option<f64>>, SampleTally)> = (0..size)
            .into_par_iter()
            .map(|row| {
                let mut tally = SampleTally::default();
                let heights = (0..size)
                    .map(|col| {
                        let (lat, lng) = grid.cell_center_lat_lng(col, row);
                        match source.altitude(lat, lng) {
                            Ok(Some(h)) => Some(h),
                            Ok(None) => {
                                tally.void += 1;
                                None
                            }
                            Err(DemError::OutOfTileBounds { .. }) => {
                                tally.out_of_tile += 1;
                                None
                            }
                            Err(e) => {
                                tracing::debug!(col, row, error = %e, "Elevation sample failed");
                                tally.failed += 1;
                                None
                            }
                        }
                    })
                    .collect();
                (heights, tally)
            })
            .collect();

        let mut heights = Vec::with_capacity(size * size);
        let mut tally = SampleTally::default();
        for (row_heights, row_tally) in rows {
            heights.extend(row_heights);
            tally = tally.merge(row_tally);
        }

        let elevations = ElevationGrid::from_rows(size, heights);

        let elapsed = start.elapsed();
        metrics::histogram!(metric_defs::HEIGHTMAP_BUILD_TIME.name).record(elapsed.as_secs_f64() * 1000.0);
        metrics::counter!(metric_defs::HEIGHTMAP_UNKNOWN_CELLS.name).increment(tally.total() as u64);

        if tally.total() > 0 {
            tracing::warn!(
                void = tally.void,
                out_of_tile = tally.out_of_tile,
                failed = tally.failed,
                "{} of {} cells have no altitude and will render as unlit",
                tally.total(),
                size * size
            );
        }
        tracing::info!(
            size,
            min = ?elevations.min_height(),
            max = ?elevations.max_height(),
            "Sampled height map in {:?}",
            elapsed
        );

        Self { grid, elevations }
    }
}

impl<P: Serialize> HeightMap<P> {
    /// Write the height map as JSON.
    pub fn save<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer(writer, self)?;
        Ok(())
    }

    /// Write the height map to a file.
    pub fn save_to_file<Q: AsRef<Path>>(&self, path: Q) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.save(&mut writer)?;
        writer.flush()?;
        Ok(())
    }
}

impl<P: DeserializeOwned> HeightMap<P> {
    /// Restore a height map written by [`HeightMap::save`].
    pub fn load<R: Read>(reader: R) -> Result<Self> {
        let map: Self = serde_json::from_reader(reader)?;
        if map.grid.size() != map.elevations.size() {
            return Err(GridError::SizeMismatch {
                expected: map.grid.size() * map.grid.size(),
                actual: map.elevations.heights().len(),
            });
        }
        Ok(map)
    }

    /// Restore a height map from a file.
    pub fn load_from_file<Q: AsRef<Path>>(path: Q) -> Result<Self> {
        Self::load(BufReader::new(File::open(path)?))
    }
}
