//! Rendering strategies.
//!
//! Every strategy traces [`ShadowMap::is_lit`] for each cell and must
//! produce the same grid. [`SerialCaster`] is the reference.

use crate::illumination::IlluminationGrid;
use crate::shadow_map::ShadowMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Instant;
use terrashade_metrics::metric_defs;

/// Turns a shadow map into an illumination grid.
pub trait ShadowCaster: Send + Sync {
    /// Short name used in logs and metric labels.
    fn name(&self) -> &'static str;

    /// Trace every cell of `map`.
    fn trace(&self, map: &ShadowMap<'_>) -> IlluminationGrid;

    /// Trace every cell, recording timing and lit-cell metrics.
    fn render(&self, map: &ShadowMap<'_>) -> IlluminationGrid {
        let start = Instant::now();
        let grid = self.trace(map);
        let elapsed = start.elapsed();

        metrics::histogram!(metric_defs::RENDER_TIME.name, "caster" => self.name())
            .record(elapsed.as_secs_f64() * 1000.0);
        metrics::gauge!(metric_defs::RENDER_LIT_CELLS.name).set(grid.lit_count() as f64);

        tracing::info!(
            caster = self.name(),
            size = grid.size(),
            lit_fraction = grid.lit_fraction(),
            "Rendered in {:?}",
            elapsed
        );
        grid
    }
}

/// Single-threaded, one cell at a time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SerialCaster;

impl ShadowCaster for SerialCaster {
    fn name(&self) -> &'static str {
        "serial"
    }

    fn trace(&self, map: &ShadowMap<'_>) -> IlluminationGrid {
        let size = map.size();
        let rows = (0..size).map(|row| (0..size).map(|col| map.is_lit(col, row)).collect());
        IlluminationGrid::from_rows(size, rows)
    }
}

/// Rows traced in parallel on the rayon pool.
#[derive(Debug, Default, Clone, Copy)]
pub struct ParallelCaster;

impl ShadowCaster for ParallelCaster {
    fn name(&self) -> &'static str {
        "parallel"
    }

    fn trace(&self, map: &ShadowMap<'_>) -> IlluminationGrid {
        let size = map.size();
        let rows: Vec<Vec<bool>> = (0..size)
            .into_par_iter()
            .map(|row| (0..size).map(|col| map.is_lit(col, row)).collect())
            .collect();
        IlluminationGrid::from_rows(size, rows)
    }
}

/// Selects a caster from configuration.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CasterKind {
    Serial,
    #[default]
    Parallel,
}

impl CasterKind {
    pub fn caster(self) -> Box<dyn ShadowCaster> {
        match self {
            CasterKind::Serial => Box::new(SerialCaster),
            CasterKind::Parallel => Box::new(ParallelCaster),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CasterKind::Serial => "serial",
            CasterKind::Parallel => "parallel",
        }
    }
}

impl fmt::Display for CasterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CasterKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "serial" => Ok(CasterKind::Serial),
            "parallel" => Ok(CasterKind::Parallel),
            other => Err(format!("unknown caster '{other}', expected serial or parallel")),
        }
    }
}
