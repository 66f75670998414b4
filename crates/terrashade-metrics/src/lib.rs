//! Metric declarations for terrashade.
//!
//! Every metric the pipeline records is declared once in [`metric_defs`] and
//! recorded through the re-exported `metrics` macros by name, so the crates
//! never spell a metric name themselves.
//!
//! ```rust
//! use terrashade_metrics::{metric_defs, MetricKind};
//!
//! terrashade_metrics::describe_metrics();
//! metrics::histogram!(metric_defs::RENDER_TIME.name, "caster" => "serial").record(12.5);
//! assert_eq!(metric_defs::RENDER_TIME.kind, MetricKind::Histogram);
//! ```

pub use metrics;

use metrics::{describe_counter, describe_gauge, describe_histogram, Unit};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Counter,
    Gauge,
    Histogram,
}

/// Name, kind, unit and help text of one metric.
#[derive(Debug, Clone, Copy)]
pub struct Metric {
    pub name: &'static str,
    pub kind: MetricKind,
    pub unit: Unit,
    pub description: &'static str,
}

impl Metric {
    pub const fn counter(name: &'static str, unit: Unit, description: &'static str) -> Self {
        Self {
            name,
            kind: MetricKind::Counter,
            unit,
            description,
        }
    }

    pub const fn gauge(name: &'static str, unit: Unit, description: &'static str) -> Self {
        Self {
            name,
            kind: MetricKind::Gauge,
            unit,
            description,
        }
    }

    pub const fn histogram(name: &'static str, unit: Unit, description: &'static str) -> Self {
        Self {
            name,
            kind: MetricKind::Histogram,
            unit,
            description,
        }
    }

    /// Register the unit and help text with the installed recorder.
    pub fn describe(&self) {
        match self.kind {
            MetricKind::Counter => describe_counter!(self.name, self.unit, self.description),
            MetricKind::Gauge => describe_gauge!(self.name, self.unit, self.description),
            MetricKind::Histogram => describe_histogram!(self.name, self.unit, self.description),
        }
    }
}

/// All metric definitions for the pipeline.
pub mod metric_defs {
    use super::{Metric, Unit};

    /// Tiles decoded from disk, labelled by `container`.
    pub const TILES_LOADED: Metric = Metric::counter(
        "terrashade.dem.tiles_loaded",
        Unit::Count,
        "Elevation tiles decoded from disk",
    );

    pub const TILE_DECODE_TIME: Metric = Metric::histogram(
        "terrashade.dem.decode_time_ms",
        Unit::Milliseconds,
        "Time to read and decode one elevation tile",
    );

    pub const HEIGHTMAP_BUILD_TIME: Metric = Metric::histogram(
        "terrashade.grid.heightmap_build_time_ms",
        Unit::Milliseconds,
        "Time to sample a height map from an elevation source",
    );

    /// Height map cells whose altitude could not be sampled.
    pub const HEIGHTMAP_UNKNOWN_CELLS: Metric = Metric::counter(
        "terrashade.grid.unknown_cells",
        Unit::Count,
        "Height map cells left without an altitude",
    );

    /// Time to render one illumination grid, labelled by `caster`.
    pub const RENDER_TIME: Metric = Metric::histogram(
        "terrashade.shadow.render_time_ms",
        Unit::Milliseconds,
        "Time to render one illumination grid",
    );

    /// Lit cells in the most recent render.
    pub const RENDER_LIT_CELLS: Metric = Metric::gauge(
        "terrashade.shadow.lit_cells",
        Unit::Count,
        "Lit cells in the most recent render",
    );

    pub const FRAMES_RENDERED: Metric = Metric::counter(
        "terrashade.runner.frames_rendered",
        Unit::Count,
        "Frames rendered and written",
    );

    /// Frames the runner did not render, labelled by `reason`.
    pub const FRAMES_SKIPPED: Metric = Metric::counter(
        "terrashade.runner.frames_skipped",
        Unit::Count,
        "Frames skipped without rendering",
    );

/// Every metric, in declaration order.
    pub const ALL: &[Metric] = &[
        TILES_LOADED,
        TILE_DECODE_TIME,
        HEIGHTMAP_BUILD_TIME,
        HEIGHTMAP_UNKNOWN_CELLS,
        RENDER_TIME,
        RENDER_LIT_CELLS,
        FRAMES_RENDERED,
        FRAMES_SKIPPED,
    ];
}

/// Describes all metrics used by the pipeline.
///
/// Call once at startup, after installing a recorder.
pub fn describe_metrics() {
    for metric in metric_defs::ALL {
        metric.describe();
    }
}

/// Install a Prometheus recorder serving scrapes on `addr`.
#[cfg(feature = "prometheus")]
pub fn install_prometheus(
    addr: std::net::SocketAddr,
) -> Result<(), metrics_exporter_prometheus::BuildError> {
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
}
