//! Height map builds, single renders and time-lapses.

use crate::config::{GridConfig, OutputConfig};
use crate::solar::{solar_position, SolarPosition};
use crate::{Result, RunnerError};
use chrono::{DateTime, Duration, Utc};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use terrashade_dem::{ElevationTile, TileDirectory};
use terrashade_grid::{HeightMap, ProjectedGrid};
use terrashade_metrics::metric_defs;
use terrashade_shadow::{
    export, projection_north_deviation, IlluminationGrid, ShadowCaster, ShadowMap, ShadowParams,
    SunVector,
};

/// Load the tile covering `(lat, lng)` from a tile file or a directory of tiles.
pub fn load_tile(tiles: &Path, lat: f64, lng: f64) -> Result<ElevationTile> {
    let mut directory = TileDirectory::new();
    if tiles.is_dir() {
        let count = directory.add_directory(tiles)?;
        tracing::debug!(count, dir = %tiles.display(), "Indexed tile directory");
    } else {
        directory.add_file(tiles)?;
    }
    Ok(directory.load_tile(lat, lng)?)
}

/// Build the projected grid described by `config`.
pub fn grid_from_config(config: &GridConfig) -> Result<ProjectedGrid> {
    let (lat, lng) = config.centre()?;
    Ok(ProjectedGrid::new(
        lat,
        lng,
        config.resolution,
        config.size,
        config.projection.resolve(lat, lng),
    )?)
}

/// Sample the tile under the grid centre into a height map.
pub fn build_heightmap(config: &GridConfig, tiles: &Path) -> Result<HeightMap> {
    let grid = grid_from_config(config)?;
    let tile = load_tile(tiles, grid.lat(), grid.lng())?;

    let geo = grid.geo_bounds();
    let corners = [
        (geo.south, geo.west),
        (geo.south, geo.east),
        (geo.north, geo.west),
        (geo.north, geo.east),
    ];
    if !corners.iter().all(|&(lat, lng)| tile.contains(lat, lng)) {
        tracing::warn!(
            tile_lat = tile.lat(),
            tile_lon = tile.lon(),
            "Grid extends past the tile; cells outside it will be unknown"
        );
    }

    Ok(HeightMap::sample(grid, &tile))
}

/// Sun parameters for `map` at `time`.
pub fn shadow_params(map: &HeightMap, time: DateTime<Utc>, view_alt: f64) -> (SolarPosition, ShadowParams) {
    let grid = map.grid();
    let position = solar_position(time, grid.lat(), grid.lng());
    let deviation = projection_north_deviation(grid.projection(), grid.lat(), grid.lng());
    let sun = SunVector::from_solar_position(position.azimuth, position.altitude, deviation);
    (position, ShadowParams::new(sun, view_alt))
}

/// One rendered timestamp.
#[derive(Debug, Clone)]
pub struct Frame {
    pub time: DateTime<Utc>,
    pub position: SolarPosition,
    pub params: ShadowParams,
    pub illumination: IlluminationGrid,
}

/// Render `map` at `time`.
///
/// A sun at or below the horizon is rendered anyway, with a warning.
pub fn render_frame(
    map: &HeightMap,
    time: DateTime<Utc>,
    view_alt: f64,
    caster: &dyn ShadowCaster,
) -> Result<Frame> {
    let (position, params) = shadow_params(map, time, view_alt);
    if !position.is_above_horizon() {
        tracing::warn!(
            %time,
            altitude_deg = position.altitude.to_degrees(),
            "Sun is below the horizon"
        );
    }
    tracing::debug!(
        %time,
        azimuth_deg = position.azimuth.to_degrees(),
        altitude_deg = position.altitude.to_degrees(),
        "Solar position"
    );

    let shadow_map = ShadowMap::for_heightmap(map, &params)?;
    let illumination = caster.render(&shadow_map);
    Ok(Frame {
        time,
        position,
        params,
        illumination,
    })
}

/// Paths of the artifacts written for one frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameOutputs {
    pub png: Option<PathBuf>,
    pub geojson: Option<PathBuf>,
    pub params: Option<PathBuf>,
}

impl FrameOutputs {
    /// Outputs named `<stem>.png`, `<stem>.geojson` and `<stem>.params.json`
    /// in `dir`, as selected by `config`.
    pub fn in_dir(dir: &Path, stem: &str, config: &OutputConfig) -> Self {
        Self {
            png: config.png.then(|| dir.join(format!("{stem}.png"))),
            geojson: config.geojson.then(|| dir.join(format!("{stem}.geojson"))),
            params: config.params.then(|| dir.join(format!("{stem}.params.json"))),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.png.is_none() && self.geojson.is_none() && self.params.is_none()
    }
}

/// Write the selected artifacts of `frame`.
pub fn write_frame(map: &HeightMap, frame: &Frame, outputs: &FrameOutputs) -> Result<()> {
    if let Some(path) = &outputs.png {
        export::save_png(&frame.illumination, path)?;
    }
    if let Some(path) = &outputs.geojson {
        export::save_geojson(map.grid(), &frame.illumination, path)?;
    }
    if let Some(path) = &outputs.params {
        frame.params.save_to_file(path)?;
    }
    metrics::counter!(metric_defs::FRAMES_RENDERED.name).increment(1);
    Ok(())
}

/// File stem for a frame rendered at `time`.
pub fn frame_stem(time: DateTime<Utc>) -> String {
    format!("frame_{}", time.format("%Y%m%dT%H%M"))
}

/// Time range of a time-lapse, both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimelapseSpec {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub step_minutes: u32,
}

impl TimelapseSpec {
    /// Every timestamp in the range.
    pub fn times(&self) -> Result<Vec<DateTime<Utc>>> {
        if self.step_minutes == 0 {
            return Err(RunnerError::Config("time-lapse step must be at least one minute".into()));
        }
        if self.end < self.start {
            return Err(RunnerError::Config(format!(
                "time-lapse ends ({}) before it starts ({})",
                self.end, self.start
            )));
        }
        let step = Duration::minutes(self.step_minutes as i64);
        let mut times = Vec::new();
        let mut t = self.start;
        while t <= self.end {
            times.push(t);
            t += step;
        }
        Ok(times)
    }
}

/// Outcome of a time-lapse run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimelapseSummary {
    /// Stems of the frames written, in time order.
    pub rendered: Vec<String>,
    /// Frames skipped because the sun was down.
    pub skipped: usize,
    /// Whether the run stopped early on request.
    pub cancelled: bool,
}

/// Render every daylight frame of the time range into `out_dir`.
///
/// `cancel` is checked between frames; a frame in progress always completes.
pub fn timelapse(
    map: &HeightMap,
    spec: &TimelapseSpec,
    view_alt: f64,
    caster: &dyn ShadowCaster,
    out_dir: &Path,
    output: &OutputConfig,
    cancel: &AtomicBool,
) -> Result<TimelapseSummary> {
    let times = spec.times()?;
    std::fs::create_dir_all(out_dir)?;
    tracing::info!(
        frames = times.len(),
        start = %spec.start,
        end = %spec.end,
        out_dir = %out_dir.display(),
        "Starting time-lapse"
    );

    let mut summary = TimelapseSummary::default();
    for time in times {
        if cancel.load(Ordering::SeqCst) {
            tracing::info!(%time, "Time-lapse cancelled");
            summary.cancelled = true;
            break;
        }

        let (position, _) = shadow_params(map, time, view_alt);
        if !position.is_above_horizon() {
            tracing::info!(%time, "Sun below the horizon, skipping frame");
            metrics::counter!(metric_defs::FRAMES_SKIPPED.name, "reason" => "below_horizon").increment(1);
            summary.skipped += 1;
            continue;
        }

        let frame = render_frame(map, time, view_alt, caster)?;
        let stem = frame_stem(time);
        write_frame(map, &frame, &FrameOutputs::in_dir(out_dir, &stem, output))?;
        summary.rendered.push(stem);
    }

    tracing::info!(
        rendered = summary.rendered.len(),
        skipped = summary.skipped,
        cancelled = summary.cancelled,
        "Time-lapse finished"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_times_inclusive() {
        let start = Utc.with_ymd_and_hms(2024, 6, 21, 10, 0, 0).unwrap();
        let spec = TimelapseSpec {
            start,
            end: start + Duration::minutes(60),
            step_minutes: 15,
        };
        let times = spec.times().unwrap();
        assert_eq!(times.len(), 5);
        assert_eq!(times[4], spec.end);
    }

    #[test]
    fn test_times_rejects_bad_ranges() {
        let start = Utc.with_ymd_and_hms(2024, 6, 21, 10, 0, 0).unwrap();
        let backwards = TimelapseSpec {
            start,
            end: start - Duration::minutes(1),
            step_minutes: 15,
        };
        assert!(backwards.times().is_err());
        let zero = TimelapseSpec {
            start,
            end: start,
            step_minutes: 0,
        };
        assert!(zero.times().is_err());
    }

    #[test]
    fn test_frame_stem() {
        let time = Utc.with_ymd_and_hms(2024, 6, 21, 9, 5, 0).unwrap();
        assert_eq!(frame_stem(time), "frame_20240621T0905");
    }

    #[test]
    fn test_outputs_in_dir() {
        let config = OutputConfig {
            png: true,
            geojson: false,
            params: true,
        };
        let outputs = FrameOutputs::in_dir(Path::new("out"), "frame_x", &config);
        assert_eq!(outputs.png, Some(PathBuf::from("out/frame_x.png")));
        assert_eq!(outputs.geojson, None);
        assert_eq!(outputs.params, Some(PathBuf::from("out/frame_x.params.json")));

        let none = OutputConfig {
            png: false,
            geojson: false,
            params: false,
        };
        assert!(FrameOutputs::in_dir(Path::new("out"), "f", &none).is_empty());
    }
}
