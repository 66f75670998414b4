//! Pipeline runs against a synthetic tile written to disk.

use chrono::{TimeZone, Utc};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use terrashade_grid::HeightMap;
use terrashade_runner::config::{GridConfig, OutputConfig, ProjectionKind};
use terrashade_runner::pipeline::{self, FrameOutputs, TimelapseSpec};
use terrashade_runner::RunnerError;
use terrashade_shadow::{CasterKind, SerialCaster, ShadowParams};

const SIZE: usize = 1201;

/// Raw SRTM3 tile N47E011: 700 m plain with a 1500 m block around 47.5N 11.5E.
fn write_tile(dir: &Path) -> std::path::PathBuf {
    let mut bytes = Vec::with_capacity(2 * SIZE * SIZE);
    for stored_row in 0..SIZE {
        let y = SIZE - stored_row - 1;
        for x in 0..SIZE {
            let block = (595..=605).contains(&x) && (595..=605).contains(&y);
            let value: i16 = if block { 2200 } else { 700 };
            bytes.extend_from_slice(&value.to_be_bytes());
        }
    }
    let path = dir.join("N47E011.hgt");
    File::create(&path).unwrap().write_all(&bytes).unwrap();
    path
}

fn grid_config(size: usize) -> GridConfig {
    GridConfig {
        lat: Some(47.5),
        lng: Some(11.5),
        resolution: 30.0,
        size,
        projection: ProjectionKind::Utm,
    }
}

#[test]
fn test_build_heightmap_from_file_and_directory() {
    let dir = tempfile::tempdir().unwrap();
    let tile = write_tile(dir.path());

    let from_file = pipeline::build_heightmap(&grid_config(60), &tile).unwrap();
    let from_dir = pipeline::build_heightmap(&grid_config(60), dir.path()).unwrap();
    assert_eq!(from_file, from_dir);

    let elevations = from_file.elevations();
    assert_eq!(elevations.unknown_count(), 0);
    assert_eq!(elevations.min_height(), Some(700.0));
    assert_eq!(elevations.max_height(), Some(2200.0));
}

#[test]
fn test_missing_tile() {
    let dir = tempfile::tempdir().unwrap();
    write_tile(dir.path());
    let mut config = grid_config(10);
    config.lat = Some(46.5);
    let err = pipeline::build_heightmap(&config, dir.path()).unwrap_err();
    assert!(matches!(err, RunnerError::Dem(terrashade_dem::DemError::NoSuchTile { lat: 46, lon: 11 })));
}

#[test]
fn test_render_and_write_frame() {
    let dir = tempfile::tempdir().unwrap();
    let tile = write_tile(dir.path());
    let map = pipeline::build_heightmap(&grid_config(60), &tile).unwrap();

    let time = Utc.with_ymd_and_hms(2024, 6, 21, 5, 0, 0).unwrap();
    let frame = pipeline::render_frame(&map, time, 1.5, &SerialCaster).unwrap();
    assert!(frame.position.is_above_horizon());
    assert_eq!(frame.illumination.size(), 60);
    // A low morning sun leaves the block's western side in shadow.
    assert!(frame.illumination.lit_fraction() < 1.0);

    let outputs = FrameOutputs::in_dir(
        dir.path(),
        "morning",
        &OutputConfig {
            png: true,
            geojson: true,
            params: true,
        },
    );
    pipeline::write_frame(&map, &frame, &outputs).unwrap();
    assert!(dir.path().join("morning.png").exists());
    assert!(dir.path().join("morning.geojson").exists());

    let params = ShadowParams::load_from_file(dir.path().join("morning.params.json")).unwrap();
    assert_eq!(params, frame.params);
}

#[test]
fn test_timelapse_skips_night_frames() {
    let dir = tempfile::tempdir().unwrap();
    let tile = write_tile(dir.path());
    let map_path = dir.path().join("heightmap.json");
    pipeline::build_heightmap(&grid_config(40), &tile)
        .unwrap()
        .save_to_file(&map_path)
        .unwrap();
    let map: HeightMap = HeightMap::load_from_file(&map_path).unwrap();

    // The sun rises between 03:00 and 04:00 UTC.
    let spec = TimelapseSpec {
        start: Utc.with_ymd_and_hms(2024, 6, 21, 2, 0, 0).unwrap(),
        end: Utc.with_ymd_and_hms(2024, 6, 21, 5, 0, 0).unwrap(),
        step_minutes: 60,
    };
    let out_dir = dir.path().join("frames");
    let caster = CasterKind::Parallel.caster();
    let summary = pipeline::timelapse(
        &map,
        &spec,
        1.5,
        caster.as_ref(),
        &out_dir,
        &OutputConfig::default(),
        &AtomicBool::new(false),
    )
    .unwrap();

    assert_eq!(summary.skipped, 2);
    assert_eq!(summary.rendered, vec!["frame_20240621T0400", "frame_20240621T0500"]);
    assert!(!summary.cancelled);
    assert!(out_dir.join("frame_20240621T0400.png").exists());
    assert!(out_dir.join("frame_20240621T0500.params.json").exists());
    assert!(!out_dir.join("frame_20240621T0500.geojson").exists());
}

#[test]
fn test_cancelled_timelapse_renders_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let tile = write_tile(dir.path());
    let map = pipeline::build_heightmap(&grid_config(20), &tile).unwrap();

    let spec = TimelapseSpec {
        start: Utc.with_ymd_and_hms(2024, 6, 21, 8, 0, 0).unwrap(),
        end: Utc.with_ymd_and_hms(2024, 6, 21, 12, 0, 0).unwrap(),
        step_minutes: 30,
    };
    let summary = pipeline::timelapse(
        &map,
        &spec,
        1.5,
        &SerialCaster,
        &dir.path().join("frames"),
        &OutputConfig::default(),
        &AtomicBool::new(true),
    )
    .unwrap();

    assert!(summary.cancelled);
    assert!(summary.rendered.is_empty());
}
