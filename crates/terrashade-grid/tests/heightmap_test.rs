//! Height maps sampled from a real tile and persisted through the filesystem.

use terrashade_dem::{ElevationTile, VOID_VALUE};
use terrashade_grid::{HeightMap, MapProjection, ProjectedGrid};

const SIZE: usize = 1201;

/// SRTM3 tile for N47E011 whose altitude rises one meter per sample
/// northwards, with the whole south-western quarter void.
fn ramp_tile() -> ElevationTile {
    let mut samples = Vec::with_capacity(SIZE * SIZE);
    for stored_row in 0..SIZE {
        let y = SIZE - stored_row - 1;
        for x in 0..SIZE {
            if x < SIZE / 2 && y < SIZE / 2 {
                samples.push(VOID_VALUE);
            } else {
                samples.push(1000 + y as i16);
            }
        }
    }
    ElevationTile::from_samples(samples, 47, 11).unwrap()
}

#[test]
fn test_sample_tile_into_grid() {
    let tile = ramp_tile();
    // 3 km window in the north-east quarter, entirely inside known data.
    let grid = ProjectedGrid::new(47.75, 11.75, 30.0, 100, MapProjection::utm_for(47.75, 11.75))
        .unwrap();
    let map = HeightMap::sample(grid, &tile);
    let elevations = map.elevations();

    assert_eq!(elevations.unknown_count(), 0);
    let lo = elevations.min_height().unwrap();
    let hi = elevations.max_height().unwrap();
    // 0.75 degrees north is sample row 900.
    assert!(lo > 1850.0 && hi < 1950.0, "extrema {lo}..{hi}");
    assert!(elevations.height(50, 99).unwrap() > elevations.height(50, 0).unwrap());
}

#[test]
fn test_grid_leaving_tile_has_unknown_cells() {
    let tile = ramp_tile();
    // Centred on the tile's eastern edge: the eastern half falls outside.
    let grid = ProjectedGrid::new(47.75, 12.0, 30.0, 50, MapProjection::utm_for(47.75, 12.0))
        .unwrap();
    let map = HeightMap::sample(grid, &tile);

    let unknown = map.elevations().unknown_count();
    assert!(unknown > 0 && unknown < 50 * 50, "unknown {unknown}");
    assert!(map.elevations().height(0, 25).is_some());
    assert!(map.elevations().height(49, 25).is_none());
}

#[test]
fn test_void_cells_are_unknown() {
    let tile = ramp_tile();
    let grid = ProjectedGrid::new(47.25, 11.25, 30.0, 20, MapProjection::utm_for(47.25, 11.25))
        .unwrap();
    let map = HeightMap::sample(grid, &tile);

    assert_eq!(map.elevations().unknown_count(), 400);
    assert_eq!(map.elevations().max_height(), None);
}

#[test]
fn test_persisted_heightmap_restores_identically() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("heightmap.json");

    let tile = ramp_tile();
    let grid = ProjectedGrid::new(47.6, 11.9, 45.0, 64, MapProjection::utm_for(47.6, 11.9))
        .unwrap();
    let map = HeightMap::sample(grid, &tile);
    map.save_to_file(&path).unwrap();

    let restored: HeightMap = HeightMap::load_from_file(&path).unwrap();
    assert_eq!(restored, map);
    assert_eq!(restored.grid().bounds(), map.grid().bounds());
    assert_eq!(restored.elevations().min_height(), map.elevations().min_height());
}
