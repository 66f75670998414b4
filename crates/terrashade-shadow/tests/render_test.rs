//! End-to-end renders from a synthetic SRTM tile.

use terrashade_dem::ElevationTile;
use terrashade_grid::{HeightMap, MapProjection, ProjectedGrid};
use terrashade_shadow::{
    export, projection_north_deviation, CasterKind, ParallelCaster, SerialCaster, ShadowCaster,
    ShadowMap, ShadowParams, SunVector,
};

const SIZE: usize = 1201;

/// SRTM3 tile for N47E011: a plain at 600 m with a tall square massif
/// around 47.5N 11.5E.
fn massif_tile() -> ElevationTile {
    let mut samples = Vec::with_capacity(SIZE * SIZE);
    for stored_row in 0..SIZE {
        let y = SIZE - stored_row - 1;
        for x in 0..SIZE {
            let inside = (590..=610).contains(&x) && (590..=610).contains(&y);
            samples.push(if inside { 2600 } else { 600 });
        }
    }
    ElevationTile::from_samples(samples, 47, 11).unwrap()
}

fn heightmap() -> HeightMap {
    let grid = ProjectedGrid::new(47.5, 11.5, 30.0, 120, MapProjection::utm_for(47.5, 11.5)).unwrap();
    HeightMap::sample(grid, &massif_tile())
}

#[test]
fn test_low_western_sun_casts_shadow_east() {
    let map = heightmap();
    let dev = projection_north_deviation(map.grid().projection(), 47.5, 11.5);
    // Azimuth pi/2 is due west; 5 degrees above the horizon.
    let sun = SunVector::from_solar_position(std::f64::consts::FRAC_PI_2, 5f64.to_radians(), dev);
    let params = ShadowParams::new(sun, 1.5);
    let shadow_map = ShadowMap::for_heightmap(&map, &params).unwrap();
    let lit = ParallelCaster.render(&shadow_map);

    let (col, row) = map.grid().cell_at(47.5, 11.5).unwrap();
    // Just east of the massif is in shadow, the western slopes are lit.
    assert!(!lit.is_lit(col + 25, row));
    assert!(lit.is_lit(col - 25, row));
    // Far north of the massif the plain is lit.
    assert!(lit.is_lit(col + 25, row + 50));
    assert!(lit.lit_fraction() > 0.5 && lit.lit_fraction() < 1.0);
}

#[test]
fn test_casters_agree_on_real_terrain() {
    let map = heightmap();
    let sun = SunVector::from_solar_position(-0.8, 0.15, 0.0);
    let shadow_map = ShadowMap::for_heightmap(&map, &ShadowParams::new(sun, 1.5)).unwrap();
    assert_eq!(SerialCaster.render(&shadow_map), ParallelCaster.render(&shadow_map));
}

#[test]
fn test_outputs_written() {
    let dir = tempfile::tempdir().unwrap();
    let map = heightmap();
    let sun = SunVector::from_solar_position(0.3, 0.1, 0.0);
    let params = ShadowParams::new(sun, 1.5);
    let shadow_map = ShadowMap::for_heightmap(&map, &params).unwrap();
    let lit = CasterKind::Serial.caster().render(&shadow_map);

    let png = dir.path().join("frame.png");
    let geojson = dir.path().join("frame.geojson");
    let params_path = dir.path().join("frame.params.json");
    export::save_png(&lit, &png).unwrap();
    export::save_geojson(map.grid(), &lit, &geojson).unwrap();
    params.save_to_file(&params_path).unwrap();

    let image = image::open(&png).unwrap().into_luma8();
    assert_eq!(image.dimensions(), (120, 120));

    let value: serde_json::Value = serde_json::from_reader(std::fs::File::open(&geojson).unwrap()).unwrap();
    assert_eq!(value["features"].as_array().unwrap().len(), lit.lit_count());

    assert_eq!(ShadowParams::load_from_file(&params_path).unwrap(), params);
}
