//! Integration tests for terrashade-dem against tiles written to disk.
//!
//! Tiles are synthesized in a temporary directory in each supported
//! container so no external data is required.

use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use terrashade_dem::{DemError, ElevationSource, ElevationTile, TileDirectory, VOID_VALUE};

const SIZE: usize = 1201;

/// Big-endian sample bytes for an SRTM3 tile with a gentle west-east ramp
/// and a void patch near the north-west corner.
fn synthetic_tile_bytes() -> Vec<u8> {
    let mut bytes = Vec::with_capacity(2 * SIZE * SIZE);
    for stored_row in 0..SIZE {
        for col in 0..SIZE {
            let value = if stored_row < 3 && col < 3 {
                VOID_VALUE
            } else {
                (col / 4) as i16 + 500
            };
            bytes.extend_from_slice(&value.to_be_bytes());
        }
    }
    bytes
}

fn write_raw(path: &Path, bytes: &[u8]) {
    File::create(path).unwrap().write_all(bytes).unwrap();
}

fn write_zip(path: &Path, bytes: &[u8]) {
    let mut writer = zip::ZipWriter::new(File::create(path).unwrap());
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);
    writer.start_file("N47E011.hgt", options).unwrap();
    writer.write_all(bytes).unwrap();
    writer.finish().unwrap();
}

fn write_gzip(path: &Path, bytes: &[u8]) {
    let mut encoder = GzEncoder::new(File::create(path).unwrap(), Compression::fast());
    encoder.write_all(bytes).unwrap();
    encoder.finish().unwrap();
}

#[test]
fn test_all_containers_decode_identically() {
    let dir = tempfile::tempdir().unwrap();
    let bytes = synthetic_tile_bytes();

    let raw_path = dir.path().join("raw.hgt");
    let zip_path = dir.path().join("zipped.hgt.zip");
    let gz_path = dir.path().join("gzipped.hgt.gz");
    write_raw(&raw_path, &bytes);
    write_zip(&zip_path, &bytes);
    write_gzip(&gz_path, &bytes);

    let raw = ElevationTile::from_file(&raw_path, 47, 11).unwrap();
    let zipped = ElevationTile::from_file(&zip_path, 47, 11).unwrap();
    let gzipped = ElevationTile::from_file(&gz_path, 47, 11).unwrap();

    for (lat, lon) in [(47.25, 11.25), (47.9, 11.01), (47.0, 11.0), (47.5, 11.999)] {
        let expected = raw.altitude(lat, lon).unwrap();
        assert_eq!(zipped.altitude(lat, lon).unwrap(), expected);
        assert_eq!(gzipped.altitude(lat, lon).unwrap(), expected);
    }
}

#[test]
fn test_directory_loads_covering_tile() {
    let dir = tempfile::tempdir().unwrap();
    let bytes = synthetic_tile_bytes();
    write_zip(&dir.path().join("N47E011.hgt.zip"), &bytes);
    write_raw(&dir.path().join("notes.txt"), b"not a tile");

    let mut directory = TileDirectory::new();
    let count = directory.add_directory(dir.path()).unwrap();
    assert_eq!(count, 1);
    assert!(directory.has_tile(47.3, 11.7));
    assert!(!directory.has_tile(46.3, 11.7));

    let tile = directory.load_tile(47.3, 11.7).unwrap();
    assert_eq!((tile.lat(), tile.lon()), (47, 11));
    assert!(tile.altitude(47.3, 11.7).unwrap().is_some());

    let err = directory.load_tile(46.3, 11.7).unwrap_err();
    assert!(matches!(err, DemError::NoSuchTile { lat: 46, lon: 11 }));
}

#[test]
fn test_void_patch_in_north_west_corner() {
    let tile = ElevationTile::from_bytes(&synthetic_tile_bytes(), 47, 11).unwrap();

    // Top-left stored samples are rows 1200..=1198 counted from the south.
    assert_eq!(tile.pixel(0, 1200), None);
    assert_eq!(tile.pixel(2, 1198), None);
    assert_eq!(tile.pixel(3, 1198), Some(500));

    // Deep inside the void patch every corner is void.
    let near_corner = 47.0 + 1199.5 / 1200.0;
    let west = 11.0 + 0.5 / 1200.0;
    assert_eq!(tile.altitude(near_corner, west).unwrap(), None);
}

#[test]
fn test_tile_as_elevation_source() {
    fn query<S: ElevationSource>(source: &S) -> Option<f64> {
        source.altitude(47.5, 11.5).unwrap()
    }

    let tile = ElevationTile::from_bytes(&synthetic_tile_bytes(), 47, 11).unwrap();
    assert_eq!(query(&tile), tile.altitude(47.5, 11.5).unwrap());
}

#[test]
fn test_truncated_file_is_invalid() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("short.hgt");
    let bytes = synthetic_tile_bytes();
    write_raw(&path, &bytes[..bytes.len() - 2]);

    let err = ElevationTile::from_file(&path, 47, 11).unwrap_err();
    assert!(matches!(err, DemError::InvalidTileFormat { .. }));
}
