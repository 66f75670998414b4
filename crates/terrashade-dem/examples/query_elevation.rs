//! Example: Query elevation from a directory of SRTM tiles.
//!
//! Usage: cargo run --example query_elevation -- <lat> <lon> [tile_dir]

use std::env;
use std::time::Instant;
use terrashade_dem::TileDirectory;

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 3 {
        eprintln!("Usage: {} <lat> <lon> [tile_dir]", args[0]);
        eprintln!("Example: {} 47.42 10.98 ./srtm", args[0]);
        std::process::exit(1);
    }

    let lat: f64 = args[1].parse().expect("Invalid latitude");
    let lon: f64 = args[2].parse().expect("Invalid longitude");
    let tile_dir = args.get(3).map(|s| s.as_str()).unwrap_or("srtm");

    let mut directory = TileDirectory::new();
    let count = directory.add_directory(tile_dir).expect("Failed to index tile directory");
    println!("Indexed {} tiles from {}", count, tile_dir);

    let start = Instant::now();
    let tile = match directory.load_tile(lat, lon) {
        Ok(tile) => tile,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    println!(
        "Loaded {}x{} tile in {:.3}s",
        tile.size(),
        tile.size(),
        start.elapsed().as_secs_f64()
    );

    match tile.altitude(lat, lon) {
        Ok(Some(altitude)) => println!("Altitude at ({}, {}): {:.2} meters", lat, lon, altitude),
        Ok(None) => println!("No elevation data at ({}, {})", lat, lon),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
