//! `terrashade`: build height maps and render terrain shadows.
//!
//! ```text
//! terrashade heightmap --lat 47.42 --lng 10.98 --tiles srtm/ -o zugspitze.json
//! terrashade render zugspitze.json --time "2024-06-21 07:30" -o morning.png
//! terrashade timelapse zugspitze.json --start "2024-06-21 04:00" --end "2024-06-21 20:00" --out-dir frames/
//! ```

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use terrashade_grid::HeightMap;
use terrashade_runner::config::ProjectionKind;
use terrashade_runner::pipeline::{self, FrameOutputs, TimelapseSpec};
use terrashade_runner::solar::parse_time;
use terrashade_runner::{Result, RunnerConfig, RunnerError};
use terrashade_shadow::CasterKind;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "terrashade", version, about = "Terrain shadow maps from SRTM elevation data")]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// YAML configuration file. Flags override its values.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Serve Prometheus metrics on this address.
    #[cfg(feature = "prometheus")]
    #[arg(long, global = true)]
    metrics_addr: Option<std::net::SocketAddr>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sample terrain onto a projected grid and save it.
    Heightmap(HeightmapArgs),
    /// Render shadows for one moment.
    Render(RenderArgs),
    /// Render shadows over a time range.
    Timelapse(TimelapseArgs),
}

#[derive(Args, Debug)]
struct HeightmapArgs {
    /// Latitude of the grid centre.
    #[arg(long, allow_negative_numbers = true)]
    lat: Option<f64>,
    /// Longitude of the grid centre.
    #[arg(long, allow_negative_numbers = true)]
    lng: Option<f64>,
    /// Meters per cell.
    #[arg(long)]
    resolution: Option<f64>,
    /// Cells per side.
    #[arg(long)]
    size: Option<usize>,
    #[arg(long, value_enum)]
    projection: Option<ProjectionKind>,
    /// Tile file or directory of tiles.
    #[arg(long)]
    tiles: Option<PathBuf>,
    /// Where to write the height map.
    #[arg(short, long)]
    output: PathBuf,
}

#[derive(Args, Debug)]
struct RenderOptions {
    /// Observer eye height in meters.
    #[arg(long)]
    view_alt: Option<f64>,
    /// Rendering strategy: serial or parallel.
    #[arg(long)]
    caster: Option<CasterKind>,
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Height map written by `terrashade heightmap`.
    heightmap: PathBuf,
    /// UTC time, `YYYY-MM-DD HH:MM` or RFC 3339.
    #[arg(long)]
    time: String,
    /// PNG to write.
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// GeoJSON polygons of lit cells to write.
    #[arg(long)]
    geojson: Option<PathBuf>,
    /// Sun parameters to write.
    #[arg(long)]
    params: Option<PathBuf>,
    #[command(flatten)]
    options: RenderOptions,
}

#[derive(Args, Debug)]
struct TimelapseArgs {
    /// Height map written by `terrashade heightmap`.
    heightmap: PathBuf,
    /// First frame, UTC.
    #[arg(long)]
    start: String,
    /// Last frame, UTC.
    #[arg(long)]
    end: String,
    /// Minutes between frames.
    #[arg(long)]
    step_minutes: Option<u32>,
    /// Directory for the frames.
    #[arg(long)]
    out_dir: PathBuf,
    /// Also write GeoJSON polygons per frame.
    #[arg(long)]
    geojson: bool,
    #[command(flatten)]
    options: RenderOptions,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

fn apply_render_options(config: &mut RunnerConfig, options: &RenderOptions) -> Result<()> {
    if let Some(view_alt) = options.view_alt {
        config.view_alt = view_alt;
    }
    if let Some(caster) = options.caster {
        config.caster = caster;
    }
    config.validate()
}

fn load_heightmap(path: &Path) -> Result<HeightMap> {
    let map = HeightMap::load_from_file(path)?;
    tracing::info!(
        path = %path.display(),
        size = map.grid().size(),
        resolution = map.grid().resolution(),
        "Loaded height map"
    );
    Ok(map)
}

fn run_heightmap(mut config: RunnerConfig, args: HeightmapArgs) -> Result<()> {
    let grid = &mut config.grid;
    grid.lat = args.lat.or(grid.lat);
    grid.lng = args.lng.or(grid.lng);
    if let Some(resolution) = args.resolution {
        grid.resolution = resolution;
    }
    if let Some(size) = args.size {
        grid.size = size;
    }
    if let Some(projection) = args.projection {
        grid.projection = projection;
    }
    config.validate()?;

    let tiles = args
        .tiles
        .or(config.tiles)
        .ok_or_else(|| RunnerError::Config("no tile source; pass --tiles or set `tiles`".into()))?;

    let map = pipeline::build_heightmap(&config.grid, &tiles)?;
    map.save_to_file(&args.output)?;
    tracing::info!(path = %args.output.display(), "Wrote height map");
    Ok(())
}

fn run_render(mut config: RunnerConfig, args: RenderArgs) -> Result<()> {
    apply_render_options(&mut config, &args.options)?;
    let time = parse_time(&args.time)?;
    let outputs = FrameOutputs {
        png: args.output,
        geojson: args.geojson,
        params: args.params,
    };
    if outputs.is_empty() {
        return Err(RunnerError::Config(
            "nothing to write; pass --output, --geojson or --params".into(),
        ));
    }

    let map = load_heightmap(&args.heightmap)?;
    let caster = config.caster.caster();
    let frame = pipeline::render_frame(&map, time, config.view_alt, caster.as_ref())?;
    pipeline::write_frame(&map, &frame, &outputs)?;
    Ok(())
}

fn run_timelapse(mut config: RunnerConfig, args: TimelapseArgs) -> Result<()> {
    apply_render_options(&mut config, &args.options)?;
    if args.geojson {
        config.output.geojson = true;
    }
    let spec = TimelapseSpec {
        start: parse_time(&args.start)?,
        end: parse_time(&args.end)?,
        step_minutes: args.step_minutes.unwrap_or(config.timelapse.step_minutes),
    };

    let cancel = Arc::new(AtomicBool::new(false));
    let flag = cancel.clone();
    ctrlc::set_handler(move || {
        tracing::warn!("Interrupt received, stopping after the current frame");
        flag.store(true, Ordering::SeqCst);
    })?;

    let map = load_heightmap(&args.heightmap)?;
    let caster = config.caster.caster();
    let summary = pipeline::timelapse(
        &map,
        &spec,
        config.view_alt,
        caster.as_ref(),
        &args.out_dir,
        &config.output,
        &cancel,
    )?;

    println!(
        "Rendered {} frames, skipped {} night frames{}",
        summary.rendered.len(),
        summary.skipped,
        if summary.cancelled { " (cancelled)" } else { "" }
    );
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    #[cfg(feature = "prometheus")]
    if let Some(addr) = cli.metrics_addr {
        terrashade_metrics::install_prometheus(addr)
            .map_err(|e| RunnerError::Config(format!("cannot serve metrics on {addr}: {e}")))?;
        tracing::info!(%addr, "Serving Prometheus metrics");
    }
    terrashade_metrics::describe_metrics();

    let config = RunnerConfig::load(cli.config.as_deref())?;
    match cli.command {
        Command::Heightmap(args) => run_heightmap(config, args),
        Command::Render(args) => run_render(config, args),
        Command::Timelapse(args) => run_timelapse(config, args),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
