//! Cumbre CLI - terrain intelligence from elevation models

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use cumbre_algorithms::pipeline::{analyze_batch, analyze_terrain, CancelToken, PipelineConfig};
use cumbre_algorithms::terrain::{Biome, LandformEntity};
use cumbre_core::io::{read_geotiff, write_geotiff};
use cumbre_core::provider::{
    decode_rgb_tile, decode_terrain_rgb, DirectoryTileSource, SyntheticTerrain, TerrainRgbProvider,
};
use cumbre_core::{BoundingBox, ElevationGrid, ElevationProvider};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "cumbre")]
#[command(author, version, about = "Find and classify hills, mountains and volcanoes in DEMs", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect and classify landforms
    Analyze(AnalyzeArgs),
    /// Generate a synthetic DEM and write it as GeoTIFF
    Synth {
        /// Output GeoTIFF file
        output: PathBuf,
        /// TOML file with generator parameters
        #[arg(short, long)]
        params: Option<PathBuf>,
        /// Rows and columns of the grid
        #[arg(long)]
        size: Option<usize>,
        /// Seed for reproducible noise
        #[arg(short, long)]
        seed: Option<u64>,
    },
    /// Decode a terrain-RGB tile (or a single pixel) to elevations
    Decode {
        /// Input PNG/WebP tile
        #[arg(required_unless_present = "rgb")]
        input: Option<PathBuf>,
        /// Output GeoTIFF file
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Cell size in meters written to the output
        #[arg(short, long, default_value = "30.0")]
        cell_size: f64,
        /// Decode one pixel given as R,G,B
        #[arg(long, conflicts_with = "input")]
        rgb: Option<String>,
    },
    /// Show information about a DEM file
    Info {
        /// Input GeoTIFF
        input: PathBuf,
        /// Cell size in meters, overriding the file's pixel scale
        #[arg(short, long)]
        cell_size: Option<f64>,
    },
    /// Print the default pipeline configuration as TOML
    Config,
}

#[derive(Args)]
struct AnalyzeArgs {
    /// Pre-decoded DEM (GeoTIFF); covers its own extent, so no --bbox
    #[arg(long, group = "source", conflicts_with = "bbox")]
    geotiff: Option<PathBuf>,
    /// Directory of terrain-RGB tiles laid out as {z}/{x}/{y}.png
    #[arg(long, group = "source", requires = "bbox")]
    tiles: Option<PathBuf>,
    /// Generate synthetic terrain instead of reading data
    #[arg(long, group = "source")]
    synthetic: bool,

    /// Bounding box as NORTH,SOUTH,EAST,WEST (repeat for several regions)
    #[arg(long, allow_hyphen_values = true)]
    bbox: Vec<String>,
    /// Tile zoom level
    #[arg(short, long, default_value = "12")]
    zoom: u8,
    /// Cell size in meters for GeoTIFF input, overriding the pixel scale
    #[arg(long)]
    cell_size: Option<f64>,
    /// Seed for synthetic terrain
    #[arg(long)]
    seed: Option<u64>,

    /// Pipeline configuration (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Biome, overriding the configuration: jungle, andean, temperate, arid
    #[arg(short, long)]
    biome: Option<Biome>,
    /// Write JSON here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

/// Outcome for one requested region
#[derive(Serialize)]
struct RegionReport {
    bbox: BoundingBox,
    #[serde(skip_serializing_if = "Option::is_none")]
    landforms: Option<Vec<LandformEntity>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    no_data: bool,
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Setting default subscriber failed")
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn read_dem(path: &Path, cell_size: Option<f64>) -> Result<ElevationGrid> {
    let pb = spinner("Reading DEM...");
    let grid = read_geotiff(path, cell_size)
        .with_context(|| format!("Failed to read DEM {}", path.display()))?;
    pb.finish_and_clear();
    info!("Input: {} x {}", grid.cols(), grid.rows());
    Ok(grid)
}

fn write_dem(grid: &ElevationGrid, path: &Path) -> Result<()> {
    let pb = spinner("Writing output...");
    write_geotiff(grid, path).with_context(|| format!("Failed to write {}", path.display()))?;
    pb.finish_and_clear();
    Ok(())
}

fn load_config(path: Option<&Path>, biome: Option<Biome>) -> Result<PipelineConfig> {
    let mut config = match path {
        Some(path) => {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            toml::from_str(&contents).context("Invalid pipeline config")?
        }
        None => PipelineConfig::default(),
    };
    if let Some(biome) = biome {
        config.biome = biome;
    }
    config.validate().context("Invalid pipeline config")?;
    Ok(config)
}

fn parse_bbox(s: &str) -> Result<BoundingBox> {
    let parts: Vec<f64> = s
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<std::result::Result<_, _>>()
        .with_context(|| format!("Invalid bounding box: {}", s))?;
    let [north, south, east, west] = parts[..] else {
        bail!("Bounding box must be NORTH,SOUTH,EAST,WEST, got: {}", s);
    };
    let bbox = BoundingBox::new(north, south, east, west);
    bbox.validate()?;
    Ok(bbox)
}

fn parse_rgb(s: &str) -> Result<(u8, u8, u8)> {
    let parts: Vec<u8> = s
        .split(',')
        .map(|p| p.trim().parse::<u8>())
        .collect::<std::result::Result<_, _>>()
        .with_context(|| format!("Invalid RGB triple: {}", s))?;
    match parts[..] {
        [r, g, b] => Ok((r, g, b)),
        _ => bail!("RGB must be R,G,B, got: {}", s),
    }
}

fn emit_json<T: Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Landforms saved to: {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn run_regions<P>(provider: &P, regions: &[BoundingBox], config: &PipelineConfig) -> Vec<RegionReport>
where
    P: ElevationProvider + Sync,
{
    let pb = spinner("Analyzing regions...");
    let results = analyze_batch(provider, regions, config, &CancelToken::new());
    pb.finish_and_clear();

    regions
        .iter()
        .zip(results)
        .map(|(bbox, result)| match result {
            Ok(landforms) => RegionReport {
                bbox: *bbox,
                landforms: Some(landforms),
                error: None,
                no_data: false,
            },
            Err(e) => {
                if e.is_bad_input() {
                    warn!("{}: {}", bbox, e);
                }
                RegionReport {
                    bbox: *bbox,
                    landforms: None,
                    no_data: e.is_no_data(),
                    error: Some(e.to_string()),
                }
            }
        })
        .collect()
}

fn analyze(args: AnalyzeArgs) -> Result<()> {
    let config = load_config(args.config.as_deref(), args.biome)?;
    let regions = args
        .bbox
        .iter()
        .map(|s| parse_bbox(s))
        .collect::<Result<Vec<_>>>()?;
    let start = Instant::now();

    if let Some(path) = &args.geotiff {
        let grid = read_dem(path, args.cell_size)?;
        let pb = spinner("Analyzing terrain...");
        let entities = analyze_terrain(&grid, &config).context("Terrain analysis failed")?;
        pb.finish_and_clear();
        info!("{} landforms in {:.2?}", entities.len(), start.elapsed());
        return emit_json(&entities, args.output.as_deref());
    }

    let reports = if let Some(root) = &args.tiles {
        let provider = TerrainRgbProvider::new(DirectoryTileSource::new(root), args.zoom)?;
        run_regions(&provider, &regions, &config)
    } else if args.synthetic {
        let mut terrain = SyntheticTerrain::default();
        terrain.seed = args.seed;
        if regions.is_empty() {
            let grid = terrain.generate()?;
            let entities = analyze_terrain(&grid, &config)?;
            info!("{} landforms in {:.2?}", entities.len(), start.elapsed());
            return emit_json(&entities, args.output.as_deref());
        }
        run_regions(&terrain, &regions, &config)
    } else {
        bail!("Choose an input: --geotiff, --tiles or --synthetic");
    };

    let found: usize = reports
        .iter()
        .filter_map(|r| r.landforms.as_ref())
        .map(Vec::len)
        .sum();
    info!(
        "{} landforms across {} regions in {:.2?}",
        found,
        reports.len(),
        start.elapsed()
    );
    emit_json(&reports, args.output.as_deref())
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    match cli.command {
        Commands::Analyze(args) => analyze(args)?,

        Commands::Synth {
            output,
            params,
            size,
            seed,
        } => {
            let mut terrain: SyntheticTerrain = match params {
                Some(path) => {
                    let contents = std::fs::read_to_string(&path)
                        .with_context(|| format!("Failed to read {}", path.display()))?;
                    toml::from_str(&contents).context("Invalid synthetic terrain parameters")?
                }
                None => SyntheticTerrain::default(),
            };
            if let Some(size) = size {
                terrain.rows = size;
                terrain.cols = size;
            }
            if seed.is_some() {
                terrain.seed = seed;
            }
            let start = Instant::now();
            let grid = terrain.generate()?;
            write_dem(&grid, &output)?;
            println!("Synthetic DEM saved to: {}", output.display());
            println!("  Processing time: {:.2?}", start.elapsed());
        }

        Commands::Decode {
            input,
            output,
            cell_size,
            rgb,
        } => {
            if let Some(rgb) = rgb {
                let (r, g, b) = parse_rgb(&rgb)?;
                println!("{:.1}", decode_terrain_rgb(r, g, b));
                return Ok(());
            }
            let Some(input) = input else {
                bail!("Provide a tile file or --rgb R,G,B");
            };
            let bytes = std::fs::read(&input)
                .with_context(|| format!("Failed to read tile {}", input.display()))?;
            let data = decode_rgb_tile(&bytes).context("Failed to decode terrain-RGB tile")?;
            let grid = ElevationGrid::from_array(data, cell_size)?;
            let stats = grid.statistics();
            println!("Tile: {} x {}", grid.cols(), grid.rows());
            println!("  Min: {:.1}  Max: {:.1}  Mean: {:.1}", stats.min, stats.max, stats.mean);
            if let Some(output) = output {
                write_dem(&grid, &output)?;
                println!("DEM saved to: {}", output.display());
            }
        }

        Commands::Info { input, cell_size } => {
            let grid = read_dem(&input, cell_size)?;
            let stats = grid.statistics();

            println!("File: {}", input.display());
            println!("Dimensions: {} x {} ({} cells)", grid.cols(), grid.rows(), grid.len());
            println!("Cell size: {} m", grid.cell_size());
            if let Some(bbox) = grid.bbox() {
                println!("Bounds: {}", bbox);
            }
            println!("\nStatistics:");
            println!("  Min: {:.4}", stats.min);
            println!("  Max: {:.4}", stats.max);
            println!("  Mean: {:.4}", stats.mean);
        }

        Commands::Config => {
            let text = toml::to_string_pretty(&PipelineConfig::default())?;
            print!("{}", text);
        }
    }

    Ok(())
}
