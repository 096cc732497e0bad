//! csmap CLI - CS-map terrain visualization from elevation models

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use csmap_algorithms::terrain::CurvatureType;
use csmap_colormap::{BlendWeights, ScaleRange};
use csmap_core::io::read_geotiff;
use csmap_core::Raster;
use csmap_parallel::{ChunkScheduler, CsmapParams, RunSummary, DEFAULT_CHUNK_SIZE};

#[cfg(feature = "gdal")]
use csmap_core::io::{GdalRgbaSink, GdalSource, RasterSource};
#[cfg(not(feature = "gdal"))]
use csmap_core::io::{write_rgba_geotiff, RgbaRaster};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "csmap")]
#[command(author, version, about = "CS-map terrain visualization from DEMs", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a CS-map GeoTIFF from a DEM
    Process {
        /// Input DEM file
        input: PathBuf,
        /// Output RGBA GeoTIFF
        output: PathBuf,
        #[command(flatten)]
        params: ParamArgs,
        /// Worker threads (default: all cores, 1 = sequential)
        #[arg(short, long)]
        workers: Option<usize>,
    },
    /// Show information about a DEM and the CS-map it would produce
    Info {
        /// Input DEM file
        input: PathBuf,
        #[command(flatten)]
        params: ParamArgs,
    },
}

#[derive(Args)]
struct ParamArgs {
    /// Edge length of each read chunk in pixels
    #[arg(short, long, default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,
    /// Gaussian kernel width
    #[arg(long, default_value = "12")]
    gf_size: usize,
    /// Gaussian sigma
    #[arg(long, default_value = "3")]
    gf_sigma: usize,
    /// Curvature cell size
    #[arg(long, default_value = "1")]
    cvt_size: usize,
    /// Height normalization range as min,max
    #[arg(long, default_value = "0,1000", allow_hyphen_values = true)]
    height_scale: String,
    /// Slope normalization range (radians) as min,max
    #[arg(long, default_value = "0,1.5", allow_hyphen_values = true)]
    slope_scale: String,
    /// Curvature normalization range as min,max
    #[arg(long, default_value = "-0.1,0.1", allow_hyphen_values = true)]
    curvature_scale: String,
    /// Curvature type: general, plan, profile
    #[arg(short = 't', long, default_value = "general")]
    curvature_type: String,
    /// Blend weights for dem,slope_red,slope_bw,curvature_blue,curvature_ryb
    #[arg(long, default_value = "0.2,0.15,0.35,0.1,0.2")]
    weights: String,
}

impl ParamArgs {
    fn to_params(&self) -> Result<CsmapParams> {
        Ok(CsmapParams::default()
            .with_gaussian(self.gf_size, self.gf_sigma)
            .with_cvt_size(self.cvt_size)
            .with_height_scale(parse_scale("height-scale", &self.height_scale)?)
            .with_slope_scale(parse_scale("slope-scale", &self.slope_scale)?)
            .with_curvature_scale(parse_scale("curvature-scale", &self.curvature_scale)?)
            .with_curvature_type(parse_curvature_type(&self.curvature_type)?)
            .with_blend_weights(parse_weights(&self.weights)?))
    }

    fn scheduler(&self) -> Result<ChunkScheduler> {
        ChunkScheduler::new(self.to_params()?, self.chunk_size).context("Invalid configuration")
    }
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("setting default subscriber failed")
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn tile_bar(total: usize) -> ProgressBar {
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(concat!(
                "{spinner:.green} [{elapsed_precise}] ",
                "[{bar:40.cyan/blue}] {pos}/{len} tiles ({eta})",
            ))
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}

fn read_dem(path: &Path) -> Result<Raster<f64>> {
    let pb = spinner("Reading raster...");
    let raster: Raster<f64> = read_geotiff(path, None).context("Failed to read raster")?;
    pb.finish_and_clear();
    info!("Input: {} x {}", raster.cols(), raster.rows());
    Ok(raster)
}

fn prepare_output(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory {}", parent.display())
            })?;
        }
    }
    Ok(())
}

/// Remove a partially written output so a failed run leaves nothing behind.
fn remove_partial(path: &Path) {
    if path.exists() {
        match std::fs::remove_file(path) {
            Ok(()) => warn!("Removed incomplete output {}", path.display()),
            Err(e) => warn!("Could not remove incomplete output {}: {}", path.display(), e),
        }
    }
}

fn done(name: &str, path: &Path, summary: &RunSummary) {
    println!("{} saved to: {}", name, path.display());
    println!(
        "  Output: {} x {} ({} tiles, {} workers)",
        summary.output_shape.1, summary.output_shape.0, summary.tiles, summary.workers
    );
    println!("  Processing time: {:.2?}", summary.elapsed);
}

fn parse_pair(flag: &str, s: &str) -> Result<(f64, f64)> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != 2 {
        anyhow::bail!("--{} must be 'min,max', got: {}", flag, s);
    }
    let min: f64 = parts[0].trim().parse().with_context(|| format!("Invalid --{} min", flag))?;
    let max: f64 = parts[1].trim().parse().with_context(|| format!("Invalid --{} max", flag))?;
    Ok((min, max))
}

fn parse_scale(flag: &str, s: &str) -> Result<ScaleRange> {
    let (min, max) = parse_pair(flag, s)?;
    Ok(ScaleRange { min, max })
}

fn parse_curvature_type(s: &str) -> Result<CurvatureType> {
    match s.to_lowercase().as_str() {
        "general" | "g" => Ok(CurvatureType::General),
        "plan" | "planform" => Ok(CurvatureType::Plan),
        "profile" | "prof" => Ok(CurvatureType::Profile),
        _ => anyhow::bail!("Unknown curvature type: {}. Use general, plan, or profile.", s),
    }
}

fn parse_weights(s: &str) -> Result<BlendWeights> {
    let values: Vec<f64> = s
        .split(',')
        .map(|v| v.trim().parse::<f64>().with_context(|| format!("Invalid weight: {}", v)))
        .collect::<Result<_>>()?;
    match values.as_slice() {
        &[dem, slope_red, slope_bw, curvature_blue, curvature_ryb] => Ok(BlendWeights {
            dem,
            slope_red,
            slope_bw,
            curvature_blue,
            curvature_ryb,
        }),
        _ => anyhow::bail!("--weights needs 5 comma-separated values, got {}", values.len()),
    }
}

// ─── Processing ─────────────────────────────────────────────────────────

/// Chunks are read from and written to disk through GDAL as they complete.
#[cfg(feature = "gdal")]
fn render(scheduler: &ChunkScheduler, input: &Path, output: &Path) -> Result<RunSummary> {
    let source = GdalSource::open(input).context("Failed to open input raster")?;
    let (rows, cols) = source.shape();
    info!("Input: {} x {}", cols, rows);

    let margin = scheduler.margin();
    let (out_rows, out_cols) = margin
        .output_size(rows, cols)
        .context("Input raster too small for the CS-map margin")?;
    let plan = scheduler.plan((rows, cols)).context("Failed to plan chunks")?;

    let result = {
        let mut sink = GdalRgbaSink::create(
            output,
            out_rows,
            out_cols,
            &margin.output_transform(&source.transform()),
            source.crs().as_ref(),
        )
        .context("Failed to create output raster")?;
        let pb = tile_bar(plan.len());
        let result = scheduler.run_with_progress(&source, &mut sink, |done, _| {
            pb.set_position(done as u64)
        });
        pb.finish_and_clear();
        result
    };

    result.or_else(|e| {
        remove_partial(output);
        Err(e).context("CS-map processing failed")
    })
}

/// The DEM is held in memory and the output is written once every tile succeeded.
#[cfg(not(feature = "gdal"))]
fn render(scheduler: &ChunkScheduler, input: &Path, output: &Path) -> Result<RunSummary> {
    let dem = read_dem(input)?;
    let plan = scheduler.plan(dem.shape()).context("Failed to plan chunks")?;
    let mut sink: RgbaRaster = scheduler.memory_sink(&dem).context("Failed to allocate output")?;

    let pb = tile_bar(plan.len());
    let summary = scheduler
        .run_with_progress(&dem, &mut sink, |done, _| pb.set_position(done as u64))
        .context("CS-map processing failed");
    pb.finish_and_clear();
    let summary = summary?;

    let pb = spinner("Writing output...");
    let written = write_rgba_geotiff(&sink, output).context("Failed to write output");
    pb.finish_and_clear();
    if written.is_err() {
        remove_partial(output);
    }
    written?;
    Ok(summary)
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    match cli.command {
        // ── Process ──────────────────────────────────────────────────
        Commands::Process {
            input,
            output,
            params,
            workers,
        } => {
            let scheduler = params.scheduler()?.with_workers(workers);
            prepare_output(&output)?;
            let start = Instant::now();
            let summary = render(&scheduler, &input, &output)?;
            info!("Total time including I/O: {:.2?}", start.elapsed());
            done("CS-map", &output, &summary);
        }

        // ── Info ─────────────────────────────────────────────────────
        Commands::Info { input, params } => {
            let scheduler = params.scheduler()?;
            let raster = read_dem(&input)?;
            let (rows, cols) = raster.shape();
            let bounds = raster.bounds();
            let stats = raster.statistics();

            println!("File: {}", input.display());
            println!("Dimensions: {} x {} ({} cells)", cols, rows, raster.len());
            println!("Cell size: {}", raster.cell_size());
            println!(
                "Bounds: ({:.6}, {:.6}) - ({:.6}, {:.6})",
                bounds.0, bounds.1, bounds.2, bounds.3
            );
            if let Some(crs) = raster.crs() {
                println!("CRS: {}", crs);
            }
            if let Some(nodata) = raster.nodata() {
                println!("NoData: {}", nodata);
            }
            println!("\nStatistics:");
            if let Some(min) = stats.min {
                println!("  Min: {:.4}", min);
            }
            if let Some(max) = stats.max {
                println!("  Max: {:.4}", max);
            }
            if let Some(mean) = stats.mean {
                println!("  Mean: {:.4}", mean);
            }
            println!(
                "  Valid cells: {} ({:.1}%)",
                stats.valid_count,
                100.0 * stats.valid_count as f64 / raster.len() as f64
            );

            let margin = scheduler.margin();
            println!("\nCS-map:");
            println!(
                "  Margin: {} (trim {} + shrink {} per side)",
                margin.margin, margin.trim, margin.shrink
            );
            match scheduler.plan((rows, cols)) {
                Ok(plan) => {
                    let (out_rows, out_cols) = plan.output_shape();
                    let origin = margin.output_transform(raster.transform());
                    println!("  Output: {} x {}", out_cols, out_rows);
                    println!("  Origin: ({:.6}, {:.6})", origin.origin_x, origin.origin_y);
                    println!(
                        "  Tiles: {} (chunk {}, step {})",
                        plan.len(),
                        plan.chunk_size(),
                        plan.step()
                    );
                }
                Err(e) => println!("  Not renderable: {}", e),
            }
        }
    }

    Ok(())
}
