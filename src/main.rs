use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{debug, info, warn, Level};

use contour_compositor::{
    config::{Config, DEFAULT_FPS},
    pipeline::PipelineDriver,
    video::{OutputSpec, PairSource},
};

/// Default output directory when none is selected.
const DEFAULT_OUTPUT_DIR: &str = "Videos/Contoured Videos";

#[derive(Parser)]
#[command(
    name = "contour-compositor",
    version,
    about = "Burn mask boundaries into frame sequences as contoured videos",
    long_about = "Contour-Compositor reads a folder of rendered frames and a parallel folder of per-frame masks, overlays each mask's boundary onto its frame as a white contour, and encodes the result into a single video."
)]
struct Cli {
    /// Directory containing the frame images
    #[arg(short, long)]
    frames: PathBuf,

    /// Directory containing the mask images
    #[arg(short, long)]
    masks: PathBuf,

    /// Base name for the output video (produces Contoured_<name>.mp4)
    #[arg(short, long)]
    name: String,

    /// Output directory for the contoured video
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Frames per second for the output video
    #[arg(long, default_value = "30")]
    fps: String,

    /// Configuration file (optional)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .init();

    info!("Starting Contour-Compositor v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let mut config = match cli.config {
        Some(config_path) => {
            info!("Loading configuration from {:?}", config_path);
            Config::from_file(&config_path)?
        }
        None => {
            debug!("Using default configuration");
            Config::default()
        }
    };

    // An unparseable or zero fps falls back to the default; the pipeline
    // itself only ever sees a resolved, positive value.
    config.output.fps = match cli.fps.parse::<u32>() {
        Ok(fps) if fps > 0 => fps,
        _ => {
            warn!("FPS value '{}' is invalid. Using default FPS = {}.", cli.fps, DEFAULT_FPS);
            DEFAULT_FPS
        }
    };
    config.validate()?;

    let output_dir = cli
        .output
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));
    let destination = OutputSpec::contoured_destination(&output_dir, &cli.name);

    info!("Frames: {:?}", cli.frames);
    info!("Masks: {:?}", cli.masks);
    info!("Output: {:?}", destination);

    let source = PairSource::discover(
        &cli.frames,
        &cli.masks,
        &config.discovery.frame_extension,
        &config.discovery.mask_extension,
    )?;

    let total = source.len();
    let driver = PipelineDriver::new(config.output);
    let summary = driver.run(&source, &destination, &mut |processed: usize| {
        debug!("Processed {}/{} pairs", processed, total);
    })?;

    info!(
        "Video saved at: {} ({} frames written, {} skipped)",
        destination.display(),
        summary.written,
        summary.skipped
    );
    Ok(())
}
