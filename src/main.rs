use anyhow::{Context, Result};
use clap::Parser;
use drift_common::{StudioConfig, PRESETS};
use env_logger::{Builder, Env};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};
use neural_drift::{FrameClock, ParameterStore};
use std::path::PathBuf;
use std::time::Instant;

/// Runs a neural drift session headlessly and exports the final canvas as PNG.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Studio config file (.toml). Built-in defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of frames to simulate before exporting
    #[arg(short, long)]
    frames: Option<u32>,

    /// Seed override
    #[arg(long)]
    seed: Option<String>,

    /// Pick a random seed in 1..=999999 (applied after --seed)
    #[arg(long)]
    random_seed: bool,

    /// Built-in preset applied before the first frame
    #[arg(short, long)]
    preset: Option<String>,

    /// Parameter override as key=value, e.g. flowIntensity=2.2 (repeatable)
    #[arg(long = "set", value_name = "KEY=VALUE")]
    overrides: Vec<String>,

    /// Directory the PNG is written to
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// File name prefix of the PNG
    #[arg(long)]
    prefix: Option<String>,

    /// Pace frames at the configured frame rate instead of running flat out
    #[arg(long)]
    realtime: bool,

    /// Print the built-in presets and exit
    #[arg(long)]
    list_presets: bool,
}

fn main() -> Result<()> {
    Builder::from_env(Env::default().default_filter_or("info")).init();
    run(Args::parse())
}

fn run(args: Args) -> Result<()> {
    if args.list_presets {
        for preset in PRESETS {
            println!("{:<16} {}", preset.name, preset.description);
        }
        return Ok(());
    }

    info!("Starting Neural Drift session...");

    // --- Load Configuration ---
    let config = match &args.config {
        Some(path) => StudioConfig::load(path)?,
        None => StudioConfig::default(),
    };
    let frames = args.frames.unwrap_or(config.session.frames);
    let output_dir = args.output_dir.clone().unwrap_or_else(|| config.output.directory.clone());
    let prefix = args.prefix.clone().unwrap_or_else(|| config.output.prefix.clone());

    // --- Acquire the canvas and seed the first batch ---
    let mut store = ParameterStore::new(config.params.clone(), config.canvas.width, config.canvas.height)?;
    info!(
        "Canvas {}x{} at {} fps target.",
        config.canvas.width, config.canvas.height, config.canvas.frame_rate
    );

    // --- Apply preset and overrides the way the control panel would ---
    if let Some(name) = args.preset.as_deref().or(config.session.preset.as_deref()) {
        store.apply_preset(name)?;
    }
    if let Some(seed) = &args.seed {
        store.on_change_str("seed", seed)?;
    }
    if args.random_seed {
        store.random_seed()?;
        info!("Random seed: {}.", store.params().seed);
    }
    for entry in &args.overrides {
        let (key, value) = entry
            .split_once('=')
            .with_context(|| format!("Override '{}' is not of the form key=value", entry))?;
        store.on_change_str(key, value)?;
    }
    info!("Running {} frames with {} particles.", frames, store.params().particle_count);
    debug!("Simulation Parameters: {:#?}", store.params());

    // --- Simulation Loop ---
    let progress_bar = ProgressBar::new(frames as u64);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} frames ({percent}%) [{eta}]")?
            .progress_chars("#>-"),
    );

    let stats_interval = config.session.stats_interval;
    let mut clock = FrameClock::new(config.canvas.frame_rate, args.realtime);
    let start_time = Instant::now();

    for frame in 0..frames {
        store.tick();
        let work = clock.wait_for_next_frame();
        progress_bar.inc(1);

        let is_last = frame + 1 == frames;
        if stats_interval > 0 && ((frame + 1) % stats_interval == 0 || is_last) {
            let stats = store.simulation().stats();
            progress_bar.suspend(|| {
                info!(
                    "Frame [{}/{}] | t={:.4} | Particles: {} | Mean speed: {:.3} (peak {:.0}% of cap) | Frame time: {:6.2} ms",
                    frame + 1,
                    frames,
                    stats.time_offset,
                    stats.particle_count,
                    stats.mean_speed,
                    stats.max_speed_ratio * 100.0,
                    work.as_secs_f64() * 1000.0
                )
            });
        }
    }
    progress_bar.finish_with_message("done");

    let total_duration = start_time.elapsed();
    info!(
        "Simulated {} frames in {:.3} seconds ({:.1} fps).",
        frames,
        total_duration.as_secs_f64(),
        frames as f64 / total_duration.as_secs_f64().max(1e-9)
    );

    // --- Export ---
    let path = store.export_image(&output_dir, &prefix)?;
    info!("Session complete. Image saved to {}", path.display());
    Ok(())
}
