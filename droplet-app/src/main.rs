//! Droplet demo
//!
//! Opens the fluid viewer and animates a block of particles so the camera,
//! panel and run controls can be tried without a solver.
//!
//! Controls:
//! - left drag: orbit, right drag: pan, wheel: zoom
//! - Space: run/pause, N: next frame, Escape: quit

mod animator;
mod app;

use clap::Parser;
use droplet_window::ViewerConfig;
use std::path::PathBuf;

/// Droplet - interactive particle fluid viewer
#[derive(Parser, Debug)]
#[command(name = "droplet")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Window width in logical pixels
    #[arg(long, default_value_t = 800)]
    width: u32,

    /// Window height in logical pixels
    #[arg(long, default_value_t = 600)]
    height: u32,

    /// Number of particles to animate
    #[arg(short = 'n', long, default_value_t = 4096)]
    particles: u32,

    /// JSON file with solver and rendering parameters
    #[arg(short, long)]
    params: Option<PathBuf>,

    /// Default log filter, overridden by RUST_LOG
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Also send spans to Tracy (needs the `tracy` feature)
    #[arg(long)]
    tracy: bool,
}

fn main() {
    let args = Args::parse();

    app::LoggingConfig {
        level: args.log_level.clone(),
        enable_tracy: args.tracy,
    }
    .init();

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        eprintln!("Application error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), app::AppError> {
    let params = match &args.params {
        Some(path) => app::load_params(path)?,
        None => Default::default(),
    };

    let config = app::DemoConfig {
        viewer: ViewerConfig::default().with_size(args.width, args.height),
        particles: args.particles,
        params,
        ..Default::default()
    };
    app::run(config)
}
