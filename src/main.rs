//! Sensor Plot
//!
//! Live terminal views of microcontroller sensor data arriving over a serial
//! link as newline-terminated ASCII.
//!
//! # Views
//!
//! - **Scalar**: one integer reading per line, shown as a rolling line chart
//!   of the last 100 samples on a fixed 0..1024 axis.
//! - **Grid**: 64 comma-separated integers per line, shown side by side as an
//!   8x8 heatmap (colour range follows each frame) and a wireframe surface
//!   (height axis fixed at 0..1023).
//!
//! # Usage
//!
//! ```bash
//! # Rolling chart from /dev/ttyACM0
//! sensor-plot scalar
//!
//! # Heatmap and surface from /dev/ttyUSB0
//! sensor-plot grid
//!
//! # Check which serial ports are present
//! sensor-plot ports
//! ```
//!
//! Press `q`, `Esc` or `Ctrl-C` to leave a view.

mod app;
mod buffer;
mod config;
mod ingest;
mod protocol;
mod queue;
mod render;
mod serial;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::fs::File;

use config::{GRID_PROFILE, SCALAR_PROFILE};

/// Sensor Plot
///
/// Live plots of serial sensor streams
#[derive(Parser)]
#[command(name = "sensor-plot")]
#[command(version = "0.1.0")]
#[command(about = "Live terminal plots of serial sensor data")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Rolling line chart of a single-value stream
    Scalar,

    /// Heatmap and 3D surface of an 8x8 grid stream
    Grid,

    /// List serial ports and check the ones both views expect
    Ports,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Scalar => {
            init_file_logger(cli.verbose)?;
            app::run_scalar(&SCALAR_PROFILE)
        }
        Commands::Grid => {
            init_file_logger(cli.verbose)?;
            app::run_grid(&GRID_PROFILE)
        }
        Commands::Ports => {
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(
                default_filter(cli.verbose),
            ))
            .init();
            serial::port::print_ports(&[
                ("scalar", SCALAR_PROFILE.port_path),
                ("grid", GRID_PROFILE.port_path),
            ])?;
            Ok(())
        }
    }
}

fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "info"
    }
}

/// Views own the terminal, so their log output goes to a file instead.
fn init_file_logger(verbose: bool) -> Result<()> {
    let path = app::log_path();
    let file = File::create(&path)
        .with_context(|| format!("cannot create log file {}", path.display()))?;

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_filter(verbose)),
    )
    .target(env_logger::Target::Pipe(Box::new(file)))
    .init();

    if verbose {
        eprintln!("{} Logging to {}", "[*]".cyan().bold(), path.display());
    }
    Ok(())
}
