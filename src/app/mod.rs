//! Command handlers for the two live views
//!
//! Each view owns the terminal for its whole run. Logging goes to
//! [`log_path`] while a view is on screen; the run summary is printed after
//! the terminal has been restored.

pub mod grid;
pub mod scalar;
pub mod terminal;

pub use grid::run_grid;
pub use scalar::run_scalar;

use std::path::PathBuf;

/// Log file used while a view holds the terminal
pub fn log_path() -> PathBuf {
    std::env::temp_dir().join("sensor-plot.log")
}
