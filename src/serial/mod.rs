//! Serial port communication module
//!
//! This module provides functionality for:
//! - Opening the sensor's serial port with fixed settings
//! - Reading newline-terminated text lines with a read timeout
//! - Listing available serial ports

pub mod lines;
pub mod port;

pub use lines::{LineEvent, LineSource};
pub use port::{PortConfig, SerialConnection};

use thiserror::Error;

/// Serial-side failures
#[derive(Debug, Error)]
pub enum SerialError {
    /// The port could not be opened (missing device, permissions, busy)
    #[error("failed to open serial port {path}")]
    Open {
        path: String,
        #[source]
        source: serialport::Error,
    },

    /// Reading from an open port failed
    #[error("failed to read from serial port")]
    Read(#[source] std::io::Error),

    /// Port enumeration failed
    #[error("failed to enumerate serial ports")]
    Enumerate(#[source] serialport::Error),
}
