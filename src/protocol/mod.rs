//! Sensor line protocol
//!
//! The microcontroller prints one frame per line:
//!
//! ```text
//! scalar:  512\n
//! grid:    v0,v1,...,v63\n      (row-major, 8x8)
//! ```
//!
//! Anything else is noise and never produces a frame.

pub mod grid;
pub mod scalar;

pub use grid::{parse_grid, GridFrame, GridShape};
pub use scalar::parse_scalar;
