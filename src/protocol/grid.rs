//! Grid line format: rows×columns comma-separated integers, row-major

use std::num::ParseIntError;
use thiserror::Error;

/// Fixed grid dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridShape {
    pub rows: usize,
    pub cols: usize,
}

impl GridShape {
    pub const fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// Number of values a line must carry
    pub const fn cell_count(&self) -> usize {
        self.rows * self.cols
    }
}

/// A complete grid of readings, stored row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridFrame {
    shape: GridShape,
    cells: Vec<i32>,
}

impl GridFrame {
    /// Build a frame from row-major values. Returns `None` if the length
    /// does not match the shape.
    #[cfg(test)]
    pub fn from_row_major(shape: GridShape, cells: Vec<i32>) -> Option<Self> {
        (cells.len() == shape.cell_count()).then_some(Self { shape, cells })
    }

    /// Value at (row, col)
    pub fn get(&self, row: usize, col: usize) -> Option<i32> {
        if row < self.shape.rows && col < self.shape.cols {
            Some(self.cells[row * self.shape.cols + col])
        } else {
            None
        }
    }

    /// Iterate over rows, top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[i32]> {
        self.cells.chunks(self.shape.cols)
    }

    /// Row-major values
    pub fn cells(&self) -> &[i32] {
        &self.cells
    }

    /// Smallest and largest cell value
    pub fn min_max(&self) -> (i32, i32) {
        self.cells
            .iter()
            .fold((i32::MAX, i32::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)))
    }
}

/// Why a line is not a grid frame
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridParseError {
    #[error("expected {expected} values, got {observed}")]
    TokenCount { observed: usize, expected: usize },

    #[error("invalid value {token:?} in line {line:?}: {source}")]
    InvalidToken {
        token: String,
        line: String,
        #[source]
        source: ParseIntError,
    },
}

/// Parse a trimmed line into a frame of the given shape.
///
/// The whole line is rejected if the count is wrong or any token is not an
/// integer; a frame is never partially filled.
pub fn parse_grid(line: &str, shape: GridShape) -> Result<GridFrame, GridParseError> {
    let tokens: Vec<&str> = line.split(',').collect();
    if tokens.len() != shape.cell_count() {
        return Err(GridParseError::TokenCount {
            observed: tokens.len(),
            expected: shape.cell_count(),
        });
    }

    let cells = tokens
        .iter()
        .map(|token| {
            token
                .trim()
                .parse::<i32>()
                .map_err(|source| GridParseError::InvalidToken {
                    token: token.to_string(),
                    line: line.to_string(),
                    source,
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(GridFrame { shape, cells })
}
