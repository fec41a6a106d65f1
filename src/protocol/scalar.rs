//! Scalar line format: one bare non-negative integer per line

use thiserror::Error;

/// One sensor reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScalarFrame(pub u32);

impl ScalarFrame {
    pub fn value(self) -> u32 {
        self.0
    }
}

/// Why a line is not a scalar frame
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScalarParseError {
    #[error("empty line")]
    Empty,
    #[error("non-digit character {0:?}")]
    NotDigits(char),
    #[error("reading {0} does not fit in 32 bits")]
    Overflow(String),
}

/// Parse a trimmed line. Only ASCII digits are accepted: no sign, no
/// decimal point, no inner whitespace.
pub fn parse_scalar(line: &str) -> Result<ScalarFrame, ScalarParseError> {
    if line.is_empty() {
        return Err(ScalarParseError::Empty);
    }
    if let Some(bad) = line.chars().find(|c| !c.is_ascii_digit()) {
        return Err(ScalarParseError::NotDigits(bad));
    }
    line.parse::<u32>()
        .map(ScalarFrame)
        .map_err(|_| ScalarParseError::Overflow(line.to_string()))
}
