//! Newline framing on top of a byte stream
//!
//! The serial port hands out arbitrary chunks and times out regularly. This
//! module turns that into one event per call: a decoded line, an idle poll,
//! or a diagnostic for bytes that could not become a line.

use super::SerialError;
use std::io::{ErrorKind, Read};

/// Longest line kept while waiting for a newline
pub const MAX_LINE_BYTES: usize = 4096;

/// Size of a single read from the underlying stream
const READ_CHUNK: usize = 256;

/// Result of one read-line attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineEvent {
    /// A complete, whitespace-trimmed line
    Line(String),
    /// The read timed out before a newline arrived; partial data is kept
    Idle,
    /// A complete line whose bytes are not valid UTF-8
    Undecodable(Vec<u8>),
    /// A partial line exceeded `MAX_LINE_BYTES` and was discarded
    Overlong(usize),
    /// The stream ended
    Closed,
}

/// Anything that yields line events; implemented by the serial connection
/// and by in-memory readers in tests.
pub trait LineSource {
    /// Block for at most one read timeout and report what happened
    fn next_event(&mut self) -> Result<LineEvent, SerialError>;
}

/// Splits a byte stream into lines
pub struct LineReader<R> {
    inner: R,
    pending: Vec<u8>,
    /// Dropping the rest of an overlong line up to its newline
    discarding: bool,
    closed: bool,
}

impl<R: Read> LineReader<R> {
    /// Wrap a reader
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            pending: Vec::new(),
            discarding: false,
            closed: false,
        }
    }

    /// Bytes received after the last newline
    #[cfg(test)]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Pull the next complete line out of `pending`, if there is one
    fn take_line(&mut self) -> Option<LineEvent> {
        let newline = self.pending.iter().position(|&b| b == b'\n')?;
        let mut line: Vec<u8> = self.pending.drain(..=newline).collect();
        line.pop();
        Some(decode(line))
    }

    /// Read the next line event
    pub fn read_event(&mut self) -> Result<LineEvent, SerialError> {
        if let Some(event) = self.take_line() {
            return Ok(event);
        }
        if self.closed {
            return Ok(LineEvent::Closed);
        }

        let mut chunk = [0u8; READ_CHUNK];
        loop {
            match self.inner.read(&mut chunk) {
                Ok(0) => {
                    self.closed = true;
                    // Flush a final unterminated line
                    if self.pending.is_empty() {
                        return Ok(LineEvent::Closed);
                    }
                    let rest = std::mem::take(&mut self.pending);
                    return Ok(decode(rest));
                }
                Ok(n) => {
                    self.pending.extend_from_slice(&chunk[..n]);
                    if self.discarding {
                        match self.pending.iter().position(|&b| b == b'\n') {
                            Some(newline) => {
                                self.pending.drain(..=newline);
                                self.discarding = false;
                            }
                            None => {
                                self.pending.clear();
                                continue;
                            }
                        }
                    }
                    if let Some(event) = self.take_line() {
                        return Ok(event);
                    }
                    if self.pending.len() > MAX_LINE_BYTES {
                        let dropped = self.pending.len();
                        self.pending.clear();
                        self.discarding = true;
                        return Ok(LineEvent::Overlong(dropped));
                    }
                }
                Err(ref e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(ref e)
                    if e.kind() == ErrorKind::TimedOut || e.kind() == ErrorKind::WouldBlock =>
                {
                    return Ok(LineEvent::Idle);
                }
                Err(e) => return Err(SerialError::Read(e)),
            }
        }
    }
}

impl<R: Read> LineSource for LineReader<R> {
    fn next_event(&mut self) -> Result<LineEvent, SerialError> {
        self.read_event()
    }
}

fn decode(bytes: Vec<u8>) -> LineEvent {
    match String::from_utf8(bytes) {
        Ok(text) => LineEvent::Line(text.trim().to_string()),
        Err(e) => LineEvent::Undecodable(e.into_bytes()),
    }
}


#[cfg(test)]
mod tests {
    use super::script::ScriptedReader;
    use super::*;

    fn line(text: &str) -> LineEvent {
        LineEvent::Line(text.to_string())
    }

    #[test]
    fn test_splits_and_trims_lines() {
        let mut reader = LineReader::new(ScriptedReader::new().chunk(b"12\r\n 34 \n56\n"));

        assert_eq!(reader.read_event().unwrap(), line("12"));
        assert_eq!(reader.read_event().unwrap(), line("34"));
        assert_eq!(reader.read_event().unwrap(), line("56"));
        assert_eq!(reader.read_event().unwrap(), LineEvent::Closed);
        assert_eq!(reader.read_event().unwrap(), LineEvent::Closed);
    }

    #[test]
    fn test_partial_line_survives_timeout() {
        let mut reader = LineReader::new(
            ScriptedReader::new()
                .chunk(b"1,2,")
                .timeout()
                .chunk(b"3\n"),
        );

        assert_eq!(reader.read_event().unwrap(), LineEvent::Idle);
        assert_eq!(reader.pending_len(), 4);
        assert_eq!(reader.read_event().unwrap(), line("1,2,3"));
    }

    #[test]
    fn test_undecodable_bytes_are_reported() {
        let mut reader = LineReader::new(ScriptedReader::new().chunk(b"\xff\xfe\n42\n"));

        assert_eq!(
            reader.read_event().unwrap(),
            LineEvent::Undecodable(vec![0xff, 0xfe])
        );
        assert_eq!(reader.read_event().unwrap(), line("42"));
    }

    #[test]
    fn test_unterminated_tail_flushed_at_end_of_stream() {
        let mut reader = LineReader::new(ScriptedReader::new().chunk(b"7\n8"));

        assert_eq!(reader.read_event().unwrap(), line("7"));
        assert_eq!(reader.read_event().unwrap(), line("8"));
        assert_eq!(reader.read_event().unwrap(), LineEvent::Closed);
    }

    #[test]
    fn test_overlong_line_is_discarded() {
        let junk = vec![b'9'; MAX_LINE_BYTES + 10];
        let mut reader = LineReader::new(ScriptedReader::new().chunk(&junk).chunk(b"\n5\n"));

        let mut event = reader.read_event().unwrap();
        while event == LineEvent::Idle {
            event = reader.read_event().unwrap();
        }
        assert!(matches!(event, LineEvent::Overlong(n) if n > MAX_LINE_BYTES));
        assert_eq!(reader.read_event().unwrap(), line("5"));
        assert_eq!(reader.read_event().unwrap(), LineEvent::Closed);
    }

    #[test]
    fn test_overlong_tail_never_becomes_a_line() {
        let mut garbage = b"x".to_vec();
        garbage.extend(std::iter::repeat(b' ').take(4400));
        garbage.extend_from_slice(b"512\n");
        let mut reader = LineReader::new(
            ScriptedReader::new()
                .chunk(&garbage)
                .chunk(b"7\n"),
        );

        assert!(matches!(reader.read_event().unwrap(), LineEvent::Overlong(_)));
        // Tail of the dropped line is consumed up to its newline
        assert_eq!(reader.read_event().unwrap(), line("7"));
        assert_eq!(reader.read_event().unwrap(), LineEvent::Closed);
    }

    #[test]
    fn test_discard_spans_timeouts() {
        let junk = vec![b'1'; MAX_LINE_BYTES + 1];
        let mut reader = LineReader::new(
            ScriptedReader::new()
                .chunk(&junk)
                .chunk(b"23")
                .timeout()
                .chunk(b"45\n6\n"),
        );

        let mut event = reader.read_event().unwrap();
        while event == LineEvent::Idle {
            event = reader.read_event().unwrap();
        }
        assert!(matches!(event, LineEvent::Overlong(_)));
        assert_eq!(reader.read_event().unwrap(), LineEvent::Idle);
        assert_eq!(reader.read_event().unwrap(), line("6"));
    }

    #[test]
    fn test_io_error_is_fatal() {
        let mut reader = LineReader::new(ScriptedReader::new().fail(ErrorKind::BrokenPipe));
        assert!(matches!(reader.read_event(), Err(SerialError::Read(_))));
    }

    #[test]
    fn test_interrupted_read_is_retried() {
        let mut reader = LineReader::new(
            ScriptedReader::new()
                .fail(ErrorKind::Interrupted)
                .chunk(b"3\n"),
        );
        assert_eq!(reader.read_event().unwrap(), line("3"));
    }
}
