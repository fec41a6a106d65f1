//! Line ingestion for both views
//!
//! Turns line events into frames, keeps counters of what was accepted and
//! dropped, and runs the background reader used by the grid view.

use crate::buffer::RollingBuffer;
use crate::protocol::{parse_grid, parse_scalar, GridFrame, GridShape};
use crate::queue::FrameSender;
use crate::serial::{LineEvent, LineSource, SerialError};
use colored::Colorize;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Granularity of the interruptible settle wait
const SETTLE_STEP: Duration = Duration::from_millis(50);

/// Counters shared between the reader and the display
#[derive(Debug, Default)]
pub struct IngestStats {
    lines: AtomicU64,
    frames: AtomicU64,
    malformed: AtomicU64,
    undecodable: AtomicU64,
}

/// Point-in-time copy of `IngestStats`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub lines: u64,
    pub frames: u64,
    pub malformed: u64,
    pub undecodable: u64,
}

impl StatsSnapshot {
    /// Lines that never became a frame
    pub fn dropped(&self) -> u64 {
        self.malformed + self.undecodable
    }
}

impl IngestStats {
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            lines: self.lines.load(Ordering::Relaxed),
            frames: self.frames.load(Ordering::Relaxed),
            malformed: self.malformed.load(Ordering::Relaxed),
            undecodable: self.undecodable.load(Ordering::Relaxed),
        }
    }

    fn count_line(&self) {
        self.lines.fetch_add(1, Ordering::Relaxed);
    }

    fn count_frame(&self) {
        self.frames.fetch_add(1, Ordering::Relaxed);
    }

    fn count_malformed(&self) {
        self.malformed.fetch_add(1, Ordering::Relaxed);
    }

    fn count_undecodable(&self) {
        self.undecodable.fetch_add(1, Ordering::Relaxed);
    }
}

/// What the caller should do after a line event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// A frame was produced
    Frame,
    /// Nothing usable; keep reading
    Continue,
    /// The stream ended
    Closed,
}

/// Record events that never carry a frame. Returns the text line otherwise.
fn line_text(event: LineEvent, stats: &IngestStats) -> Result<String, Flow> {
    match event {
        LineEvent::Line(text) => {
            stats.count_line();
            Ok(text)
        }
        LineEvent::Idle => Err(Flow::Continue),
        LineEvent::Undecodable(bytes) => {
            stats.count_line();
            stats.count_undecodable();
            log::warn!("dropping undecodable line ({} bytes): {:02x?}", bytes.len(), bytes);
            Err(Flow::Continue)
        }
        LineEvent::Overlong(len) => {
            stats.count_line();
            stats.count_undecodable();
            log::warn!("dropping {} bytes received without a newline", len);
            Err(Flow::Continue)
        }
        LineEvent::Closed => {
            log::info!("serial stream closed");
            Err(Flow::Closed)
        }
    }
}

/// Scalar pipeline step: parse and append to the rolling window.
pub fn ingest_scalar(
    event: LineEvent,
    history: &mut RollingBuffer<u32>,
    stats: &IngestStats,
) -> Flow {
    let text = match line_text(event, stats) {
        Ok(text) => text,
        Err(flow) => return flow,
    };

    match parse_scalar(&text) {
        Ok(frame) => {
            stats.count_frame();
            history.push(frame.value());
            Flow::Frame
        }
        Err(e) => {
            // Scalar noise is dropped silently
            stats.count_malformed();
            log::trace!("ignoring {:?}: {}", text, e);
            Flow::Continue
        }
    }
}

/// Grid pipeline step: parse and enqueue.
pub fn ingest_grid(
    event: LineEvent,
    shape: GridShape,
    queue: &FrameSender<GridFrame>,
    stats: &IngestStats,
) -> Flow {
    let text = match line_text(event, stats) {
        Ok(text) => text,
        Err(flow) => return flow,
    };

    match parse_grid(&text, shape) {
        Ok(frame) => {
            stats.count_frame();
            if !queue.push(frame) {
                log::debug!("render loop gone, stopping ingestion");
                return Flow::Closed;
            }
            Flow::Frame
        }
        Err(e) => {
            stats.count_malformed();
            log::warn!("dropping grid line: {}", e);
            Flow::Continue
        }
    }
}

/// Background reader for the grid view.
///
/// Owns its serial source for the whole run. Raising the stop flag makes the
/// thread return after the current read (bounded by the read timeout).
pub struct GridProducer {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl GridProducer {
    /// Spawn the reader. `open` runs on the reader thread; if it fails the
    /// error is logged and the thread ends without producing anything.
    pub fn spawn<S, F>(
        open: F,
        settle: Duration,
        shape: GridShape,
        queue: FrameSender<GridFrame>,
        stats: Arc<IngestStats>,
    ) -> std::io::Result<Self>
    where
        S: LineSource + 'static,
        F: FnOnce() -> Result<S, SerialError> + Send + 'static,
    {
        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);

        let handle = thread::Builder::new()
            .name("grid-reader".to_string())
            .spawn(move || {
                let mut source = match open() {
                    Ok(source) => source,
                    Err(e) => {
                        log::error!("{}: {}", e, error_chain(&e));
                        return;
                    }
                };

                if !settle_wait(&flag, settle) {
                    return;
                }

                run_grid_reader(&mut source, &flag, shape, &queue, &stats);
                log::debug!("grid reader finished");
            })?;

        Ok(Self {
            running,
            handle: Some(handle),
        })
    }

    /// Whether the reader thread has returned
    #[cfg(test)]
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |h| h.is_finished())
    }

    /// Raise the stop flag and wait for the thread
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("grid reader thread panicked");
            }
        }
    }
}

impl Drop for GridProducer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Reader loop body; returns when stopped, closed or on a read failure
fn run_grid_reader<S: LineSource>(
    source: &mut S,
    running: &AtomicBool,
    shape: GridShape,
    queue: &FrameSender<GridFrame>,
    stats: &IngestStats,
) {
    while running.load(Ordering::SeqCst) {
        let event = match source.next_event() {
            Ok(event) => event,
            Err(e) => {
                log::error!("{}: {}", e, error_chain(&e));
                return;
            }
        };
        if ingest_grid(event, shape, queue, stats) == Flow::Closed {
            return;
        }
    }
}

/// Sleep for `total` unless the stop flag drops first. Returns false if
/// stopped.
fn settle_wait(running: &AtomicBool, total: Duration) -> bool {
    let deadline = Instant::now() + total;
    loop {
        if !running.load(Ordering::SeqCst) {
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        thread::sleep(SETTLE_STEP.min(deadline - now));
    }
}

fn error_chain(e: &dyn std::error::Error) -> String {
    let mut parts = Vec::new();
    let mut source = e.source();
    while let Some(inner) = source {
        parts.push(inner.to_string());
        source = inner.source();
    }
    if parts.is_empty() {
        "no further detail".to_string()
    } else {
        parts.join(": ")
    }
}

/// Print a summary of an ingestion run
pub fn print_summary(title: &str, stats: &StatsSnapshot, elapsed: Duration) {
    println!("\n{}", "=".repeat(60).dimmed());
    println!("{}", format!("--- {} Summary ---", title).cyan().bold());
    println!(
        "Finished at {} after {:.1}s",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        elapsed.as_secs_f64()
    );
    println!("Lines received: {}", stats.lines);
    println!("Frames accepted: {}", stats.frames.to_string().green());
    println!(
        "Lines dropped: {}",
        if stats.dropped() > 0 {
            stats.dropped().to_string().yellow().bold().to_string()
        } else {
            stats.dropped().to_string().green().to_string()
        }
    );
    if stats.undecodable > 0 {
        println!("  of which undecodable: {}", stats.undecodable);
    }
    println!("{}", "=".repeat(60).dimmed());
}
