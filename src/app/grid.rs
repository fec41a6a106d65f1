//! Heatmap and surface view of an 8x8 sensor grid
//!
//! A background thread reads and parses lines into a queue. The display
//! drains that queue on a fixed tick and renders only the newest frame.

use super::log_path;
use super::terminal::{poll_control, Control, TerminalSession};
use crate::config::GridProfile;
use crate::ingest::{print_summary, GridProducer, IngestStats, StatsSnapshot};
use crate::protocol::GridFrame;
use crate::queue::{frame_queue, FrameReceiver};
use crate::render::GridRenderContext;
use crate::serial::SerialConnection;
use anyhow::{Context, Result};
use colored::Colorize;
use ratatui::backend::Backend;
use ratatui::Terminal;
use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Run the grid view until the user quits.
///
/// The port is opened on the reader thread. If that fails the window stays
/// up with nothing to show and the error goes to the log.
pub fn run_grid(profile: &GridProfile) -> Result<()> {
    println!(
        "{} Reading {}x{} frames from {} at {} baud",
        "[*]".cyan().bold(),
        profile.shape.rows,
        profile.shape.cols,
        profile.port_path.white(),
        profile.baud_rate
    );

    let (tx, rx) = frame_queue();
    let stats = Arc::new(IngestStats::default());
    let port_config = profile.port_config();

    let producer = GridProducer::spawn(
        move || SerialConnection::open(port_config),
        profile.settle_delay,
        profile.shape,
        tx,
        Arc::clone(&stats),
    )
    .context("failed to start the grid reader thread")?;

    let mut view = GridRenderContext::new(profile);
    let started = Instant::now();

    let outcome = TerminalSession::start()
        .context("failed to initialise the terminal")
        .and_then(|mut session| {
            grid_loop(
                session.terminal_mut(),
                &rx,
                &mut view,
                &stats,
                profile.refresh_interval,
                poll_control,
            )
        });

    producer.stop();
    let snapshot = stats.snapshot();
    print_summary("Grid", &snapshot, started.elapsed());
    println!("Frames rendered: {}", view.frames_rendered());
    if view.frames_skipped() > 0 {
        println!("Frames superseded before display: {}", view.frames_skipped());
    }
    println!("Log file: {}", log_path().display());
    if snapshot.frames == 0 {
        println!("{} No frames received", "[!]".yellow().bold());
    }

    outcome
}

/// Tick loop: every `tick`, drain the queue and redraw if a frame arrived or
/// the counters moved. Returns when the user quits.
pub fn grid_loop<B, P>(
    terminal: &mut Terminal<B>,
    queue: &FrameReceiver<GridFrame>,
    view: &mut GridRenderContext,
    stats: &IngestStats,
    tick: Duration,
    mut poll: P,
) -> Result<()>
where
    B: Backend,
    P: FnMut(Duration) -> io::Result<Option<Control>>,
{
    let mut drawn: StatsSnapshot = stats.snapshot();
    terminal.draw(|f| view.draw(f, &drawn))?;
    let mut next_tick = Instant::now() + tick;

    loop {
        let mut redraw = false;
        match poll(next_tick.saturating_duration_since(Instant::now()))? {
            Some(Control::Quit) => return Ok(()),
            Some(Control::Redraw) => redraw = true,
            None => {}
        }

        let now = Instant::now();
        if now >= next_tick {
            next_tick = now + tick;
            redraw |= view.consume(queue);
        }

        let current = stats.snapshot();
        if redraw || current != drawn {
            drawn = current;
            terminal.draw(|f| view.draw(f, &drawn))?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GRID_PROFILE;
    use crate::protocol::GridShape;
    use crate::render::tests::buffer_text;
    use crate::queue::FrameSender;
    use ratatui::backend::TestBackend;
    use std::thread;

    fn frame(offset: i32) -> GridFrame {
        GridFrame::from_row_major(GridShape::new(8, 8), (0..64).map(|v| v + offset).collect())
            .unwrap()
    }

    /// Sleeps through each poll and quits after `ticks` calls
    fn quit_after(ticks: usize) -> impl FnMut(Duration) -> io::Result<Option<Control>> {
        let mut calls = 0;
        move |timeout| {
            calls += 1;
            if calls > ticks {
                return Ok(Some(Control::Quit));
            }
            thread::sleep(timeout);
            Ok(None)
        }
    }

    fn push_all(tx: &FrameSender<GridFrame>, offsets: &[i32]) {
        for &offset in offsets {
            tx.push(frame(offset));
        }
    }

    #[test]
    fn test_tick_renders_latest_frame() {
        let (tx, rx) = frame_queue();
        push_all(&tx, &[0, 10, 20]);
        let stats = IngestStats::default();
        let mut view = GridRenderContext::new(&GRID_PROFILE);
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();

        grid_loop(
            &mut terminal,
            &rx,
            &mut view,
            &stats,
            Duration::from_millis(5),
            quit_after(3),
        )
        .unwrap();

        assert_eq!(view.frames_rendered(), 1);
        assert_eq!(view.frames_skipped(), 2);
        assert_eq!(view.heatmap().frame(), Some(&frame(20)));
        assert_eq!(view.surface().heights(), frame(20).cells());
        assert!(buffer_text(terminal.backend().buffer()).contains("max 83"));
    }

    #[test]
    fn test_starved_queue_keeps_waiting() {
        let (_tx, rx) = frame_queue();
        let stats = IngestStats::default();
        let mut view = GridRenderContext::new(&GRID_PROFILE);
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();

        grid_loop(
            &mut terminal,
            &rx,
            &mut view,
            &stats,
            Duration::from_millis(5),
            quit_after(4),
        )
        .unwrap();

        assert_eq!(view.frames_rendered(), 0);
        assert!(buffer_text(terminal.backend().buffer()).contains("Waiting for data"));
    }

    #[test]
    fn test_quit_is_immediate() {
        let (tx, rx) = frame_queue();
        push_all(&tx, &[0]);
        let stats = IngestStats::default();
        let mut view = GridRenderContext::new(&GRID_PROFILE);
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();

        grid_loop(
            &mut terminal,
            &rx,
            &mut view,
            &stats,
            Duration::from_secs(60),
            |_| Ok(Some(Control::Quit)),
        )
        .unwrap();

        assert_eq!(view.frames_rendered(), 0);
        assert_eq!(rx.len(), 1);
    }
}
