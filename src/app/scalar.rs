//! Rolling line chart of a single sensor channel
//!
//! Everything runs on one thread: read a line, append the reading, redraw.
//! The port's short read timeout keeps the loop responsive to quit keys.

use super::log_path;
use super::terminal::{poll_control, Control, TerminalSession};
use crate::buffer::RollingBuffer;
use crate::config::ScalarProfile;
use crate::ingest::{ingest_scalar, print_summary, Flow, IngestStats};
use crate::render::ScalarRenderContext;
use crate::serial::{LineSource, SerialConnection};
use anyhow::{Context, Result};
use colored::Colorize;
use ratatui::backend::Backend;
use ratatui::Terminal;
use std::io;
use std::time::{Duration, Instant};

/// Why the loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarExit {
    Quit,
    Closed,
}

/// Run the scalar view until the user quits or the device goes away.
pub fn run_scalar(profile: &ScalarProfile) -> Result<()> {
    println!(
        "{} Opening {} at {} baud",
        "[*]".cyan().bold(),
        profile.port_path.white(),
        profile.baud_rate
    );

    let mut connection = SerialConnection::open(profile.port_config())
        .with_context(|| format!("cannot start the scalar view on {}", profile.port_path))?;

    let stats = IngestStats::default();
    let mut history = RollingBuffer::filled(profile.history_len, 0u32);
    let mut view = ScalarRenderContext::new(profile, &history);
    let started = Instant::now();

    let outcome = TerminalSession::start()
        .context("failed to initialise the terminal")
        .and_then(|mut session| {
            scalar_loop(
                session.terminal_mut(),
                &mut connection,
                &mut history,
                &mut view,
                &stats,
                poll_control,
            )
        });

    connection.close();
    print_summary("Scalar", &stats.snapshot(), started.elapsed());
    println!("Log file: {}", log_path().display());

    if outcome? == ScalarExit::Closed {
        println!("{} Serial stream closed by the device", "[!]".yellow().bold());
    }
    Ok(())
}

/// Read-parse-draw loop. Draws once up front so the zero-filled window is
/// visible before the first reading arrives.
pub fn scalar_loop<B, S, P>(
    terminal: &mut Terminal<B>,
    source: &mut S,
    history: &mut RollingBuffer<u32>,
    view: &mut ScalarRenderContext,
    stats: &IngestStats,
    mut poll: P,
) -> Result<ScalarExit>
where
    B: Backend,
    S: LineSource,
    P: FnMut(Duration) -> io::Result<Option<Control>>,
{
    terminal.draw(|f| view.draw(f, &stats.snapshot()))?;

    loop {
        let mut redraw = false;
        while let Some(control) = poll(Duration::ZERO)? {
            match control {
                Control::Quit => return Ok(ScalarExit::Quit),
                Control::Redraw => redraw = true,
            }
        }

        let event = source.next_event().context("serial read failed")?;
        match ingest_scalar(event, history, stats) {
            Flow::Frame => {
                view.update(history);
                redraw = true;
            }
            Flow::Continue => {}
            Flow::Closed => return Ok(ScalarExit::Closed),
        }

        if redraw {
            terminal.draw(|f| view.draw(f, &stats.snapshot()))?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SCALAR_PROFILE;
    use crate::render::tests::buffer_text;
    use crate::serial::lines::script::ScriptedReader;
    use crate::serial::lines::LineReader;
    use ratatui::backend::TestBackend;

    fn setup() -> (RollingBuffer<u32>, ScalarRenderContext, Terminal<TestBackend>) {
        let history = RollingBuffer::filled(SCALAR_PROFILE.history_len, 0u32);
        let view = ScalarRenderContext::new(&SCALAR_PROFILE, &history);
        let terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        (history, view, terminal)
    }

    #[test]
    fn test_reads_until_stream_closes() {
        let (mut history, mut view, mut terminal) = setup();
        let stats = IngestStats::default();
        let mut source = LineReader::new(
            ScriptedReader::new()
                .lines(&["100", "noise"])
                .timeout()
                .lines(&["512"]),
        );

        let exit = scalar_loop(
            &mut terminal,
            &mut source,
            &mut history,
            &mut view,
            &stats,
            |_| Ok(None),
        )
        .unwrap();

        assert_eq!(exit, ScalarExit::Closed);
        assert_eq!(history.len(), 100);
        let tail: Vec<u32> = history.iter().skip(98).copied().collect();
        assert_eq!(tail, vec![100, 512]);
        assert_eq!(view.chart().latest(), Some(512.0));

        let snap = stats.snapshot();
        assert_eq!(snap.frames, 2);
        assert_eq!(snap.malformed, 1);
        assert!(buffer_text(terminal.backend().buffer()).contains("frames 2"));
    }

    #[test]
    fn test_quit_before_reading() {
        let (mut history, mut view, mut terminal) = setup();
        let stats = IngestStats::default();
        let mut source = LineReader::new(ScriptedReader::new().lines(&["700"]));

        let exit = scalar_loop(
            &mut terminal,
            &mut source,
            &mut history,
            &mut view,
            &stats,
            |_| Ok(Some(Control::Quit)),
        )
        .unwrap();

        assert_eq!(exit, ScalarExit::Quit);
        assert!(history.iter().all(|&v| v == 0));
    }

    #[test]
    fn test_read_error_aborts() {
        let (mut history, mut view, mut terminal) = setup();
        let stats = IngestStats::default();
        let mut source = LineReader::new(
            ScriptedReader::new()
                .lines(&["1"])
                .fail(io::ErrorKind::BrokenPipe),
        );

        let result = scalar_loop(
            &mut terminal,
            &mut source,
            &mut history,
            &mut view,
            &stats,
            |_| Ok(None),
        );

        assert!(result.is_err());
        assert_eq!(history.latest(), Some(&1));
    }
}
