//! Terminal lifetime and keyboard controls

use ratatui::crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::DefaultTerminal;
use std::io;
use std::time::Duration;

/// What the user asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Quit,
    /// Terminal resized; draw again even without new data
    Redraw,
}

/// Raw-mode alternate screen, restored when dropped
pub struct TerminalSession {
    terminal: DefaultTerminal,
}

impl TerminalSession {
    pub fn start() -> io::Result<Self> {
        let terminal = ratatui::try_init()?;
        log::debug!("terminal initialised");
        Ok(Self { terminal })
    }

    pub fn terminal_mut(&mut self) -> &mut DefaultTerminal {
        &mut self.terminal
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        ratatui::restore();
        log::debug!("terminal restored");
    }
}

/// Wait up to `timeout` for a control key or resize.
pub fn poll_control(timeout: Duration) -> io::Result<Option<Control>> {
    if !event::poll(timeout)? {
        return Ok(None);
    }
    Ok(match event::read()? {
        Event::Key(key) if key.kind == KeyEventKind::Press => key_control(key),
        Event::Resize(..) => Some(Control::Redraw),
        _ => None,
    })
}

fn key_control(key: KeyEvent) -> Option<Control> {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => Some(Control::Quit),
        // Raw mode turns Ctrl-C into an ordinary key press
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(Control::Quit)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quit_keys() {
        let quit = [
            KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE),
            KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE),
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        ];
        for key in quit {
            assert_eq!(key_control(key), Some(Control::Quit), "{key:?}");
        }
    }

    #[test]
    fn test_other_keys_ignored() {
        assert_eq!(
            key_control(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE)),
            None
        );
        assert_eq!(
            key_control(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)),
            None
        );
    }
}
