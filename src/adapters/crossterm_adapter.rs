//! Crossterm implementation of the Terminal port.

use crate::ports::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseKind, Terminal, TerminalEvent};
use anyhow::{Context, Result};
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode as CtKeyCode, KeyEventKind,
        KeyModifiers as CtKeyModifiers, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Frame, Terminal as RatatuiTerminal};
use std::io::{self, Stdout};
use std::time::Duration;

pub struct CrosstermTerminal {
    terminal: RatatuiTerminal<CrosstermBackend<Stdout>>,
}

impl CrosstermTerminal {
    pub fn new() -> Result<Self> {
        enable_raw_mode().context("enable raw mode")?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = RatatuiTerminal::new(backend)?;
        Ok(Self { terminal })
    }
}

impl Drop for CrosstermTerminal {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        );
    }
}

impl Terminal for CrosstermTerminal {
    fn draw<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut Frame),
    {
        self.terminal.draw(f)?;
        Ok(())
    }

    fn poll_event(&self, timeout: Duration) -> Result<Option<TerminalEvent>> {
        if !event::poll(timeout)? {
            return Ok(None);
        }
        let converted = match event::read()? {
            // Windows reports releases too
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                convert_key_code(key.code).map(|code| {
                    TerminalEvent::Key(KeyEvent {
                        code,
                        modifiers: convert_modifiers(key.modifiers),
                    })
                })
            }
            Event::Mouse(mouse) => convert_mouse_kind(mouse.kind).map(|kind| {
                TerminalEvent::Mouse(MouseEvent {
                    kind,
                    column: mouse.column,
                    row: mouse.row,
                })
            }),
            Event::Resize(w, h) => Some(TerminalEvent::Resize(w, h)),
            _ => None,
        };
        Ok(converted)
    }
}

fn convert_key_code(code: CtKeyCode) -> Option<KeyCode> {
    match code {
        CtKeyCode::Char(c) => Some(KeyCode::Char(c)),
        CtKeyCode::Enter => Some(KeyCode::Enter),
        CtKeyCode::Esc => Some(KeyCode::Esc),
        CtKeyCode::Up => Some(KeyCode::Up),
        CtKeyCode::Down => Some(KeyCode::Down),
        CtKeyCode::Left => Some(KeyCode::Left),
        CtKeyCode::Right => Some(KeyCode::Right),
        CtKeyCode::Tab => Some(KeyCode::Tab),
        CtKeyCode::BackTab => Some(KeyCode::BackTab),
        CtKeyCode::Backspace => Some(KeyCode::Backspace),
        CtKeyCode::Delete => Some(KeyCode::Delete),
        CtKeyCode::Home => Some(KeyCode::Home),
        CtKeyCode::End => Some(KeyCode::End),
        CtKeyCode::PageUp => Some(KeyCode::PageUp),
        CtKeyCode::PageDown => Some(KeyCode::PageDown),
        _ => None,
    }
}

fn convert_modifiers(mods: CtKeyModifiers) -> KeyModifiers {
    KeyModifiers {
        ctrl: mods.contains(CtKeyModifiers::CONTROL),
        alt: mods.contains(CtKeyModifiers::ALT),
        shift: mods.contains(CtKeyModifiers::SHIFT),
    }
}

fn convert_mouse_kind(kind: MouseEventKind) -> Option<MouseKind> {
    match kind {
        MouseEventKind::ScrollUp => Some(MouseKind::ScrollUp),
        MouseEventKind::ScrollDown => Some(MouseKind::ScrollDown),
        MouseEventKind::ScrollLeft => Some(MouseKind::ScrollLeft),
        MouseEventKind::ScrollRight => Some(MouseKind::ScrollRight),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wheel_kinds_convert() {
        assert_eq!(convert_mouse_kind(MouseEventKind::ScrollUp), Some(MouseKind::ScrollUp));
        assert_eq!(convert_mouse_kind(MouseEventKind::Moved), None);
    }

    #[test]
    fn test_modifiers_convert() {
        let mods = convert_modifiers(CtKeyModifiers::CONTROL | CtKeyModifiers::SHIFT);
        assert!(mods.ctrl && mods.shift && !mods.alt);
        assert_eq!(convert_key_code(CtKeyCode::F(1)), None);
    }
}
