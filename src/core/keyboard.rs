//! Terminal keyboard input through crossterm

use super::scheduler::{KeyAction, KeySource};
use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use log::{debug, error, warn};
use std::time::Duration;

/// Meaning of a single key event
pub fn decode(key: &KeyEvent) -> KeyAction {
    if key.kind != KeyEventKind::Press {
        return KeyAction::None;
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => KeyAction::Cancel,
        // Raw mode swallows SIGINT
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => KeyAction::Cancel,
        _ => KeyAction::Unrecognized,
    }
}

/// Keyboard in raw mode, restored on `restore` or drop
pub struct CrosstermKeys {
    raw: bool,
}

impl CrosstermKeys {
    pub fn new() -> Result<Self> {
        enable_raw_mode().context("Failed to enable raw mode")?;
        Ok(Self { raw: true })
    }
}

impl KeySource for CrosstermKeys {
    fn has_pending(&mut self) -> bool {
        event::poll(Duration::ZERO).unwrap_or_else(|e| {
            debug!("Keyboard poll failed: {}", e);
            false
        })
    }

    fn read(&mut self) -> KeyAction {
        match event::read() {
            Ok(Event::Key(key)) => decode(&key),
            Ok(Event::Resize(..)) => KeyAction::Unrecognized,
            Ok(_) => KeyAction::None,
            Err(e) => {
                warn!("Failed to read keyboard event: {}", e);
                KeyAction::None
            }
        }
    }

    fn restore(&mut self) {
        if !self.raw {
            return;
        }
        if let Err(e) = disable_raw_mode() {
            error!("Failed to restore terminal mode: {}", e);
        }
        self.raw = false;
    }
}

impl Drop for CrosstermKeys {
    fn drop(&mut self) {
        self.restore();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn key(code: KeyCode, modifiers: KeyModifiers, kind: KeyEventKind) -> KeyEvent {
        KeyEvent {
            code,
            modifiers,
            kind,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn test_exit_keys() {
        let press = KeyEventKind::Press;
        assert_eq!(decode(&key(KeyCode::Char('q'), KeyModifiers::NONE, press)), KeyAction::Cancel);
        assert_eq!(decode(&key(KeyCode::Esc, KeyModifiers::NONE, press)), KeyAction::Cancel);
        assert_eq!(decode(&key(KeyCode::Char('c'), KeyModifiers::CONTROL, press)), KeyAction::Cancel);
    }

    #[test]
    fn test_other_keys() {
        let press = KeyEventKind::Press;
        assert_eq!(decode(&key(KeyCode::Char('c'), KeyModifiers::NONE, press)), KeyAction::Unrecognized);
        assert_eq!(decode(&key(KeyCode::F(5), KeyModifiers::NONE, press)), KeyAction::Unrecognized);
        // Releases are ignored
        assert_eq!(
            decode(&key(KeyCode::Char('q'), KeyModifiers::NONE, KeyEventKind::Release)),
            KeyAction::None
        );
    }
}
