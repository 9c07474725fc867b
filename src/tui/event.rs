use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Duration;

use crate::app::Result;

pub enum AppEvent {
    Key(KeyEvent),
    Tick,
}

pub struct EventHandler {
    tick_rate: Duration,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        Self { tick_rate }
    }

    pub fn next(&self) -> Result<AppEvent> {
        if event::poll(self.tick_rate)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    return Ok(AppEvent::Key(key));
                }
            }
        }
        Ok(AppEvent::Tick)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    PlayPause,
    Stop,
    Next,
    Previous,
    SpeedUp,
    SlowDown,
    ToggleVoices,
    OpenInBrowser,
    StopExtraction,
    None,
}

impl From<KeyEvent> for Action {
    fn from(key: KeyEvent) -> Self {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Action::Quit,
            KeyCode::Char(' ') => Action::PlayPause,
            KeyCode::Char('s') => Action::Stop,
            KeyCode::Char('n') | KeyCode::Right => Action::Next,
            KeyCode::Char('p') | KeyCode::Left => Action::Previous,
            KeyCode::Char('+') | KeyCode::Char('=') => Action::SpeedUp,
            KeyCode::Char('-') => Action::SlowDown,
            KeyCode::Char('u') => Action::ToggleVoices,
            KeyCode::Char('o') => Action::OpenInBrowser,
            KeyCode::Char('x') => Action::StopExtraction,
            _ => Action::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_transport_keys() {
        assert_eq!(Action::from(key(KeyCode::Char(' '))), Action::PlayPause);
        assert_eq!(Action::from(key(KeyCode::Char('s'))), Action::Stop);
        assert_eq!(Action::from(key(KeyCode::Char('n'))), Action::Next);
        assert_eq!(Action::from(key(KeyCode::Left)), Action::Previous);
    }

    #[test]
    fn test_ctrl_c_quits() {
        let event = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(Action::from(event), Action::Quit);
    }

    #[test]
    fn test_unbound_key_is_none() {
        assert_eq!(Action::from(key(KeyCode::Char('z'))), Action::None);
    }
}
