//! Terminal player driving the session's command surface.

pub mod app;
pub mod event;
pub mod layout;

use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;

use crate::app::Result;
use crate::config::ColorConfig;
use crate::session::SessionController;
use crate::speech::SpeechEvent;

use self::app::TuiApp;
use self::event::{Action, AppEvent, EventHandler};

type Tui = Terminal<CrosstermBackend<Stdout>>;

const SPEED_STEP: f32 = 0.25;

pub async fn run(
    session: Arc<SessionController>,
    speech_events: mpsc::Receiver<SpeechEvent>,
    colors: Arc<ColorConfig>,
) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, session, speech_events, &colors).await;
    restore_terminal(&mut terminal)?;
    result
}

fn setup_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

async fn run_app(
    terminal: &mut Tui,
    session: Arc<SessionController>,
    mut speech_events: mpsc::Receiver<SpeechEvent>,
    colors: &ColorConfig,
) -> Result<()> {
    let mut tui_app = TuiApp::new();
    let event_handler = EventHandler::new(Duration::from_millis(100));

    loop {
        // Engine callbacks first, so the frame reflects them.
        while let Ok(event) = speech_events.try_recv() {
            session.handle_speech_event(event).await;
        }

        refresh(&mut tui_app, &session).await;
        terminal.draw(|frame| layout::render(frame, &mut tui_app, colors))?;

        match event_handler.next()? {
            AppEvent::Key(key) => match Action::from(key) {
                Action::Quit => {
                    session.cleanup().await;
                    tui_app.should_quit = true;
                }
                Action::PlayPause => {
                    if tui_app.playback.is_playing {
                        session.pause().await;
                    } else {
                        session.play().await;
                    }
                }
                Action::Stop => {
                    session.stop().await;
                }
                Action::Next => {
                    session.next().await;
                }
                Action::Previous => {
                    session.previous().await;
                }
                Action::SpeedUp => {
                    let response = session.set_speed(tui_app.playback.speed + SPEED_STEP).await;
                    tui_app.set_status(format!("Speed: {:.2}x", response.state.speed));
                }
                Action::SlowDown => {
                    let response = session.set_speed(tui_app.playback.speed - SPEED_STEP).await;
                    tui_app.set_status(format!("Speed: {:.2}x", response.state.speed));
                }
                Action::ToggleVoices => {
                    let enabled = !tui_app.playback.rotate_voices;
                    session.toggle_unique_voices(enabled).await;
                    tui_app.set_status(if enabled {
                        "Voice rotation on".to_string()
                    } else {
                        "Voice rotation off".to_string()
                    });
                }
                Action::OpenInBrowser => {
                    if let Some(permalink) = tui_app.active_permalink() {
                        let url = absolute_permalink(permalink);
                        if let Err(e) = open::that(&url) {
                            tui_app.set_status(format!("Failed to open browser: {}", e));
                        }
                    }
                }
                Action::StopExtraction => {
                    let response = session.stop_extraction();
                    if response.stopped {
                        tui_app.set_status("Stopping extraction...".to_string());
                    }
                }
                Action::None => {}
            },
            AppEvent::Tick => {}
        }

        if tui_app.should_quit {
            break;
        }
    }

    Ok(())
}

async fn refresh(tui_app: &mut TuiApp, session: &SessionController) {
    let state = session.get_state().await;
    let progress = session.get_extraction_progress();

    if state.playback.queue_length != tui_app.items.len() {
        tui_app.items = session.queue_items().await;
    }

    tui_app.update(state, progress);
}

fn absolute_permalink(permalink: &str) -> String {
    if permalink.starts_with("http://") || permalink.starts_with("https://") {
        permalink.to_string()
    } else {
        format!("https://www.reddit.com{}", permalink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_permalink() {
        assert_eq!(
            absolute_permalink("/r/rust/comments/x/y"),
            "https://www.reddit.com/r/rust/comments/x/y"
        );
        assert_eq!(
            absolute_permalink("https://example.com/z"),
            "https://example.com/z"
        );
    }
}
