use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::app::{MurmurError, Result};
use crate::speech::voices::parse_voice_listing;
use crate::speech::{SpeechEngine, SpeechEvent, Utterance, UtteranceId, Voice};

/// espeak's default speaking rate in words per minute.
const DEFAULT_WPM: f32 = 175.0;

/// Process-backed speech engine speaking through `espeak` (or a compatible
/// program named in the config).
///
/// One synthesizer process runs at a time; a watcher task reports its exit
/// as a [`SpeechEvent`]. Events for utterances that were cancelled before
/// the process exited are swallowed here, and the sequencer drops any that
/// slip through by utterance identity.
pub struct EspeakEngine {
    program: String,
    events: mpsc::Sender<SpeechEvent>,
    current: Arc<Mutex<Option<ActiveUtterance>>>,
    speaking: Arc<AtomicBool>,
    paused: Arc<AtomicBool>,
}

#[derive(Debug, Clone, Copy)]
struct ActiveUtterance {
    id: UtteranceId,
    pid: u32,
}

impl EspeakEngine {
    /// Create the engine and the receiver its events arrive on.
    pub fn new(program: &str) -> (Self, mpsc::Receiver<SpeechEvent>) {
        let (tx, rx) = mpsc::channel(16);
        let engine = Self {
            program: program.to_string(),
            events: tx,
            current: Arc::new(Mutex::new(None)),
            speaking: Arc::new(AtomicBool::new(false)),
            paused: Arc::new(AtomicBool::new(false)),
        };
        (engine, rx)
    }

    fn take_current(&self) -> Option<ActiveUtterance> {
        self.current.lock().ok().and_then(|mut slot| slot.take())
    }

    fn peek_current(&self) -> Option<ActiveUtterance> {
        self.current.lock().ok().and_then(|slot| *slot)
    }
}

#[async_trait]
impl SpeechEngine for EspeakEngine {
    async fn speak(&self, utterance: Utterance) -> Result<()> {
        self.cancel().await?;

        let wpm = (DEFAULT_WPM * utterance.rate).clamp(80.0, 450.0) as u32;
        let voice = utterance
            .voice
            .clone()
            .unwrap_or_else(|| utterance.locale.clone());

        let mut child = Command::new(&self.program)
            .arg("-s")
            .arg(wpm.to_string())
            .arg("-v")
            .arg(&voice)
            .arg("--")
            .arg(&utterance.text)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| MurmurError::Speech(format!("Failed to start {}: {}", self.program, e)))?;

        let pid = child.id().ok_or_else(|| {
            MurmurError::Speech(format!("{} exited before it could be tracked", self.program))
        })?;

        if let Ok(mut slot) = self.current.lock() {
            *slot = Some(ActiveUtterance {
                id: utterance.id,
                pid,
            });
        }
        self.speaking.store(true, Ordering::SeqCst);
        self.paused.store(false, Ordering::SeqCst);

        debug!(id = utterance.id.0, pid, wpm, voice = %voice, "Utterance started");

        let current = self.current.clone();
        let speaking = self.speaking.clone();
        let paused = self.paused.clone();
        let events = self.events.clone();
        let id = utterance.id;

        tokio::spawn(async move {
            let status = child.wait().await;

            // Only the utterance that is still current gets to report;
            // a cancelled one was already superseded.
            let still_current = {
                match current.lock() {
                    Ok(mut slot) => match *slot {
                        Some(active) if active.id == id => {
                            *slot = None;
                            true
                        }
                        _ => false,
                    },
                    Err(_) => false,
                }
            };
            if !still_current {
                return;
            }

            speaking.store(false, Ordering::SeqCst);
            paused.store(false, Ordering::SeqCst);

            let event = match status {
                Ok(status) if status.success() => SpeechEvent::Finished(id),
                Ok(status) => SpeechEvent::Error(id, format!("synthesizer exited with {}", status)),
                Err(e) => SpeechEvent::Error(id, e.to_string()),
            };
            if events.send(event).await.is_err() {
                warn!("Speech event receiver dropped");
            }
        });

        Ok(())
    }

    async fn pause(&self) -> Result<()> {
        let Some(active) = self.peek_current() else {
            return Ok(());
        };
        signal_process(active.pid, "-STOP")?;
        self.paused.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn resume(&self) -> Result<()> {
        let Some(active) = self.peek_current() else {
            return Ok(());
        };
        signal_process(active.pid, "-CONT")?;
        self.paused.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn cancel(&self) -> Result<()> {
        if let Some(active) = self.take_current() {
            // A stopped process ignores SIGTERM until it runs again.
            let _ = signal_process(active.pid, "-CONT");
            let _ = signal_process(active.pid, "-TERM");
            debug!(id = active.id.0, pid = active.pid, "Utterance cancelled");
        }
        self.speaking.store(false, Ordering::SeqCst);
        self.paused.store(false, Ordering::SeqCst);
        Ok(())
    }

    // A separate process cannot be retuned mid-utterance; the sequencer
    // carries the rate on every submitted utterance instead.
    fn set_rate(&self, _rate: f32) {}

    fn is_speaking(&self) -> bool {
        self.speaking.load(Ordering::SeqCst)
    }

    fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    async fn available_voices(&self, locale: Option<&str>) -> Result<Vec<Voice>> {
        let arg = match locale {
            Some(locale) => format!("--voices={}", locale),
            None => "--voices".to_string(),
        };

        let output = Command::new(&self.program)
            .arg(arg)
            .output()
            .await
            .map_err(|e| MurmurError::Speech(format!("Failed to run {}: {}", self.program, e)))?;

        if !output.status.success() {
            return Err(MurmurError::Speech(format!(
                "{} --voices exited with {}",
                self.program, output.status
            )));
        }

        Ok(parse_voice_listing(&String::from_utf8_lossy(&output.stdout)))
    }
}

#[cfg(unix)]
fn signal_process(pid: u32, signal: &str) -> Result<()> {
    use std::process::Command;
    let status = Command::new("kill")
        .args([signal, &pid.to_string()])
        .status()
        .map_err(|e| MurmurError::Speech(format!("Failed to signal synthesizer: {}", e)))?;
    if status.success() {
        Ok(())
    } else {
        Err(MurmurError::Speech(format!(
            "kill {} {} failed",
            signal, pid
        )))
    }
}

#[cfg(not(unix))]
fn signal_process(pid: u32, signal: &str) -> Result<()> {
    if signal == "-TERM" {
        use std::process::Command;
        let status = Command::new("taskkill")
            .args(["/PID", &pid.to_string(), "/F"])
            .status()
            .map_err(|e| MurmurError::Speech(format!("Failed to stop synthesizer: {}", e)))?;
        if status.success() {
            return Ok(());
        }
        return Err(MurmurError::Speech(format!("taskkill {} failed", pid)));
    }
    Err(MurmurError::Speech(
        "pause/resume is not supported on this platform".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wpm_mapping_clamps() {
        let wpm = |rate: f32| (DEFAULT_WPM * rate).clamp(80.0, 450.0) as u32;
        assert_eq!(wpm(1.0), 175);
        assert_eq!(wpm(0.5), 87);
        assert_eq!(wpm(2.0), 350);
        assert_eq!(wpm(0.1), 80);
        assert_eq!(wpm(10.0), 450);
    }
}
