//! Linear playback over the extracted item queue.
//!
//! One utterance is ever in flight. Transport operations cancel the
//! current utterance synchronously before starting another, so a late
//! engine callback can only belong to a superseded utterance, and those
//! are recognized by identity and dropped.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::app::Result;
use crate::domain::{ContentItem, ItemKind, PlaybackState};
use crate::probe::{HighlightTarget, Highlighter};
use crate::speech::{voices, SpeechEngine, SpeechEvent, Utterance, UtteranceId, Voice};

/// Gap between an utterance finishing and the next one starting, letting
/// the engine release its resources.
pub const ADVANCE_GAP: Duration = Duration::from_millis(100);

const MIN_SPEED: f32 = 0.5;
const MAX_SPEED: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Speaking,
    Paused,
    /// Queue exhausted; `play` restarts from the top.
    Finished,
}

pub struct Sequencer {
    engine: Arc<dyn SpeechEngine>,
    highlighter: Arc<dyn Highlighter>,
    queue: Vec<ContentItem>,
    cursor: usize,
    speed: f32,
    locale: String,
    pool: Vec<Voice>,
    allowlist: Vec<String>,
    rotate: bool,
    phase: Phase,
    current: Option<UtteranceId>,
    next_id: u64,
}

impl Sequencer {
    pub fn new(engine: Arc<dyn SpeechEngine>, highlighter: Arc<dyn Highlighter>) -> Self {
        Self {
            engine,
            highlighter,
            queue: Vec::new(),
            cursor: 0,
            speed: 1.0,
            locale: "en".to_string(),
            pool: Vec::new(),
            allowlist: Vec::new(),
            rotate: true,
            phase: Phase::Idle,
            current: None,
            next_id: 0,
        }
    }

    pub fn set_voice_pool(&mut self, pool: Vec<Voice>) {
        self.pool = pool;
    }

    pub fn set_allowlist(&mut self, allowlist: Vec<String>) {
        self.allowlist = allowlist;
    }

    pub fn set_locale(&mut self, locale: &str) {
        self.locale = locale.to_string();
    }

    pub fn set_rotate(&mut self, rotate: bool) {
        self.rotate = rotate;
    }

    pub fn items(&self) -> &[ContentItem] {
        &self.queue
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn current_item(&self) -> Option<&ContentItem> {
        self.queue.get(self.cursor)
    }

    /// Replace the queue. Does not auto-play.
    pub async fn load(&mut self, queue: Vec<ContentItem>) -> Result<()> {
        self.engine.cancel().await?;
        self.current = None;
        self.queue = queue;
        self.cursor = 0;
        self.phase = Phase::Idle;
        self.highlighter.clear().await?;
        Ok(())
    }

    /// Resume if the engine is paused, start the cursor item if it is idle,
    /// no-op if it is already speaking.
    pub async fn play(&mut self) -> Result<()> {
        if self.queue.is_empty() {
            return Ok(());
        }
        if self.engine.is_paused() {
            self.engine.resume().await?;
            self.phase = Phase::Speaking;
            return Ok(());
        }
        if self.engine.is_speaking() {
            return Ok(());
        }
        if self.phase == Phase::Finished {
            self.cursor = 0;
        }
        self.speak_current().await
    }

    /// Suspend the current utterance in place. Only valid while speaking.
    pub async fn pause(&mut self) -> Result<()> {
        if self.phase != Phase::Speaking || !self.engine.is_speaking() {
            return Ok(());
        }
        self.engine.pause().await?;
        self.phase = Phase::Paused;
        Ok(())
    }

    /// Cancel playback, rewind to the first item and drop the highlight.
    pub async fn stop(&mut self) -> Result<()> {
        self.engine.cancel().await?;
        self.current = None;
        self.cursor = 0;
        self.phase = Phase::Idle;
        self.highlighter.clear().await?;
        Ok(())
    }

    /// Advance one item. At the last index playback stops instead of
    /// wrapping; the cursor stays put.
    pub async fn next(&mut self) -> Result<()> {
        self.engine.cancel().await?;
        self.current = None;

        if self.cursor + 1 >= self.queue.len() {
            self.phase = Phase::Idle;
            self.highlighter.clear().await?;
            return Ok(());
        }
        self.cursor += 1;
        self.speak_current().await
    }

    /// Step one item back. At index 0 the first item is re-spoken.
    pub async fn previous(&mut self) -> Result<()> {
        self.engine.cancel().await?;
        self.current = None;

        if self.queue.is_empty() {
            self.phase = Phase::Idle;
            return Ok(());
        }
        self.cursor = self.cursor.saturating_sub(1);
        self.speak_current().await
    }

    /// Clamp to [0.5, 2.0] and apply to in-flight and future utterances.
    pub fn set_speed(&mut self, speed: f32) -> f32 {
        self.speed = speed.clamp(MIN_SPEED, MAX_SPEED);
        self.engine.set_rate(self.speed);
        self.speed
    }

    /// Feed an engine event back into the state machine.
    ///
    /// Events are matched against the live utterance identity, not the
    /// cursor; anything stale is dropped without side effects.
    pub async fn handle_event(&mut self, event: SpeechEvent) -> Result<()> {
        match event {
            SpeechEvent::Finished(id) => {
                if self.current != Some(id) {
                    debug!(id = id.0, "Dropping stale completion");
                    return Ok(());
                }
                self.current = None;

                if self.cursor + 1 < self.queue.len() {
                    tokio::time::sleep(ADVANCE_GAP).await;
                    self.cursor += 1;
                    self.speak_current().await
                } else {
                    self.phase = Phase::Finished;
                    self.highlighter.clear().await
                }
            }
            SpeechEvent::Error(id, message) => {
                if self.current != Some(id) {
                    debug!(id = id.0, "Dropping stale error");
                    return Ok(());
                }
                warn!(id = id.0, %message, "Utterance failed; playback idle");
                self.current = None;
                self.phase = Phase::Idle;
                Ok(())
            }
        }
    }

    pub fn snapshot(&self) -> PlaybackState {
        PlaybackState {
            cursor: self.cursor,
            queue_length: self.queue.len(),
            speed: self.speed,
            is_playing: self.phase == Phase::Speaking,
            is_paused: self.phase == Phase::Paused,
            rotate_voices: self.rotate,
        }
    }

    /// Voice resolution, then the highlight, then the utterance, in that
    /// order, so the visual never lags the audio.
    async fn speak_current(&mut self) -> Result<()> {
        let Some(item) = self.queue.get(self.cursor) else {
            self.phase = Phase::Idle;
            return Ok(());
        };

        let voice = voices::voice_for(self.cursor, &self.pool, &self.allowlist, self.rotate);

        let target = match (&item.kind, &item.source_id) {
            (ItemKind::Comment, Some(id)) => HighlightTarget::Comment(id.clone()),
            _ => HighlightTarget::Post,
        };
        self.highlighter.set_active(&target).await?;

        self.next_id += 1;
        let id = UtteranceId(self.next_id);
        let utterance = Utterance {
            id,
            text: item.text.clone(),
            rate: self.speed,
            voice,
            locale: self.locale.clone(),
        };

        self.current = Some(id);
        self.engine.speak(utterance).await?;
        self.phase = Phase::Speaking;
        Ok(())
    }
}
