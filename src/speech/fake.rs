//! Recording speech engine for tests; never speaks, never emits events on
//! its own. Tests feed [`SpeechEvent`]s to the sequencer directly.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::app::Result;
use crate::speech::{SpeechEngine, Utterance, UtteranceId, Voice};

#[derive(Default)]
pub struct FakeEngine {
    spoken: Mutex<Vec<Utterance>>,
    rates: Mutex<Vec<f32>>,
    voices: Vec<Voice>,
    speaking: AtomicBool,
    paused: AtomicBool,
    cancels: AtomicUsize,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_voices(mut self, voices: Vec<Voice>) -> Self {
        self.voices = voices;
        self
    }

    pub fn spoken(&self) -> Vec<Utterance> {
        self.spoken.lock().unwrap().clone()
    }

    pub fn last_spoken(&self) -> Option<Utterance> {
        self.spoken.lock().unwrap().last().cloned()
    }

    pub fn last_spoken_id(&self) -> Option<UtteranceId> {
        self.last_spoken().map(|u| u.id)
    }

    pub fn rates(&self) -> Vec<f32> {
        self.rates.lock().unwrap().clone()
    }

    pub fn cancel_count(&self) -> usize {
        self.cancels.load(Ordering::SeqCst)
    }

    /// Simulate the engine finishing its current utterance.
    pub fn settle(&self) {
        self.speaking.store(false, Ordering::SeqCst);
        self.paused.store(false, Ordering::SeqCst);
    }
}

#[async_trait]
impl SpeechEngine for FakeEngine {
    async fn speak(&self, utterance: Utterance) -> Result<()> {
        self.spoken.lock().unwrap().push(utterance);
        self.speaking.store(true, Ordering::SeqCst);
        self.paused.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn pause(&self) -> Result<()> {
        if self.speaking.load(Ordering::SeqCst) {
            self.paused.store(true, Ordering::SeqCst);
        }
        Ok(())
    }

    async fn resume(&self) -> Result<()> {
        self.paused.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn cancel(&self) -> Result<()> {
        self.cancels.fetch_add(1, Ordering::SeqCst);
        self.speaking.store(false, Ordering::SeqCst);
        self.paused.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn set_rate(&self, rate: f32) {
        self.rates.lock().unwrap().push(rate);
    }

    fn is_speaking(&self) -> bool {
        self.speaking.load(Ordering::SeqCst)
    }

    fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    async fn available_voices(&self, locale: Option<&str>) -> Result<Vec<Voice>> {
        Ok(match locale {
            Some(prefix) => self
                .voices
                .iter()
                .filter(|v| v.locale.starts_with(prefix))
                .cloned()
                .collect(),
            None => self.voices.clone(),
        })
    }
}
