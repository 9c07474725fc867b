//! Text-to-speech capability boundary.
//!
//! The sequencer drives an opaque engine through [`SpeechEngine`];
//! completion and errors come back asynchronously as [`SpeechEvent`]s on
//! an mpsc channel, tagged with the utterance identity so late events for
//! superseded utterances can be recognized and dropped.

mod espeak;
pub mod voices;

#[cfg(test)]
pub mod fake;

pub use espeak::EspeakEngine;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::app::Result;

/// Identity of one submitted utterance.
///
/// Allocated monotonically by the sequencer; never reused within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UtteranceId(pub u64);

/// One voice the engine can speak with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voice {
    pub id: String,
    pub locale: String,
}

/// One discrete unit of speech work.
#[derive(Debug, Clone)]
pub struct Utterance {
    pub id: UtteranceId,
    pub text: String,
    pub rate: f32,
    pub voice: Option<String>,
    pub locale: String,
}

/// Asynchronous outcome of a submitted utterance.
#[derive(Debug, Clone)]
pub enum SpeechEvent {
    /// The utterance finished naturally.
    Finished(UtteranceId),
    /// The engine failed mid-utterance; no retry is attempted.
    Error(UtteranceId, String),
}

/// An external speech synthesizer.
///
/// `speak` returns as soon as the utterance is submitted; completion
/// arrives later as a [`SpeechEvent`]. `cancel` must be safe to call with
/// nothing in flight.
#[async_trait]
pub trait SpeechEngine: Send + Sync {
    async fn speak(&self, utterance: Utterance) -> Result<()>;

    async fn pause(&self) -> Result<()>;

    async fn resume(&self) -> Result<()>;

    async fn cancel(&self) -> Result<()>;

    /// Applied to the next utterance; engines that can retune an in-flight
    /// utterance do so immediately.
    fn set_rate(&self, rate: f32);

    fn is_speaking(&self) -> bool;

    fn is_paused(&self) -> bool;

    /// Voices available for the given locale prefix, or all voices.
    async fn available_voices(&self, locale: Option<&str>) -> Result<Vec<Voice>>;
}
