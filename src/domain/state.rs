use serde::Serialize;

/// Read-only snapshot of the sequencer's transport state.
///
/// Handed out to external callers; mutating it has no effect on playback.
#[derive(Debug, Clone, Serialize)]
pub struct PlaybackState {
    pub cursor: usize,
    pub queue_length: usize,
    pub speed: f32,
    pub is_playing: bool,
    pub is_paused: bool,
    pub rotate_voices: bool,
}

impl PlaybackState {
    pub fn idle() -> Self {
        Self {
            cursor: 0,
            queue_length: 0,
            speed: 1.0,
            is_playing: false,
            is_paused: false,
            rotate_voices: true,
        }
    }
}
