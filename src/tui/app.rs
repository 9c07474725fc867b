use ratatui::widgets::ListState;

use crate::domain::{CommentRecord, ContentItem, PlaybackState};
use crate::session::{ProgressResponse, StateResponse};

/// Host-side view state for the player.
///
/// Everything here is a cached snapshot; the session owns the truth.
pub struct TuiApp {
    pub items: Vec<ContentItem>,
    pub playback: PlaybackState,
    pub comments: Vec<CommentRecord>,
    pub title: Option<String>,
    pub is_extracting: bool,
    pub progress: f32,
    pub status_message: Option<String>,
    pub should_quit: bool,
    pub list_state: ListState,
}

impl TuiApp {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            playback: PlaybackState::idle(),
            comments: Vec::new(),
            title: None,
            is_extracting: false,
            progress: 0.0,
            status_message: None,
            should_quit: false,
            list_state: ListState::default(),
        }
    }

    /// Absorb fresh session snapshots; the list selection follows the
    /// play cursor.
    pub fn update(&mut self, state: StateResponse, progress: ProgressResponse) {
        self.playback = state.playback;
        self.comments = state.comments;
        self.title = state.title;
        self.is_extracting = progress.is_extracting;
        self.progress = progress.progress;

        if self.items.is_empty() {
            self.list_state.select(None);
        } else {
            self.list_state
                .select(Some(self.playback.cursor.min(self.items.len() - 1)));
        }
    }

    /// Permalink of the item under the cursor, when it has one.
    pub fn active_permalink(&self) -> Option<&str> {
        let item = self.items.get(self.playback.cursor)?;
        let source_id = item.source_id.as_deref()?;
        self.comments
            .iter()
            .find(|c| c.id == source_id)
            .map(|c| c.permalink.as_str())
            .filter(|p| !p.is_empty())
    }

    pub fn set_status(&mut self, message: String) {
        self.status_message = Some(message);
    }
}

impl Default for TuiApp {
    fn default() -> Self {
        Self::new()
    }
}
