use serde::{Deserialize, Serialize};

/// One extracted comment, immutable after construction.
///
/// Records are never built for filtered authors or empty text; the
/// extractor enforces both before constructing one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentRecord {
    pub id: String,
    pub text: String,
    pub author: Option<String>,
    pub depth: u32,
    pub permalink: String,
}

impl CommentRecord {
    /// Synthetic identifier for comments without a source-assigned id.
    ///
    /// Positional, so it can shift between extraction passes when
    /// intervening nodes are filtered differently.
    pub fn synthetic_id(position: usize) -> String {
        format!("comment-{}", position)
    }

    pub fn display_author(&self) -> &str {
        self.author.as_deref().unwrap_or("(unknown)")
    }
}
