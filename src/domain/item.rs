use serde::{Deserialize, Serialize};

use crate::domain::CommentRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Title,
    Body,
    Comment,
}

/// One speakable unit in the playback queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentItem {
    pub kind: ItemKind,
    pub text: String,
    pub author: Option<String>,
    pub depth: Option<u32>,
    pub source_id: Option<String>,
}

impl ContentItem {
    pub fn title(text: String) -> Self {
        Self {
            kind: ItemKind::Title,
            text,
            author: None,
            depth: None,
            source_id: None,
        }
    }

    pub fn body(text: String) -> Self {
        Self {
            kind: ItemKind::Body,
            text,
            author: None,
            depth: None,
            source_id: None,
        }
    }

    pub fn comment(record: &CommentRecord) -> Self {
        Self {
            kind: ItemKind::Comment,
            text: record.text.clone(),
            author: record.author.clone(),
            depth: Some(record.depth),
            source_id: Some(record.id.clone()),
        }
    }

    pub fn display_label(&self) -> String {
        match self.kind {
            ItemKind::Title => "Title".to_string(),
            ItemKind::Body => "Post".to_string(),
            ItemKind::Comment => self
                .author
                .clone()
                .unwrap_or_else(|| "(unknown)".to_string()),
        }
    }
}

/// Build the playback queue: title, then body, then comments in
/// extraction order (document order is already a valid reading order).
pub fn build_queue(
    title: Option<&str>,
    body: Option<&str>,
    comments: &[CommentRecord],
) -> Vec<ContentItem> {
    let mut queue = Vec::with_capacity(comments.len() + 2);

    if let Some(title) = title {
        queue.push(ContentItem::title(title.to_string()));
    }
    if let Some(body) = body {
        queue.push(ContentItem::body(body.to_string()));
    }
    for record in comments {
        queue.push(ContentItem::comment(record));
    }

    queue
}
