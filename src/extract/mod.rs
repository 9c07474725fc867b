//! One-shot conversion of a document snapshot into comment records.

pub mod sanitize;

use tracing::debug;

use crate::domain::CommentRecord;
use crate::probe::ThreadSnapshot;

/// Result of a single extraction pass.
#[derive(Debug, Clone, Default)]
pub struct ExtractedThread {
    pub title: Option<String>,
    pub body: Option<String>,
    pub comments: Vec<CommentRecord>,
    /// Comments skipped by the author filter (counted, never recorded).
    pub filtered: usize,
}

#[derive(Clone)]
pub struct Extractor;

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor {
    pub fn new() -> Self {
        Self
    }

    /// Walk the snapshot once, in document order.
    ///
    /// Filtered authors and empty sanitized text never produce a record;
    /// comments without a source id get a positional synthetic one.
    pub fn extract(&self, snapshot: &ThreadSnapshot) -> ExtractedThread {
        let title = snapshot
            .title
            .as_deref()
            .map(sanitize::strip_links)
            .filter(|t| !t.is_empty());
        let body = snapshot
            .body
            .as_deref()
            .map(sanitize::strip_links)
            .filter(|b| !b.is_empty());

        let mut comments = Vec::with_capacity(snapshot.comments.len());
        let mut filtered = 0;

        for raw in &snapshot.comments {
            if sanitize::is_filtered_author(raw.author.as_deref()) {
                filtered += 1;
                continue;
            }

            let text = sanitize::strip_links(&raw.text);
            if text.is_empty() {
                continue;
            }

            let id = match raw.thing_id.as_deref().filter(|id| !id.is_empty()) {
                Some(id) => id.to_string(),
                None => CommentRecord::synthetic_id(comments.len()),
            };

            comments.push(CommentRecord {
                id,
                text,
                author: raw.author.clone(),
                depth: raw.depth,
                permalink: raw.permalink.clone().unwrap_or_default(),
            });
        }

        debug!(
            "Extracted {} comments ({} filtered, {} raw)",
            comments.len(),
            filtered,
            snapshot.comments.len()
        );

        ExtractedThread {
            title,
            body,
            comments,
            filtered,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::RawComment;

    fn raw(author: Option<&str>, text: &str) -> RawComment {
        RawComment {
            thing_id: None,
            author: author.map(String::from),
            depth: 0,
            permalink: None,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_filtered_author_skipped_and_counted() {
        let snapshot = ThreadSnapshot {
            title: None,
            body: None,
            comments: vec![
                raw(Some("alice"), "first"),
                raw(Some("AutoModerator"), "I am a bot"),
                raw(Some("bob"), "second"),
            ],
        };

        let thread = Extractor::new().extract(&snapshot);

        assert_eq!(thread.comments.len(), 2);
        assert_eq!(thread.filtered, 1);
        assert_eq!(thread.comments[0].text, "first");
        assert_eq!(thread.comments[1].text, "second");
    }

    #[test]
    fn test_empty_sanitized_text_skipped() {
        let snapshot = ThreadSnapshot {
            title: None,
            body: None,
            comments: vec![raw(Some("alice"), "https://example.com"), raw(Some("bob"), "ok")],
        };

        let thread = Extractor::new().extract(&snapshot);

        assert_eq!(thread.comments.len(), 1);
        assert_eq!(thread.filtered, 0);
        assert_eq!(thread.comments[0].text, "ok");
    }

    #[test]
    fn test_synthetic_ids_follow_emission_order() {
        let snapshot = ThreadSnapshot {
            title: None,
            body: None,
            comments: vec![
                raw(Some("alice"), "a"),
                raw(Some("mod_team"), "removed"),
                raw(Some("bob"), "b"),
            ],
        };

        let thread = Extractor::new().extract(&snapshot);

        // The filtered comment shifts later synthetic ids; accepted gap.
        assert_eq!(thread.comments[0].id, "comment-0");
        assert_eq!(thread.comments[1].id, "comment-1");
    }

    #[test]
    fn test_source_id_preferred_over_synthetic() {
        let mut comment = raw(Some("alice"), "hello");
        comment.thing_id = Some("t1_abc".into());
        let snapshot = ThreadSnapshot {
            title: None,
            body: None,
            comments: vec![comment],
        };

        let thread = Extractor::new().extract(&snapshot);
        assert_eq!(thread.comments[0].id, "t1_abc");
    }

    #[test]
    fn test_title_and_body_sanitized() {
        let snapshot = ThreadSnapshot {
            title: Some("Look at [this](https://x.com)".into()),
            body: Some("   ".into()),
            comments: vec![],
        };

        let thread = Extractor::new().extract(&snapshot);

        assert_eq!(thread.title.as_deref(), Some("Look at this"));
        assert_eq!(thread.body, None);
    }

    #[test]
    fn test_anonymous_author_not_filtered() {
        let snapshot = ThreadSnapshot {
            title: None,
            body: None,
            comments: vec![raw(None, "ghost comment")],
        };

        let thread = Extractor::new().extract(&snapshot);
        assert_eq!(thread.comments.len(), 1);
        assert_eq!(thread.comments[0].author, None);
    }
}
