//! Read and mutate the live thread document.
//!
//! The rest of the crate never touches the browser directly: expansion and
//! extraction depend on the [`DocumentProbe`] trait, the sequencer's visual
//! side effect on [`Highlighter`]. [`ChromeProbe`] implements both over one
//! chromiumoxide page; tests substitute a deterministic in-memory tree.

mod chrome;
mod config;
mod scripts;

#[cfg(test)]
pub mod fake;

pub use chrome::ChromeProbe;
pub use config::ProbeConfig;

use async_trait::async_trait;
use serde::Deserialize;

use crate::app::Result;

/// Node counts observed in the current document state.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ThreadCounts {
    pub total: usize,
    #[serde(rename = "topLevel")]
    pub top_level: usize,
}

/// One visible disclosure control ("more replies" style element).
///
/// `ordinal` is the control's position in the probe's enumeration order and
/// is only meaningful until the next document mutation.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct DisclosureControl {
    pub ordinal: usize,
    #[serde(rename = "effectiveDepth")]
    pub effective_depth: u32,
}

/// One comment node as read from the document, before any filtering.
#[derive(Debug, Clone, Deserialize)]
pub struct RawComment {
    #[serde(rename = "thingId")]
    pub thing_id: Option<String>,
    pub author: Option<String>,
    #[serde(default)]
    pub depth: u32,
    pub permalink: Option<String>,
    #[serde(default)]
    pub text: String,
}

/// One-shot read of the whole thread in document order.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ThreadSnapshot {
    pub title: Option<String>,
    pub body: Option<String>,
    #[serde(default)]
    pub comments: Vec<RawComment>,
}

/// What the highlight should track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HighlightTarget {
    /// The post itself (title or body items).
    Post,
    /// A comment, addressed by its record id.
    Comment(String),
}

/// Queries and reveals over the live hierarchical document.
///
/// `reveal` is fire-and-forget: its effect (new nodes appearing) is only
/// observable by re-querying after the document has settled.
#[async_trait]
pub trait DocumentProbe: Send + Sync {
    async fn counts(&self) -> Result<ThreadCounts>;

    async fn disclosure_controls(&self) -> Result<Vec<DisclosureControl>>;

    async fn reveal(&self, controls: &[DisclosureControl]) -> Result<()>;

    async fn snapshot(&self) -> Result<ThreadSnapshot>;
}

/// Side-effect sink keeping the page in step with the spoken item.
#[async_trait]
pub trait Highlighter: Send + Sync {
    async fn set_active(&self, target: &HighlightTarget) -> Result<()>;

    async fn clear(&self) -> Result<()>;
}
