//! Deterministic in-memory document tree for tests.
//!
//! Models hidden subtrees behind disclosure controls so the expansion loop
//! can be exercised without a browser: revealing a control removes it,
//! appends its hidden nodes, and may surface follow-up controls.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::app::Result;
use crate::probe::{
    DisclosureControl, DocumentProbe, HighlightTarget, Highlighter, RawComment, ThreadCounts,
    ThreadSnapshot,
};

#[derive(Debug, Clone)]
pub struct FakeNode {
    pub depth: u32,
    pub author: Option<String>,
    pub text: String,
    pub thing_id: Option<String>,
}

impl FakeNode {
    pub fn at_depth(depth: u32) -> Self {
        Self {
            depth,
            author: Some("someone".into()),
            text: format!("comment at depth {}", depth),
            thing_id: None,
        }
    }

    pub fn with_author(mut self, author: &str) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.thing_id = Some(id.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct FakeControl {
    pub effective_depth: u32,
    pub yields: Vec<FakeNode>,
    pub follow_up: Vec<FakeControl>,
}

impl FakeControl {
    /// A control that reveals `count` nodes one level below itself.
    pub fn yielding(effective_depth: u32, count: usize) -> Self {
        Self {
            effective_depth,
            yields: (0..count).map(|_| FakeNode::at_depth(effective_depth)).collect(),
            follow_up: Vec::new(),
        }
    }

    pub fn then(mut self, follow_up: FakeControl) -> Self {
        self.follow_up.push(follow_up);
        self
    }
}

#[derive(Debug, Default)]
struct FakeState {
    title: Option<String>,
    body: Option<String>,
    nodes: Vec<FakeNode>,
    controls: Vec<FakeControl>,
    highlights: Vec<Option<HighlightTarget>>,
    reveals: usize,
}

pub struct FakeProbe {
    state: Mutex<FakeState>,
}

impl FakeProbe {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(FakeState::default()),
        }
    }

    pub fn with_title(self, title: &str) -> Self {
        self.state.lock().unwrap().title = Some(title.into());
        self
    }

    pub fn with_body(self, body: &str) -> Self {
        self.state.lock().unwrap().body = Some(body.into());
        self
    }

    pub fn with_nodes(self, nodes: Vec<FakeNode>) -> Self {
        self.state.lock().unwrap().nodes = nodes;
        self
    }

    pub fn with_controls(self, controls: Vec<FakeControl>) -> Self {
        self.state.lock().unwrap().controls = controls;
        self
    }

    /// Number of reveal invocations so far.
    pub fn reveal_count(&self) -> usize {
        self.state.lock().unwrap().reveals
    }

    /// Every highlight transition observed, `None` meaning a clear.
    pub fn highlight_log(&self) -> Vec<Option<HighlightTarget>> {
        self.state.lock().unwrap().highlights.clone()
    }
}

impl Default for FakeProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentProbe for FakeProbe {
    async fn counts(&self) -> Result<ThreadCounts> {
        let state = self.state.lock().unwrap();
        Ok(ThreadCounts {
            total: state.nodes.len(),
            top_level: state.nodes.iter().filter(|n| n.depth == 0).count(),
        })
    }

    async fn disclosure_controls(&self) -> Result<Vec<DisclosureControl>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .controls
            .iter()
            .enumerate()
            .map(|(ordinal, c)| DisclosureControl {
                ordinal,
                effective_depth: c.effective_depth,
            })
            .collect())
    }

    async fn reveal(&self, controls: &[DisclosureControl]) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.reveals += 1;

        // Remove back-to-front so earlier ordinals stay valid.
        let mut ordinals: Vec<usize> = controls.iter().map(|c| c.ordinal).collect();
        ordinals.sort_unstable();
        ordinals.dedup();

        for ordinal in ordinals.into_iter().rev() {
            if ordinal >= state.controls.len() {
                continue;
            }
            let control = state.controls.remove(ordinal);
            state.nodes.extend(control.yields);
            state.controls.extend(control.follow_up);
        }

        Ok(())
    }

    async fn snapshot(&self) -> Result<ThreadSnapshot> {
        let state = self.state.lock().unwrap();
        Ok(ThreadSnapshot {
            title: state.title.clone(),
            body: state.body.clone(),
            comments: state
                .nodes
                .iter()
                .map(|n| RawComment {
                    thing_id: n.thing_id.clone(),
                    author: n.author.clone(),
                    depth: n.depth,
                    permalink: None,
                    text: n.text.clone(),
                })
                .collect(),
        })
    }
}

#[async_trait]
impl Highlighter for FakeProbe {
    async fn set_active(&self, target: &HighlightTarget) -> Result<()> {
        self.state.lock().unwrap().highlights.push(Some(target.clone()));
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.state.lock().unwrap().highlights.push(None);
        Ok(())
    }
}
