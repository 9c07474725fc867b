//! # Murmur
//!
//! Reads discussion threads aloud from a terminal.
//!
//! ## Architecture
//!
//! Murmur drives a real browser to the thread page and follows a linear
//! pipeline:
//!
//! ```text
//! Probe → Expansion → Extract → Queue → Playback
//! ```
//!
//! - [`probe`]: queries and reveals over the live page via chromiumoxide
//! - [`expansion`]: budget-bounded reveal loop for hidden comment subtrees
//! - [`extract`]: one-shot snapshot walk into immutable comment records
//! - [`playback`]: item-at-a-time sequencer over the speech engine
//! - [`session`]: command surface tying it all together for a host
//!
//! ## Quick Start
//!
//! ```bash
//! # Read a thread aloud in the TUI player
//! murmur read https://www.reddit.com/r/rust/comments/...
//!
//! # Extract without playing
//! murmur extract --json https://www.reddit.com/r/rust/comments/...
//!
//! # See which voices the synthesizer offers
//! murmur voices --locale en
//! ```

/// Application context and error types.
pub mod app;

/// Command-line interface using clap.
///
/// - `read <url>` - Open a thread and play it in the TUI
/// - `extract <url>` - One-shot extraction, human or JSON output
/// - `voices` - List the speech engine's voices
pub mod cli;

/// Configuration management.
///
/// Loads from `~/.config/murmur/config.toml`: expansion budgets, speech
/// engine settings, probe selectors and TUI colors.
pub mod config;

/// Core domain models.
///
/// - [`CommentRecord`](domain::CommentRecord): one extracted comment
/// - [`ContentItem`](domain::ContentItem): one speakable queue entry
/// - [`PlaybackState`](domain::PlaybackState): transport snapshot
pub mod domain;

/// Budget-bounded expansion of hidden comment subtrees.
///
/// - [`ExpansionController`](expansion::ExpansionController): the reveal loop
/// - [`Strategy`](expansion::Strategy): breadth / depth / balanced policies
pub mod expansion;

/// Snapshot extraction and text sanitization.
pub mod extract;

/// The playback sequencer: transport controls, auto-advance, highlight
/// synchronization.
pub mod playback;

/// Live document access.
///
/// - [`DocumentProbe`](probe::DocumentProbe): async query/reveal trait
/// - [`ChromeProbe`](probe::ChromeProbe): chromiumoxide implementation
/// - [`Highlighter`](probe::Highlighter): active-item side effect sink
pub mod probe;

/// Session state and the request/response command surface.
pub mod session;

/// Speech engine boundary.
///
/// - [`SpeechEngine`](speech::SpeechEngine): async capability trait
/// - [`EspeakEngine`](speech::EspeakEngine): process-backed implementation
pub mod speech;

/// Terminal player built with ratatui.
pub mod tui;
