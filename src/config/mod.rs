//! Configuration management for murmur.
//!
//! Configuration is read from `~/.config/murmur/config.toml` at startup.
//! If the file doesn't exist, a default configuration with comments is
//! created. CLI flags override whatever the file says.

pub mod colors;

pub use colors::ColorConfig;

use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

use crate::expansion::{ExpansionBudget, Strategy};
use crate::probe::ProbeConfig;

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub expansion: ExpansionConfig,
    pub speech: SpeechConfig,
    pub probe: ProbeConfig,
    pub colors: ColorConfig,
}

/// Default budgets for thread expansion.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExpansionConfig {
    /// Deepest reply level to reveal (default: 4)
    pub max_depth: u32,
    /// Top-level comments to reveal at most (default: 15)
    pub max_top_level: usize,
    /// Total comments to reveal at most (default: 60)
    pub max_total: usize,
    /// Reveal strategy: "breadth", "depth" or "balanced"
    pub strategy: Strategy,
}

impl Default for ExpansionConfig {
    fn default() -> Self {
        let budget = ExpansionBudget::default();
        Self {
            max_depth: budget.max_depth,
            max_top_level: budget.max_top_level,
            max_total: budget.max_total,
            strategy: budget.strategy,
        }
    }
}

impl ExpansionConfig {
    pub fn budget(&self) -> ExpansionBudget {
        ExpansionBudget {
            max_depth: self.max_depth.max(1),
            max_top_level: self.max_top_level.max(1),
            max_total: self.max_total.max(1),
            strategy: self.strategy,
        }
    }
}

/// Speech engine and voice settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Synthesizer program to run (default: "espeak")
    pub program: String,
    /// Voice locale prefix, e.g. "en" or "en-us"
    pub locale: String,
    /// Initial speaking speed multiplier, clamped to [0.5, 2.0]
    pub speed: f32,
    /// Give each successive item a different voice
    pub rotate_voices: bool,
    /// Restrict rotation to these voice names (empty = all voices)
    pub voices: Vec<String>,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            program: "espeak".to_string(),
            locale: "en".to_string(),
            speed: 1.0,
            rotate_voices: true,
            voices: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, creates a default one with
    /// comments. Missing fields in the file use default values.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &PathBuf) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.clone(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.clone(),
            source: e,
        })
    }

    /// Get the default config file path: `~/.config/murmur/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("murmur").join("config.toml"))
    }

    fn create_default_config(path: &PathBuf) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.clone(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.clone(),
                source: e,
            })?;

        Ok(())
    }

    /// Generate the default config file content with comments.
    fn default_config_content() -> String {
        r##"# murmur configuration
#
# Colors can be specified as:
# - Named colors: Black, Red, Green, Yellow, Blue, Magenta, Cyan, Gray,
#   DarkGray, LightRed, LightGreen, LightYellow, LightBlue, LightMagenta,
#   LightCyan, White, Reset
# - Hex colors: "#RRGGBB" or "#RGB"

[expansion]
# Deepest reply level to reveal
max_depth = 4

# Top-level comments to reveal at most
max_top_level = 15

# Total comments to reveal at most
max_total = 60

# How to pick the next hidden subtree: "breadth", "depth" or "balanced"
strategy = "balanced"

[speech]
# Synthesizer program; must accept espeak-style flags
program = "espeak"

# Voice locale prefix, e.g. "en" or "en-us"
locale = "en"

# Speaking speed multiplier, clamped to 0.5 - 2.0
speed = 1.0

# Give each successive item a different voice
rotate_voices = true

# Restrict rotation to these voice names (empty = all voices)
voices = []

[probe]
# Run the browser without a visible window
headless = true

# Wait after page load for dynamic content (milliseconds)
wait_after_load_ms = 2000

# CSS selectors for comment nodes, in priority order
comment_selectors = ["shreddit-comment", "div.comment"]

# Label substrings identifying "show more" controls (lowercase)
control_labels = ["more replies", "more comments"]

[colors]
border = "DarkGray"
active_item_bg = "Yellow"
active_item_fg = "Black"
post_item = "Cyan"
comment_item = "White"
author = "Yellow"
status_fg = "White"
status_bg = "DarkGray"
"##
        .to_string()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}
