pub mod commands;

use clap::{Args, Parser, Subcommand};

use crate::config::Config;
use crate::expansion::Strategy;

#[derive(Parser)]
#[command(name = "murmur")]
#[command(about = "Reads discussion threads aloud from a terminal", long_about = None)]
pub struct Cli {
    /// Path to an alternate config file
    #[arg(short, long, global = true)]
    pub config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Open a thread and read it aloud in the TUI player
    Read {
        /// URL of the thread to read
        url: String,

        #[command(flatten)]
        overrides: Overrides,
    },
    /// Expand and extract a thread, then print it without playing
    Extract {
        /// URL of the thread to extract
        url: String,

        /// Print the full extraction result as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        overrides: Overrides,
    },
    /// List the voices the speech engine offers
    Voices {
        /// Restrict to a locale prefix, e.g. "en"
        #[arg(short, long)]
        locale: Option<String>,
    },
}

/// Flags overriding the config file per invocation.
#[derive(Args)]
pub struct Overrides {
    /// Deepest reply level to reveal
    #[arg(long)]
    pub max_depth: Option<u32>,

    /// Cap on top-level comments
    #[arg(long)]
    pub top_level: Option<usize>,

    /// Cap on total comments
    #[arg(long)]
    pub total: Option<usize>,

    /// Expansion strategy
    #[arg(long, value_enum)]
    pub strategy: Option<Strategy>,

    /// Voice locale prefix
    #[arg(long)]
    pub locale: Option<String>,

    /// Show the browser window while expanding
    #[arg(long)]
    pub headful: bool,
}

impl Overrides {
    pub fn apply(&self, config: &mut Config) {
        if let Some(max_depth) = self.max_depth {
            config.expansion.max_depth = max_depth;
        }
        if let Some(top_level) = self.top_level {
            config.expansion.max_top_level = top_level;
        }
        if let Some(total) = self.total {
            config.expansion.max_total = total;
        }
        if let Some(strategy) = self.strategy {
            config.expansion.strategy = strategy;
        }
        if let Some(ref locale) = self.locale {
            config.speech.locale = locale.clone();
        }
    }
}
