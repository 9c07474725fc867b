use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the browser-backed document probe.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Whether to run the browser in headless mode (default: true)
    pub headless: bool,

    /// Wait time after initial page load for dynamic content in milliseconds
    /// (default: 2000)
    pub wait_after_load_ms: u64,

    /// CSS selectors for comment nodes, in priority order; the first selector
    /// matching anything wins for the whole session
    pub comment_selectors: Vec<String>,

    /// Lowercase substrings identifying disclosure controls by their label
    pub control_labels: Vec<String>,

    /// CSS selectors for the post title, in priority order
    pub title_selectors: Vec<String>,

    /// CSS selectors for the post body, in priority order
    pub body_selectors: Vec<String>,

    /// Outline style applied to the active item
    pub highlight_outline: String,

    /// User agent string to use
    pub user_agent: Option<String>,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            headless: true,
            wait_after_load_ms: 2000,
            comment_selectors: vec![
                "shreddit-comment".to_string(),
                "div.comment".to_string(),
            ],
            control_labels: vec![
                "more replies".to_string(),
                "more comments".to_string(),
            ],
            title_selectors: vec![
                "h1[slot=\"title\"]".to_string(),
                "shreddit-post h1".to_string(),
                "a.title".to_string(),
                "h1".to_string(),
            ],
            body_selectors: vec![
                "[slot=\"text-body\"]".to_string(),
                "shreddit-post .md".to_string(),
                "div.expando .md".to_string(),
            ],
            highlight_outline: "3px solid #ffb000".to_string(),
            user_agent: Some(
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
                 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                    .to_string(),
            ),
        }
    }
}

impl ProbeConfig {
    /// Get the wait time after load as a Duration
    pub fn wait_after_load(&self) -> Duration {
        Duration::from_millis(self.wait_after_load_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = ProbeConfig::default();
        assert!(config.headless);
        assert_eq!(config.wait_after_load_ms, 2000);
        assert!(!config.comment_selectors.is_empty());
        assert!(config
            .control_labels
            .iter()
            .all(|l| l.chars().all(|c| !c.is_uppercase())));
        assert!(!config.title_selectors.is_empty());
    }

    #[test]
    fn test_wait_after_load_duration() {
        let config = ProbeConfig::default();
        assert_eq!(config.wait_after_load(), Duration::from_millis(2000));
    }
}
