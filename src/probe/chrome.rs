use std::sync::Arc;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use url::Url;

use crate::app::{MurmurError, Result};
use crate::probe::scripts::ScriptBuilder;
use crate::probe::{
    DisclosureControl, DocumentProbe, HighlightTarget, Highlighter, ProbeConfig, ThreadCounts,
    ThreadSnapshot,
};

/// Chrome-backed probe over a single thread page.
///
/// All document work happens as generated JavaScript through
/// `page.evaluate`; the probe itself holds no DOM state.
pub struct ChromeProbe {
    _browser: Arc<Browser>,
    page: Page,
    scripts: ScriptBuilder,
}

impl ChromeProbe {
    /// Launch a browser, open the thread URL and wait for it to settle.
    pub async fn open(url: &str, config: ProbeConfig) -> Result<Self> {
        // Fail on malformed input before paying the browser launch cost.
        Url::parse(url)?;

        let mut builder = BrowserConfig::builder()
            .arg("--no-sandbox")
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-software-rasterizer");

        if !config.headless {
            builder = builder.with_head();
        }

        let browser_config = builder
            .build()
            .map_err(|e| MurmurError::Browser(format!("Failed to build browser config: {}", e)))?;

        let (browser, mut handler) = Browser::launch(browser_config).await.map_err(|e| {
            MurmurError::Browser(format!(
                "Failed to launch browser: {}. Is Chrome or Chromium installed and in PATH?",
                e
            ))
        })?;

        // Drive the browser event stream for the lifetime of the session.
        tokio::spawn(async move {
            while let Some(_event) = handler.next().await {}
        });

        let page = browser
            .new_page(url)
            .await
            .map_err(|e| MurmurError::Browser(format!("Failed to open page: {}", e)))?;

        if let Some(ref ua) = config.user_agent {
            page.set_user_agent(ua)
                .await
                .map_err(|e| MurmurError::Browser(format!("Failed to set user agent: {}", e)))?;
        }

        page.wait_for_navigation()
            .await
            .map_err(|e| MurmurError::Browser(format!("Navigation failed: {}", e)))?;

        tokio::time::sleep(config.wait_after_load()).await;

        Ok(Self {
            _browser: Arc::new(browser),
            page,
            scripts: ScriptBuilder::new(config),
        })
    }

    async fn eval<T: serde::de::DeserializeOwned>(&self, script: String) -> Result<T> {
        self.page
            .evaluate(script)
            .await
            .map_err(|e| MurmurError::Probe(format!("Script execution failed: {}", e)))?
            .into_value()
            .map_err(|e| MurmurError::Probe(format!("Failed to parse result: {:?}", e)))
    }
}

#[async_trait]
impl DocumentProbe for ChromeProbe {
    async fn counts(&self) -> Result<ThreadCounts> {
        self.eval(self.scripts.counts()).await
    }

    async fn disclosure_controls(&self) -> Result<Vec<DisclosureControl>> {
        self.eval(self.scripts.list_controls()).await
    }

    async fn reveal(&self, controls: &[DisclosureControl]) -> Result<()> {
        if controls.is_empty() {
            return Ok(());
        }
        let ordinals: Vec<usize> = controls.iter().map(|c| c.ordinal).collect();
        let clicked: usize = self.eval(self.scripts.reveal(&ordinals)).await?;
        tracing::debug!("Clicked {} of {} disclosure controls", clicked, controls.len());
        Ok(())
    }

    async fn snapshot(&self) -> Result<ThreadSnapshot> {
        self.eval(self.scripts.snapshot()).await
    }
}

#[async_trait]
impl Highlighter for ChromeProbe {
    async fn set_active(&self, target: &HighlightTarget) -> Result<()> {
        let found: bool = self.eval(self.scripts.highlight(target)).await?;
        if !found {
            tracing::debug!("Highlight target not found in document: {:?}", target);
        }
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let _: bool = self.eval(self.scripts.clear_highlight()).await?;
        Ok(())
    }
}
