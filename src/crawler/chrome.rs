use std::sync::Arc;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::app::{HarvestError, Result};
use crate::crawler::config::CrawlerConfig;
use crate::crawler::extractor::EntryExtractor;
use crate::crawler::feed::FeedCursor;
use crate::crawler::harvester::Sessions;
use crate::crawler::page::PageSource;
use crate::crawler::selectors::Selectors;

/// A browser tab driven through the DevTools protocol
pub struct ChromePage {
    page: Option<Page>,
}

impl ChromePage {
    fn page(&self) -> Result<&Page> {
        self.page
            .as_ref()
            .ok_or_else(|| HarvestError::Browser("Page already closed".to_string()))
    }

    async fn eval<T: serde::de::DeserializeOwned>(&self, script: String) -> Result<T> {
        self.page()?
            .evaluate(script)
            .await
            .map_err(|e| HarvestError::Browser(format!("Script execution failed: {}", e)))?
            .into_value()
            .map_err(|e| HarvestError::Browser(format!("Failed to parse result: {:?}", e)))
    }
}

#[async_trait]
impl PageSource for ChromePage {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        let page = self.page()?;
        page.goto(url)
            .await
            .map_err(|e| HarvestError::Browser(format!("Failed to load {}: {}", url, e)))?;
        page.wait_for_navigation()
            .await
            .map_err(|e| HarvestError::Browser(format!("Navigation failed: {}", e)))?;
        Ok(())
    }

    async fn render(&mut self) -> Result<String> {
        self.page()?
            .content()
            .await
            .map_err(|e| HarvestError::Browser(format!("Failed to read document: {}", e)))
    }

    async fn scroll_to(&mut self, height: f64) -> Result<()> {
        self.eval::<bool>(format!("window.scrollTo(0, {height}); true"))
            .await?;
        Ok(())
    }

    async fn element_height(&mut self, selector: &str, index: usize) -> Result<Option<f64>> {
        let selector = serde_json::to_string(selector)?;
        let height: f64 = self
            .eval(format!(
                r#"(() => {{
                    const el = document.querySelectorAll({selector})[{index}];
                    return el ? el.getBoundingClientRect().height : -1;
                }})()"#
            ))
            .await?;
        // Not rendered yet
        Ok((height >= 0.0).then_some(height))
    }

    async fn hover(&mut self, selector: &str) -> Result<()> {
        let element = self
            .page()?
            .find_element(selector)
            .await
            .map_err(|_| HarvestError::ElementNotFound(selector.to_string()))?;
        element
            .hover()
            .await
            .map_err(|e| HarvestError::Browser(format!("Hover over {} failed: {}", selector, e)))?;
        Ok(())
    }

    async fn exists(&mut self, selector: &str) -> Result<bool> {
        let selector = serde_json::to_string(selector)?;
        self.eval(format!("document.querySelector({selector}) !== null"))
            .await
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(page) = self.page.take() {
            page.close()
                .await
                .map_err(|e| HarvestError::Browser(format!("Failed to close page: {}", e)))?;
        }
        Ok(())
    }
}

/// One headless Chrome shared by every session of a run; each session owns a tab.
pub struct ChromeSessions {
    browser: Browser,
    handler: JoinHandle<()>,
    config: CrawlerConfig,
    selectors: Arc<Selectors>,
}

impl ChromeSessions {
    pub async fn launch(config: CrawlerConfig) -> Result<Self> {
        let selectors = Arc::new(Selectors::compile(&config.selectors)?);

        let mut builder = BrowserConfig::builder()
            .arg("--disable-notifications")
            .arg("--no-sandbox")
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--log-level=3")
            .window_size(config.window_width, config.window_height);

        if !config.headless {
            builder = builder.with_head();
        }

        let browser_config = builder
            .build()
            .map_err(|e| HarvestError::Browser(format!("Failed to build browser config: {}", e)))?;

        let (browser, mut handler) = Browser::launch(browser_config).await.map_err(|e| {
            HarvestError::Browser(format!(
                "Failed to launch browser: {}. Is Chrome or Chromium installed and in PATH?",
                e
            ))
        })?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("Browser handler event error: {}", e);
                }
            }
        });

        Ok(Self {
            browser,
            handler,
            config,
            selectors,
        })
    }

    async fn open_page(&self) -> Result<ChromePage> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| HarvestError::Browser(format!("Failed to create page: {}", e)))?;

        if let Some(ref ua) = self.config.user_agent {
            page.set_user_agent(ua)
                .await
                .map_err(|e| HarvestError::Browser(format!("Failed to set user agent: {}", e)))?;
        }

        Ok(ChromePage { page: Some(page) })
    }

    /// Close the browser process once every session has been released
    pub async fn shutdown(mut self) {
        if let Err(e) = self.browser.close().await {
            warn!("Failed to close browser: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            warn!("Failed to wait for browser exit: {}", e);
        }
        self.handler.abort();
    }
}

#[async_trait]
impl Sessions for ChromeSessions {
    type Cursor = FeedCursor<ChromePage>;
    type Extractor = EntryExtractor<ChromePage>;

    async fn open_cursor(&self, offset: usize) -> Result<Self::Cursor> {
        let page = self.open_page().await?;
        FeedCursor::open(page, &self.config, self.selectors.clone(), offset).await
    }

    async fn open_extractor(&self) -> Result<Self::Extractor> {
        let page = self.open_page().await?;
        Ok(EntryExtractor::new(page, &self.config, self.selectors.clone()))
    }
}
