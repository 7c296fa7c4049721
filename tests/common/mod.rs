#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use scrollharvest::app::{HarvestError, Result};
use scrollharvest::crawler::{
    CrawlerConfig, EntryExtractor, FeedCursor, PageSource, Selectors, Sessions, SettlePolicy,
};
use scrollharvest::domain::Entry;
use scrollharvest::store::{Sink, Submission};

pub const ORIGIN: &str = "https://feed.test";

/// In-memory sink with idempotent inserts keyed by entry id
#[derive(Default)]
pub struct MemorySink {
    ids: Mutex<HashSet<String>>,
    submissions: AtomicUsize,
    /// Fail every submission after this many have been made
    fail_after: Option<usize>,
}

impl MemorySink {
    pub fn unreachable_after(n: usize) -> Self {
        Self {
            fail_after: Some(n),
            ..Default::default()
        }
    }

    pub fn stored(&self) -> usize {
        self.ids.lock().unwrap().len()
    }

    pub fn submissions(&self) -> usize {
        self.submissions.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Sink for MemorySink {
    async fn submit(&self, entry: &Entry) -> Result<Submission> {
        let n = self.submissions.fetch_add(1, Ordering::SeqCst);
        if self.fail_after.is_some_and(|limit| n >= limit) {
            return Err(HarvestError::SinkUnreachable("connection refused".into()));
        }
        if self.ids.lock().unwrap().insert(entry.id().to_string()) {
            Ok(Submission::Accepted)
        } else {
            Ok(Submission::AlreadyExists)
        }
    }
}

pub fn entry_page(rating: i64, percentage: i64, user: &str) -> String {
    format!(
        r#"<html><body>
<div class="_3jOxDPIQ0KaOWpzvSQo-1s">5 days ago</div>
<div class="u6HtAZu8_LKL721-EnKuR">Fri, Jan 15, 2021, 3:14:22 PM (UTC)</div>
<a title="r/rust" href="/r/rust/">r/rust</a>
<a href="/user/{user}/">u/{user}</a>
<span data-click-id="comments">42 comments</span>
<div class="t4Hq30BDzTeJ85vREX7_M">{percentage}% Upvoted</div>
<div class="_1rZYMD_4xY3gRcSS3p8ODO">{rating}</div>
</body></html>"#
    )
}

pub fn author_page(user: &str) -> String {
    format!(
        r#"<html><body>
<h1 class="_1LCAhi_8JjayVo7pJ0KIh0">u/{user}</h1>
<span class="_1hNyZSklmcC7R_IfCUcXmZ">82,803</span>
<span class="_1hNyZSklmcC7R_IfCUcXmZ">March 22, 2017</span>
<div class="_3uK2I0hi3JFTKnMUFHD2Pd">1,505,594 Post Karma 215,184 Comment Karma</div>
</body></html>"#
    )
}

/// A whole site: the feed listing plus entry and author pages
#[derive(Default)]
pub struct Site {
    pub feed_links: Vec<String>,
    pub pages: HashMap<String, String>,
}

impl Site {
    /// Add a feed item linking to `path`, with its entry and author pages
    pub fn post(mut self, path: &str, rating: i64, percentage: i64, user: &str) -> Self {
        self.feed_links.push(path.to_string());
        self.pages.insert(
            format!("{ORIGIN}{path}"),
            entry_page(rating, percentage, user),
        );
        self.pages
            .entry(format!("{ORIGIN}/user/{user}/"))
            .or_insert_with(|| author_page(user));
        self
    }

    /// Replace a page, e.g. with an age-gate notice
    pub fn page(mut self, path: &str, html: &str) -> Self {
        self.pages.insert(format!("{ORIGIN}{path}"), html.to_string());
        self
    }

    fn feed_html(&self) -> String {
        let mut html = String::from("<html><body>");
        for link in &self.feed_links {
            html.push_str(&format!(
                r#"<div class="Post"><a data-click-id="body" href="{link}">post</a></div>"#
            ));
        }
        html.push_str("</body></html>");
        html
    }
}

/// One browser tab over a [`Site`]
pub struct SitePage {
    site: Arc<Site>,
    current: Option<String>,
    pub closed: Arc<AtomicUsize>,
}

impl SitePage {
    fn current_html(&self) -> Option<String> {
        let url = self.current.as_deref()?;
        if url == config().feed_url() {
            return Some(self.site.feed_html());
        }
        self.site.pages.get(url).cloned()
    }
}

#[async_trait]
impl PageSource for SitePage {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        self.current = Some(url.to_string());
        Ok(())
    }

    async fn render(&mut self) -> Result<String> {
        self.current_html()
            .ok_or_else(|| HarvestError::Browser("net::ERR_NAME_NOT_RESOLVED".into()))
    }

    async fn scroll_to(&mut self, _height: f64) -> Result<()> {
        Ok(())
    }

    async fn element_height(&mut self, _selector: &str, index: usize) -> Result<Option<f64>> {
        Ok((index < self.site.feed_links.len()).then_some(400.0))
    }

    async fn hover(&mut self, selector: &str) -> Result<()> {
        let class = selector.trim_start_matches("span").trim_start_matches('.');
        match self.current_html() {
            Some(html) if html.contains(class) => Ok(()),
            _ => Err(HarvestError::ElementNotFound(selector.to_string())),
        }
    }

    async fn exists(&mut self, _selector: &str) -> Result<bool> {
        Ok(true)
    }

    async fn close(&mut self) -> Result<()> {
        self.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub fn config() -> CrawlerConfig {
    CrawlerConfig {
        base_url: ORIGIN.to_string(),
        feed_path: "/top/".to_string(),
        settle: SettlePolicy::Fixed { delay_ms: 0 },
        ..Default::default()
    }
}

/// Sessions over a [`Site`], counting how many tabs get closed
pub struct SiteSessions {
    site: Arc<Site>,
    config: CrawlerConfig,
    selectors: Arc<Selectors>,
    pub closed: Arc<AtomicUsize>,
}

impl SiteSessions {
    pub fn new(site: Site) -> Self {
        let config = config();
        let selectors = Arc::new(Selectors::compile(&config.selectors).unwrap());
        Self {
            site: Arc::new(site),
            config,
            selectors,
            closed: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn page(&self) -> SitePage {
        SitePage {
            site: self.site.clone(),
            current: None,
            closed: self.closed.clone(),
        }
    }
}

#[async_trait]
impl Sessions for SiteSessions {
    type Cursor = FeedCursor<SitePage>;
    type Extractor = EntryExtractor<SitePage>;

    async fn open_cursor(&self, offset: usize) -> Result<Self::Cursor> {
        FeedCursor::open(self.page(), &self.config, self.selectors.clone(), offset).await
    }

    async fn open_extractor(&self) -> Result<Self::Extractor> {
        Ok(EntryExtractor::new(
            self.page(),
            &self.config,
            self.selectors.clone(),
        ))
    }
}
