use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};
use url::Url;

use crate::app::Result;
use crate::crawler::config::{CrawlerConfig, SettlePolicy};
use crate::crawler::page::PageSource;
use crate::crawler::parse::{parse_feed_slot, FeedSlot};
use crate::crawler::selectors::Selectors;

/// Candidate reference: the absolute URL of an entry's detail page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntryRef(String);

impl EntryRef {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    /// Resolve a feed link against the site origin
    pub fn resolve(base: &Url, href: &str) -> Result<Self> {
        Ok(Self(base.join(href)?.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Sequential source of candidate references.
///
/// `Ok(None)` means the feed is exhausted. Implementations are stateful and
/// must not be polled concurrently.
#[async_trait]
pub trait EntryCursor: Send {
    async fn next_ref(&mut self) -> Result<Option<EntryRef>>;

    /// Release the browsing session behind the cursor
    async fn close(&mut self) -> Result<()>;
}

/// Cursor over an infinite-scroll listing.
///
/// Every step scrolls down by the height of the next unseen item, re-reads
/// the rendered document and yields the link at the current index. An index
/// that has not rendered yet gets one settle before the feed counts as
/// exhausted.
pub struct FeedCursor<P> {
    page: P,
    selectors: Arc<Selectors>,
    settle: SettlePolicy,
    base: Url,
    avg_item_height: f64,
    index: usize,
    height: f64,
}

impl<P: PageSource> FeedCursor<P> {
    /// Load the feed and position the cursor `offset` items down.
    pub async fn open(
        mut page: P,
        config: &CrawlerConfig,
        selectors: Arc<Selectors>,
        offset: usize,
    ) -> Result<Self> {
        let base = Url::parse(&config.base_url)?;
        let feed_url = config.feed_url();
        info!("Opening feed {} at offset {}", feed_url, offset);
        page.navigate(&feed_url).await?;

        Ok(Self {
            page,
            selectors,
            settle: config.settle.clone(),
            base,
            avg_item_height: config.avg_item_height,
            index: offset,
            height: config.avg_item_height * offset as f64,
        })
    }

    /// Index of the next item the cursor will read
    pub fn position(&self) -> usize {
        self.index
    }

    async fn read_slot(&mut self) -> Result<FeedSlot> {
        let html = self.page.render().await?;
        Ok(parse_feed_slot(&html, &self.selectors, self.index))
    }
}

#[async_trait]
impl<P: PageSource> EntryCursor for FeedCursor<P> {
    async fn next_ref(&mut self) -> Result<Option<EntryRef>> {
        loop {
            let item_height = self
                .page
                .element_height(&self.selectors.post_container_css, self.index)
                .await?
                .unwrap_or(self.avg_item_height);
            self.height += item_height;
            self.page.scroll_to(self.height).await?;

            let mut slot = self.read_slot().await?;
            if slot == FeedSlot::Exhausted {
                // Lazy feeds append items a moment after the scroll
                self.settle
                    .settle(&mut self.page, &self.selectors.post_container_css)
                    .await?;
                slot = self.read_slot().await?;
            }
            let index = self.index;
            self.index += 1;

            match slot {
                FeedSlot::Link(href) => return EntryRef::resolve(&self.base, &href).map(Some),
                FeedSlot::Unlinked => debug!("Feed item {} has no detail link, skipping", index),
                FeedSlot::Exhausted => {
                    info!("Feed exhausted after {} items", index);
                    return Ok(None);
                }
            }
        }
    }

    async fn close(&mut self) -> Result<()> {
        self.page.close().await
    }
}
