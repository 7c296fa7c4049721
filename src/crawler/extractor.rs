use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tracing::info;
use url::Url;

use crate::app::{HarvestError, Result};
use crate::crawler::config::{CrawlerConfig, SettlePolicy};
use crate::crawler::estimate::estimate_votes;
use crate::crawler::feed::EntryRef;
use crate::crawler::page::PageSource;
use crate::crawler::parse::{parse_author_page, parse_entry_page, EntryPage};
use crate::crawler::selectors::Selectors;
use crate::domain::{Author, Entry};

/// Turns a candidate reference into a fully populated [`Entry`].
///
/// Failures are limited to the per-entry kinds
/// (see [`HarvestError::is_recoverable`]).
#[async_trait]
pub trait EntryExtract: Send {
    async fn extract(&mut self, reference: &EntryRef) -> Result<Entry>;

    /// Release the browsing session behind the extractor
    async fn close(&mut self) -> Result<()>;
}

/// Two-stage extractor: entry detail page, then the author's profile.
pub struct EntryExtractor<P> {
    page: P,
    selectors: Arc<Selectors>,
    settle: SettlePolicy,
    timestamp_formats: Vec<String>,
}

impl<P: PageSource> EntryExtractor<P> {
    pub fn new(page: P, config: &CrawlerConfig, selectors: Arc<Selectors>) -> Self {
        Self {
            page,
            selectors,
            settle: config.settle.clone(),
            timestamp_formats: config.timestamp_formats.clone(),
        }
    }

    async fn scrape_entry_page(&mut self, url: &str) -> Result<EntryPage> {
        self.page.navigate(url).await?;

        // Hovering the relative time renders the absolute timestamp
        self.page.hover(&self.selectors.timestamp_trigger_css).await?;
        self.settle
            .settle(&mut self.page, &self.selectors.timestamp_css)
            .await?;

        let html = self.page.render().await?;
        parse_entry_page(&html, &self.selectors, &self.timestamp_formats)
    }

    async fn scrape_author_page(&mut self, url: &str) -> Result<Author> {
        info!("Parsing user {}", url);
        self.page.navigate(url).await?;

        self.page.hover(&self.selectors.karma_and_tenure_css).await?;
        self.settle
            .settle(&mut self.page, &self.selectors.separated_karma_css)
            .await?;

        let html = self.page.render().await?;
        let author = parse_author_page(&html, &self.selectors)?;
        info!("User parsing success");
        Ok(author)
    }

    async fn scrape(&mut self, reference: &EntryRef) -> Result<Entry> {
        let post = self.scrape_entry_page(reference.as_str()).await?;
        let votes = estimate_votes(post.rating, post.upvote_percentage)?;

        let author_url = Url::parse(reference.as_str())?.join(&post.author_href)?;
        let author = self.scrape_author_page(author_url.as_str()).await?;

        Ok(Entry::new(
            reference.as_str(),
            author,
            post.published_at,
            post.comments,
            votes,
            post.category,
        ))
    }
}

#[async_trait]
impl<P: PageSource> EntryExtract for EntryExtractor<P> {
    async fn extract(&mut self, reference: &EntryRef) -> Result<Entry> {
        info!("Started parsing post {}", reference);
        let started = Instant::now();

        let entry = self
            .scrape(reference)
            .await
            .map_err(HarvestError::into_extraction)?;

        info!(
            "Post parsing success {:.2} seconds",
            started.elapsed().as_secs_f64()
        );
        Ok(entry)
    }

    async fn close(&mut self) -> Result<()> {
        self.page.close().await
    }
}
