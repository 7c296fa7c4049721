//! Scroll-driven feed crawling and entry extraction.
//!
//! # Architecture
//!
//! ```text
//! FeedCursor → batch of EntryRef → EntryExtractor × workers → Sink
//! ```
//!
//! [`Harvester`] pulls references from a [`FeedCursor`] until a batch of
//! `workers` is buffered, extracts the batch in parallel (one
//! [`EntryExtractor`] session per reference) and waits for the whole batch
//! before scrolling any further. Accepted entries are accumulated until the
//! requested amount is reached or the feed runs out.
//!
//! Everything that touches a live browser sits behind [`PageSource`], and
//! the harvester itself only sees the [`EntryCursor`], [`EntryExtract`] and
//! [`Sink`](crate::store::Sink) traits.
//!
//! # Usage
//!
//! ```rust,ignore
//! use scrollharvest::crawler::{ChromeSessions, CrawlerConfig, Harvester};
//! use scrollharvest::store::HttpSink;
//!
//! let sessions = ChromeSessions::launch(CrawlerConfig::default()).await?;
//! let sink = Arc::new(HttpSink::new("http://localhost:8087/posts")?);
//! let harvester = Harvester::new(sessions, sink);
//!
//! let result = harvester.run(100, 0, 4).await?;
//! harvester.into_sessions().shutdown().await;
//! ```

mod chrome;
mod config;
mod estimate;
mod extractor;
mod feed;
mod harvester;
mod page;
mod parse;
mod selectors;
mod settle;

pub use chrome::{ChromePage, ChromeSessions};
pub use config::{CrawlerConfig, SelectorConfig, SettlePolicy};
pub use estimate::{estimate_votes, parse_number};
pub use extractor::{EntryExtract, EntryExtractor};
pub use feed::{EntryCursor, EntryRef, FeedCursor};
pub use harvester::{
    coerce_workers, BatchResult, Harvester, RunResult, Sessions, DEFAULT_AMOUNT, DEFAULT_WORKERS,
};
pub use page::PageSource;
pub use parse::{parse_author_page, parse_entry_page, parse_karma_pair, EntryPage};
pub use selectors::Selectors;
