//! # scrollharvest
//!
//! Harvests entries from an infinite-scroll feed with headless Chrome.
//!
//! ## Architecture
//!
//! ```text
//! FeedCursor → batches of EntryRef → EntryExtractor × workers → Sink
//! ```
//!
//! - [`crawler`]: feed enumeration, two-stage extraction, vote estimate, batch orchestration
//! - [`store`]: storage boundary ([`Sink`](store::Sink)) with HTTP and SQLite adapters
//! - [`domain`]: the immutable [`Entry`](domain::Entry) and its author snapshot
//!
//! ## Quick Start
//!
//! ```bash
//! # Harvest 50 posts, 4 at a time, into the local database
//! scrollharvest run -p 50 -w 4 --sink sqlite
//!
//! # Show what was stored
//! scrollharvest list
//! ```

/// Application context and error handling.
pub mod app;

/// Configuration loaded from `~/.config/scrollharvest/config.toml`.
pub mod config;

/// Command-line interface using clap.
///
/// - `run [-p N] [-o N] [-w N]` - Harvest entries
/// - `list` - List entries in the SQLite store
/// - `config` - Print the config file path
pub mod cli;

/// Core domain models.
///
/// - [`Entry`](domain::Entry): harvested entry with a SHA256 id of its URL
/// - [`Author`](domain::Author): author snapshot taken with the entry
pub mod domain;

/// Browser-driven crawling.
///
/// - [`Harvester`](crawler::Harvester): batch orchestrator
/// - [`FeedCursor`](crawler::FeedCursor): scroll-driven enumerator
/// - [`EntryExtractor`](crawler::EntryExtractor): entry page → author page extraction
/// - [`ChromeSessions`](crawler::ChromeSessions): chromiumoxide-backed sessions
pub mod crawler;

/// Storage sinks.
///
/// - [`Sink`](store::Sink): async trait consumed by the harvester
/// - [`HttpSink`](store::HttpSink): reqwest-based storage service client
/// - [`SqliteStore`](store::SqliteStore): SQLite implementation
pub mod store;
