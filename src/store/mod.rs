pub mod http;
pub mod sqlite;

use async_trait::async_trait;

use crate::app::Result;
use crate::domain::Entry;

pub use http::HttpSink;
pub use sqlite::SqliteStore;

/// How the sink answered a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    Accepted,
    /// An entry with the same identifier is already stored
    AlreadyExists,
}

/// Storage boundary receiving harvested entries.
///
/// Implementations are shared by every worker and must make inserts
/// idempotent by entry id. An `Err` means the sink could not be reached and
/// ends the run.
#[async_trait]
pub trait Sink: Send + Sync {
    async fn submit(&self, entry: &Entry) -> Result<Submission>;
}
