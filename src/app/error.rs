use thiserror::Error;

#[derive(Error, Debug)]
pub enum HarvestError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid selector or pattern: {0}")]
    InvalidSelector(String),

    /// A required page element is absent, e.g. an age-gated or deleted author profile
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// Upvote percentage sits exactly on 50%, where the estimate divides by zero
    #[error("Vote estimate undefined for rating {rating} at 50% upvoted")]
    VoteEstimationUndefined { rating: i64 },

    #[error("Extraction failed: {0}")]
    Extraction(String),

    #[error("Sink unreachable: {0}")]
    SinkUnreachable(String),

    #[error("{0}")]
    Other(String),
}

impl HarvestError {
    /// Per-entry failures that skip one entry without stopping the run.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::ElementNotFound(_) | Self::VoteEstimationUndefined { .. } | Self::Extraction(_)
        )
    }

    /// Folds any failure raised while reading a page into the per-entry taxonomy.
    ///
    /// Missing elements and the 50% boundary keep their own kind, everything
    /// else becomes [`HarvestError::Extraction`].
    pub fn into_extraction(self) -> Self {
        if self.is_recoverable() {
            self
        } else {
            Self::Extraction(self.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, HarvestError>;
