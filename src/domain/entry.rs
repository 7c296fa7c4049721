use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Author snapshot captured once per entry extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Author {
    pub username: String,
    #[serde(rename = "user_karma")]
    pub karma: i64,
    /// Opaque tenure label as displayed, e.g. `March 22, 2017`
    #[serde(rename = "user_cake_day")]
    pub cake_day: String,
    pub post_karma: i64,
    pub comment_karma: i64,
}

/// One harvested feed entry.
///
/// Built only by the extractor (or a store reading back a row) with every
/// field present, and never mutated afterwards. Two entries are equal when
/// their canonical URLs hash to the same identifier, whatever the other
/// fields say.
#[derive(Debug, Clone, Serialize)]
pub struct Entry {
    id: String,
    #[serde(rename = "post_url")]
    url: String,
    #[serde(flatten)]
    author: Author,
    #[serde(rename = "post_date")]
    published_at: DateTime<Utc>,
    #[serde(rename = "number_of_comments")]
    comments: i64,
    #[serde(rename = "number_of_votes")]
    votes: i64,
    #[serde(rename = "post_category")]
    category: String,
}

impl Entry {
    pub fn new(
        url: impl Into<String>,
        author: Author,
        published_at: DateTime<Utc>,
        comments: i64,
        votes: i64,
        category: impl Into<String>,
    ) -> Self {
        let url = url.into();
        Self {
            id: Self::generate_id(&url),
            url,
            author,
            published_at,
            comments,
            votes,
            category: category.into(),
        }
    }

    /// Generate a deterministic ID from the canonical entry URL
    pub fn generate_id(url: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(url.as_bytes());
        hex::encode(hasher.finalize())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn author(&self) -> &Author {
        &self.author
    }

    pub fn published_at(&self) -> DateTime<Utc> {
        self.published_at
    }

    pub fn comments(&self) -> i64 {
        self.comments
    }

    pub fn votes(&self) -> i64 {
        self.votes
    }

    pub fn category(&self) -> &str {
        &self.category
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Entry {}

impl Hash for Entry {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
