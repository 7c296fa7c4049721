use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use crate::app::{HarvestError, Result};
use crate::domain::Entry;
use crate::store::{Sink, Submission};

pub const DEFAULT_SINK_URL: &str = "http://localhost:8087/posts";

/// Posts entries as JSON to a storage service.
///
/// The service answers `201 Created` for a new entry and any other status
/// when the id is already stored.
pub struct HttpSink {
    client: Client,
    url: String,
}

impl HttpSink {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .gzip(true)
            .brotli(true)
            .user_agent(concat!("scrollharvest/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl Sink for HttpSink {
    async fn submit(&self, entry: &Entry) -> Result<Submission> {
        let response = self
            .client
            .post(&self.url)
            .json(entry)
            .send()
            .await
            .map_err(|e| HarvestError::SinkUnreachable(format!("{}: {}", self.url, e)))?;

        match response.status() {
            StatusCode::CREATED => Ok(Submission::Accepted),
            status => {
                tracing::debug!("Sink answered {} for {}", status, entry.id());
                Ok(Submission::AlreadyExists)
            }
        }
    }
}
