use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures::stream::{FuturesUnordered, StreamExt};
use tracing::{debug, error, info, warn};

use crate::app::{HarvestError, Result};
use crate::crawler::extractor::EntryExtract;
use crate::crawler::feed::{EntryCursor, EntryRef};
use crate::domain::Entry;
use crate::store::{Sink, Submission};

pub const DEFAULT_AMOUNT: usize = 100;
pub const DEFAULT_WORKERS: usize = 1;

/// Acquires the browsing sessions a run needs.
#[async_trait]
pub trait Sessions: Send + Sync {
    type Cursor: EntryCursor;
    type Extractor: EntryExtract;

    /// Fresh feed session positioned `offset` items down
    async fn open_cursor(&self, offset: usize) -> Result<Self::Cursor>;

    async fn open_extractor(&self) -> Result<Self::Extractor>;
}

/// Outcome of one dispatched batch
#[derive(Debug, Default)]
pub struct BatchResult {
    /// Entries the sink accepted, in completion order
    pub entries: Vec<Entry>,
    /// Candidate references dispatched in the batch
    pub attempted: usize,
}

#[derive(Debug)]
pub struct RunResult {
    pub entries: Vec<Entry>,
    pub elapsed: Duration,
}

/// Coerce a requested worker count to at least one
pub fn coerce_workers(workers: i64) -> usize {
    usize::try_from(workers).unwrap_or(0).max(1)
}

/// Batch-wise fan-out/fan-in over a feed.
///
/// The cursor is driven sequentially; each batch of `workers` references is
/// extracted in parallel, one reference per extractor session, and the
/// cursor only moves again once the whole batch has finished.
pub struct Harvester<S, K: ?Sized> {
    sessions: S,
    sink: Arc<K>,
}

impl<S, K> Harvester<S, K>
where
    S: Sessions,
    K: Sink + ?Sized,
{
    pub fn new(sessions: S, sink: Arc<K>) -> Self {
        Self { sessions, sink }
    }

    /// Hand the session factory back, e.g. to shut the browser down
    pub fn into_sessions(self) -> S {
        self.sessions
    }

    /// Harvest up to `amount` entries starting `offset` items into the feed.
    ///
    /// Returns a short result when the feed runs out first. A sink failure
    /// aborts the run; every session is released either way.
    pub async fn run(&self, amount: usize, offset: usize, workers: usize) -> Result<RunResult> {
        let workers = workers.max(1);
        let started = Instant::now();

        let mut cursor = self.sessions.open_cursor(offset).await?;
        let mut extractors = Vec::with_capacity(workers);
        for _ in 0..workers {
            match self.sessions.open_extractor().await {
                Ok(extractor) => extractors.push(extractor),
                Err(e) => {
                    release(&mut cursor, &mut extractors).await;
                    return Err(e);
                }
            }
        }

        let outcome = self
            .harvest(&mut cursor, &mut extractors, amount, workers)
            .await;
        release(&mut cursor, &mut extractors).await;

        let entries = outcome?;
        let elapsed = started.elapsed();
        info!("Total elapsed time {:.2} seconds", elapsed.as_secs_f64());

        Ok(RunResult { entries, elapsed })
    }

    async fn harvest(
        &self,
        cursor: &mut S::Cursor,
        extractors: &mut [S::Extractor],
        amount: usize,
        workers: usize,
    ) -> Result<Vec<Entry>> {
        let mut accepted: Vec<Entry> = Vec::new();
        let mut seen = HashSet::new();
        let mut taken = 0;

        while accepted.len() < amount {
            let mut batch = Vec::with_capacity(workers);
            let mut exhausted = false;
            while batch.len() < workers {
                match cursor.next_ref().await? {
                    Some(reference) => batch.push(reference),
                    None => {
                        exhausted = true;
                        break;
                    }
                }
            }

            if !batch.is_empty() {
                let result = self.dispatch(extractors, batch).await?;
                taken += result.attempted;
                for entry in result.entries {
                    if seen.insert(entry.id().to_string()) {
                        accepted.push(entry);
                    } else {
                        debug!("Dropping repeated entry {}", entry.url());
                    }
                }
            }

            info!("{} posts taken. {} posts passed.", taken, accepted.len());

            if exhausted {
                info!(
                    "Feed exhausted with {} of {} entries collected",
                    accepted.len(),
                    amount
                );
                break;
            }
        }

        accepted.truncate(amount);
        Ok(accepted)
    }

    /// Extract one batch in parallel and submit every success to the sink.
    async fn dispatch(
        &self,
        extractors: &mut [S::Extractor],
        batch: Vec<EntryRef>,
    ) -> Result<BatchResult> {
        let attempted = batch.len();
        let sink = &*self.sink;

        let mut in_flight: FuturesUnordered<_> = extractors
            .iter_mut()
            .zip(batch)
            .map(|(extractor, reference)| process(extractor, reference, sink))
            .collect();

        let mut entries = Vec::with_capacity(attempted);
        while let Some(outcome) = in_flight.next().await {
            // A sink failure drops the rest of the batch mid-flight
            if let Some(entry) = outcome? {
                entries.push(entry);
            }
        }

        Ok(BatchResult { entries, attempted })
    }
}

async fn process<X, K>(extractor: &mut X, reference: EntryRef, sink: &K) -> Result<Option<Entry>>
where
    X: EntryExtract + ?Sized,
    K: Sink + ?Sized,
{
    let entry = match extractor.extract(&reference).await {
        Ok(entry) => entry,
        Err(HarvestError::ElementNotFound(what)) => {
            warn!(
                "User unavailable due to 18+ policy or deleted profile ({}): {}",
                what, reference
            );
            return Ok(None);
        }
        Err(e @ HarvestError::VoteEstimationUndefined { .. }) => {
            warn!("Skipping {}: {}", reference, e);
            return Ok(None);
        }
        Err(e) => {
            error!("Something went wrong while parsing post {}: {}", reference, e);
            return Ok(None);
        }
    };

    match sink.submit(&entry).await {
        Ok(Submission::Accepted) => Ok(Some(entry)),
        Ok(Submission::AlreadyExists) => {
            debug!("Entry {} already stored", entry.id());
            Ok(None)
        }
        Err(e) => {
            error!("Currently server is unavailable: {}", e);
            Err(match e {
                HarvestError::SinkUnreachable(_) => e,
                other => HarvestError::SinkUnreachable(other.to_string()),
            })
        }
    }
}

async fn release<C, X>(cursor: &mut C, extractors: &mut [X])
where
    C: EntryCursor + ?Sized,
    X: EntryExtract,
{
    if let Err(e) = cursor.close().await {
        warn!("Failed to close feed session: {}", e);
    }
    for extractor in extractors.iter_mut() {
        if let Err(e) = extractor.close().await {
            warn!("Failed to close extractor session: {}", e);
        }
    }
}
