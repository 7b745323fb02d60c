//! Concurrent product fetch dispatch and the shared result collection.

use std::sync::Arc;

use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;
use tracing::debug;

use super::events::{CrawlEvent, EventSink};
use super::product::ProductFetcher;
use super::CrawlError;
use crate::models::ProductRecord;

/// Append-only record collection shared by all fetch tasks.
///
/// Each record is stored with the sequence number of its dispatch so that
/// draining yields listing order regardless of completion order.
#[derive(Debug, Clone, Default)]
pub struct ResultCollection {
    inner: Arc<Mutex<Vec<(u64, ProductRecord)>>>,
}

impl ResultCollection {
    pub async fn push(&self, sequence: u64, record: ProductRecord) {
        self.inner.lock().await.push((sequence, record));
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Take every record, ordered by dispatch sequence.
    pub async fn drain(&self) -> Vec<ProductRecord> {
        let mut entries = std::mem::take(&mut *self.inner.lock().await);
        entries.sort_by_key(|(sequence, _)| *sequence);
        entries.into_iter().map(|(_, record)| record).collect()
    }
}

/// Spawns one task per product fetch and joins them.
///
/// Tasks are spawned as soon as they are dispatched. With a limit set, each
/// task waits for a semaphore permit before loading its page.
pub struct FetchDispatcher {
    fetcher: Arc<ProductFetcher>,
    events: EventSink,
    limit: Option<Arc<Semaphore>>,
    tasks: JoinSet<Result<(), CrawlError>>,
    results: ResultCollection,
    next_sequence: u64,
}

impl FetchDispatcher {
    pub(crate) fn new(
        fetcher: Arc<ProductFetcher>,
        events: EventSink,
        max_in_flight: Option<usize>,
    ) -> Self {
        Self {
            fetcher,
            events,
            limit: max_in_flight.map(|n| Arc::new(Semaphore::new(n))),
            tasks: JoinSet::new(),
            results: ResultCollection::default(),
            next_sequence: 0,
        }
    }

    /// Queue a fetch of `url` for concurrent execution.
    pub fn dispatch(&mut self, url: String, discount_pct: f64) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;

        let fetcher = self.fetcher.clone();
        let results = self.results.clone();
        let events = self.events.clone();
        let limit = self.limit.clone();

        self.tasks.spawn(async move {
            let _permit = match limit {
                Some(semaphore) => Some(
                    semaphore
                        .acquire_owned()
                        .await
                        .map_err(|e| CrawlError::Worker(e.to_string()))?,
                ),
                None => None,
            };

            if let Some(record) = fetcher.fetch(&url, discount_pct).await? {
                results.push(sequence, record).await;
                events.emit(CrawlEvent::ProductCollected { url });
            }
            Ok(())
        });
    }

    /// Number of dispatched fetches not yet joined.
    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    /// Wait for every dispatched fetch, then return the collected records.
    ///
    /// The first fatal error aborts the remaining fetches and is returned.
    pub async fn join_all(mut self) -> Result<Vec<ProductRecord>, CrawlError> {
        while let Some(joined) = self.tasks.join_next().await {
            match joined {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    self.tasks.abort_all();
                    return Err(e);
                }
                Err(e) if e.is_cancelled() => {
                    debug!("Fetch task cancelled");
                }
                Err(e) => {
                    self.tasks.abort_all();
                    return Err(CrawlError::Worker(e.to_string()));
                }
            }
        }

        Ok(self.results.drain().await)
    }
}
