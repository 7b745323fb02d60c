//! Catalog crawl pipeline.
//!
//! [`CatalogCrawler::run`] walks the listing pages sequentially, fans out one
//! product fetch per qualifying row, waits for every fetch, and returns the
//! collected products ranked by discount.

mod dispatch;
mod events;
mod product;
mod rank;
mod walker;

pub use dispatch::{FetchDispatcher, ResultCollection};
pub use events::{CrawlEvent, SkipReason};
pub use product::ProductFetcher;
pub use rank::rank;
pub use walker::{scan_listing, Candidate, ListingScan, PageCursor, WalkStats};

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::info;

use crate::config::CrawlConfig;
use crate::extract::{ExtractError, FieldExtractor};
use crate::loader::PageLoader;
use crate::models::ProductRecord;
use events::EventSink;

/// Errors that abort a crawl.
#[derive(Debug, thiserror::Error)]
pub enum CrawlError {
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error("fetch worker failed: {0}")]
    Worker(String),
}

/// Counters describing a finished crawl.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    pub pages_visited: u32,
    pub rows_scanned: usize,
    pub products_dispatched: usize,
    pub products_collected: usize,
}

/// Ranked products plus crawl counters.
#[derive(Debug, Clone)]
pub struct CrawlOutput {
    pub products: Vec<ProductRecord>,
    pub summary: CrawlSummary,
}

/// Drives a full crawl from the configured start URL.
pub struct CatalogCrawler {
    config: Arc<CrawlConfig>,
    loader: Arc<dyn PageLoader>,
    events: EventSink,
}

impl CatalogCrawler {
    pub fn new(config: Arc<CrawlConfig>, loader: Arc<dyn PageLoader>) -> Self {
        Self {
            config,
            loader,
            events: EventSink::default(),
        }
    }

    /// Report progress on `tx` while crawling.
    ///
    /// Sends never wait: events that do not fit in the channel are dropped,
    /// so a receiver that is drained only after [`run`](Self::run) returns
    /// sees at most the channel's capacity.
    pub fn with_events(mut self, tx: mpsc::Sender<CrawlEvent>) -> Self {
        self.events = EventSink::new(tx);
        self
    }

    /// Crawl, wait for all product fetches, and rank the results.
    pub async fn run(&self) -> Result<CrawlOutput, CrawlError> {
        let extractor = FieldExtractor::new(self.config.clone());
        let fetcher = ProductFetcher::new(
            extractor.clone(),
            self.loader.clone(),
            self.events.clone(),
        );
        let mut dispatcher = FetchDispatcher::new(
            Arc::new(fetcher),
            self.events.clone(),
            self.config.max_concurrent_fetches,
        );

        // On error the dispatcher is dropped, which aborts outstanding fetches.
        let stats =
            walker::walk(&extractor, self.loader.as_ref(), &self.events, &mut dispatcher).await?;

        let records = dispatcher.join_all().await?;
        let summary = CrawlSummary {
            pages_visited: stats.pages_visited,
            rows_scanned: stats.rows_scanned,
            products_dispatched: stats.dispatched,
            products_collected: records.len(),
        };

        info!(
            "Crawl complete: {} pages, {} rows, {} fetched, {} collected",
            summary.pages_visited,
            summary.rows_scanned,
            summary.products_dispatched,
            summary.products_collected
        );

        Ok(CrawlOutput {
            products: rank(records),
            summary,
        })
    }
}
