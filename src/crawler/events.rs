//! Progress events emitted while crawling.

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::trace;

/// Why a dispatched product did not produce a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    EmptyUrl,
    LoadFailed,
    SellerMismatch,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SkipReason::EmptyUrl => "empty url",
            SkipReason::LoadFailed => "load failed",
            SkipReason::SellerMismatch => "seller mismatch",
        };
        f.write_str(s)
    }
}

/// Events emitted by the walker and the product fetchers.
#[derive(Debug, Clone, PartialEq)]
pub enum CrawlEvent {
    PageLoaded { page: u32, url: String },
    PageFailed { page: u32, url: String, error: String },
    RowsScanned { page: u32, rows: usize },
    ProductDispatched { url: String, discount_pct: f64 },
    ProductCollected { url: String },
    ProductSkipped { url: String, reason: SkipReason },
}

/// Optional event channel shared by the walker and every fetch task.
#[derive(Debug, Clone, Default)]
pub(crate) struct EventSink {
    tx: Option<mpsc::Sender<CrawlEvent>>,
}

impl EventSink {
    pub(crate) fn new(tx: mpsc::Sender<CrawlEvent>) -> Self {
        Self { tx: Some(tx) }
    }

    /// Send an event without waiting. Events are dropped when the channel is
    /// full, closed, or absent; the crawl never waits on its observer.
    pub(crate) fn emit(&self, event: CrawlEvent) {
        let Some(tx) = &self.tx else {
            return;
        };
        match tx.try_send(event) {
            Ok(()) | Err(TrySendError::Closed(_)) => {}
            Err(TrySendError::Full(event)) => {
                trace!("Event channel full, dropped {:?}", event);
            }
        }
    }
}
