//! Terminal progress display for a running crawl.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use dealcrawl::crawler::CrawlEvent;

#[derive(Debug, Default)]
struct Counts {
    page: u32,
    rows: usize,
    dispatched: usize,
    collected: usize,
    skipped: usize,
    failed_page: Option<u32>,
}

impl Counts {
    fn apply(&mut self, event: &CrawlEvent) {
        match event {
            CrawlEvent::PageLoaded { page, .. } => self.page = *page,
            CrawlEvent::PageFailed { page, .. } => self.failed_page = Some(*page),
            CrawlEvent::RowsScanned { rows, .. } => self.rows += rows,
            CrawlEvent::ProductDispatched { .. } => self.dispatched += 1,
            CrawlEvent::ProductCollected { .. } => self.collected += 1,
            CrawlEvent::ProductSkipped { .. } => self.skipped += 1,
        }
    }

    fn message(&self) -> String {
        let mut message = format!(
            "page {} | {} rows | {} queued | {} collected | {} skipped",
            self.page, self.rows, self.dispatched, self.collected, self.skipped
        );
        if let Some(page) = self.failed_page {
            message.push_str(&format!(" | stopped at page {page}"));
        }
        message
    }
}

/// Spinner fed by crawl events until the event channel closes.
pub struct CrawlProgress {
    handle: JoinHandle<()>,
}

impl CrawlProgress {
    pub fn spawn(mut rx: mpsc::Receiver<CrawlEvent>, hidden: bool) -> Self {
        let pb = if hidden {
            ProgressBar::hidden()
        } else {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            pb.enable_steady_tick(Duration::from_millis(100));
            pb
        };
        pb.set_message("Loading first listing page...");

        let handle = tokio::spawn(async move {
            let mut counts = Counts::default();
            while let Some(event) = rx.recv().await {
                counts.apply(&event);
                if let CrawlEvent::PageFailed { url, error, .. } = &event {
                    pb.println(format!("  listing page {url} failed: {error}"));
                }
                pb.set_message(counts.message());
            }
            pb.finish_and_clear();
        });

        Self { handle }
    }

    /// Wait for the event channel to close and clear the spinner.
    pub async fn finish(self) {
        let _ = self.handle.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dealcrawl::crawler::SkipReason;

    #[test]
    fn test_counts() {
        let mut counts = Counts::default();
        for event in [
            CrawlEvent::PageLoaded {
                page: 2,
                url: "https://shop.test/list?page=2".to_string(),
            },
            CrawlEvent::RowsScanned { page: 2, rows: 12 },
            CrawlEvent::ProductDispatched {
                url: "https://shop.test/p/1".to_string(),
                discount_pct: 30.0,
            },
            CrawlEvent::ProductDispatched {
                url: "https://shop.test/p/2".to_string(),
                discount_pct: 40.0,
            },
            CrawlEvent::ProductCollected {
                url: "https://shop.test/p/1".to_string(),
            },
            CrawlEvent::ProductSkipped {
                url: "https://shop.test/p/2".to_string(),
                reason: SkipReason::SellerMismatch,
            },
        ] {
            counts.apply(&event);
        }

        assert_eq!(
            counts.message(),
            "page 2 | 12 rows | 2 queued | 1 collected | 1 skipped"
        );
        assert_eq!(counts.failed_page, None);
    }
}
