//! Listing page walker.
//!
//! Pagination is an explicit state loop rather than recursion:
//! `LoadingPage -> ScanningRows -> RecursingNextPage -> LoadingPage ...`
//! until the page ceiling is passed, no next link is found, or a listing page
//! fails to load.

use scraper::Html;
use tracing::{debug, info, warn};

use super::dispatch::FetchDispatcher;
use super::events::{CrawlEvent, EventSink};
use super::CrawlError;
use crate::config::Field;
use crate::extract::{ExtractError, FieldExtractor};
use crate::loader::PageLoader;
use crate::models::ListingRow;

/// One-based listing page counter with an upper bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    page: u32,
    maximum: u32,
}

impl PageCursor {
    pub fn new(maximum: u32) -> Self {
        Self { page: 1, maximum }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    /// Move to the next page. Returns `false` once the ceiling is exceeded.
    ///
    /// The first page is always visited, even with a ceiling of 0.
    pub fn advance(&mut self) -> bool {
        self.page += 1;
        self.page <= self.maximum
    }
}

/// A row that qualified for a product fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub url: String,
    pub discount_pct: f64,
}

/// Result of scanning one listing page.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingScan {
    pub rows: usize,
    pub candidates: Vec<Candidate>,
    /// Next listing page, empty when there is none.
    pub next_page: String,
}

/// Scan a listing page body for qualifying rows and the next-page link.
pub fn scan_listing(
    extractor: &FieldExtractor,
    body: &str,
    page_url: &str,
) -> Result<ListingScan, ExtractError> {
    let document = Html::parse_document(body);
    let config = extractor.config();

    let mut rows = 0;
    let mut candidates = Vec::new();

    for element in document.select(&config.rows) {
        rows += 1;

        let row = ListingRow {
            price: extractor.price(Field::ProductsPrice, element)?,
            final_price: extractor.price(Field::ProductsFinalPrice, element)?,
            url: extractor.url(Field::ProductsUrl, element, page_url),
        };

        let Some(discount_pct) = row.discount_pct() else {
            debug!(
                "No usable discount (price {}, final {}): {}",
                row.price, row.final_price, row.url
            );
            continue;
        };

        if discount_pct < config.minimum_discount_pct {
            debug!("Discount {:.2}% below minimum: {}", discount_pct, row.url);
            continue;
        }

        candidates.push(Candidate {
            url: row.url,
            discount_pct,
        });
    }

    let next_page = extractor.url(Field::NextPage, document.root_element(), page_url);

    Ok(ListingScan {
        rows,
        candidates,
        next_page,
    })
}

/// Counters from one walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    pub pages_visited: u32,
    pub rows_scanned: usize,
    pub dispatched: usize,
}

enum WalkState {
    LoadingPage { url: String },
    ScanningRows { url: String, body: String },
    RecursingNextPage { next_page: String },
    Done,
}

/// Walk listing pages from the configured start URL, dispatching a fetch for
/// every qualifying row.
pub(crate) async fn walk(
    extractor: &FieldExtractor,
    loader: &dyn PageLoader,
    events: &EventSink,
    dispatcher: &mut FetchDispatcher,
) -> Result<WalkStats, CrawlError> {
    let config = extractor.config();
    let mut cursor = PageCursor::new(config.maximum_pages);
    let mut stats = WalkStats::default();
    let mut state = WalkState::LoadingPage {
        url: config.start_url.clone(),
    };

    loop {
        state = match state {
            WalkState::LoadingPage { url } => match loader.load(&url).await {
                Ok(body) => {
                    stats.pages_visited += 1;
                    info!("Loaded listing page {}: {}", cursor.page(), url);
                    events.emit(CrawlEvent::PageLoaded {
                        page: cursor.page(),
                        url: url.clone(),
                    });
                    WalkState::ScanningRows { url, body }
                }
                Err(e) => {
                    warn!(
                        "Pagination stopped, listing page {} failed ({}): {}",
                        cursor.page(),
                        url,
                        e
                    );
                    events.emit(CrawlEvent::PageFailed {
                        page: cursor.page(),
                        url,
                        error: e.to_string(),
                    });
                    WalkState::Done
                }
            },

            WalkState::ScanningRows { url, body } => {
                let scan = scan_listing(extractor, &body, &url)?;
                stats.rows_scanned += scan.rows;
                events.emit(CrawlEvent::RowsScanned {
                    page: cursor.page(),
                    rows: scan.rows,
                });

                for candidate in scan.candidates {
                    events.emit(CrawlEvent::ProductDispatched {
                        url: candidate.url.clone(),
                        discount_pct: candidate.discount_pct,
                    });
                    dispatcher.dispatch(candidate.url, candidate.discount_pct);
                    stats.dispatched += 1;
                }

                WalkState::RecursingNextPage {
                    next_page: scan.next_page,
                }
            }

            WalkState::RecursingNextPage { next_page } => {
                if !cursor.advance() {
                    debug!("Page limit {} reached", config.maximum_pages);
                    WalkState::Done
                } else if next_page.is_empty() {
                    debug!("No next page link after page {}", cursor.page() - 1);
                    WalkState::Done
                } else {
                    WalkState::LoadingPage { url: next_page }
                }
            }

            WalkState::Done => break,
        };
    }

    Ok(stats)
}
