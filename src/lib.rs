//! dealcrawl - discount catalog crawler.
//!
//! Walks a paginated product listing, extracts fields using configured CSS
//! selectors, keeps products whose markdown clears a threshold, and renders
//! the ranked result into a static HTML report.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod loader;
pub mod models;
pub mod report;

pub use config::{ConfigError, CrawlConfig, Field, FieldTable};
pub use crawler::{rank, CatalogCrawler, CrawlError, CrawlEvent, CrawlOutput, CrawlSummary};
pub use extract::{ExtractError, FieldExtractor};
pub use loader::{HttpLoader, LoadError, PageLoader};
pub use models::{ListingRow, ProductRecord};
pub use report::{render_report, ReportError};
