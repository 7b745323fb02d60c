//! Page loading.
//!
//! The crawler only needs the body of a page that answered 200. Anything else
//! is a [`LoadError`], and callers treat every error the same way: stop
//! paginating, or skip the product.

mod http;
mod user_agent;

pub use http::HttpLoader;
pub use user_agent::{resolve_user_agent, IMPERSONATE_USER_AGENTS, USER_AGENT};

use async_trait::async_trait;

/// Errors from loading a page.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("status code error: {status} for {url}")]
    Status { url: String, status: u16 },
    #[error("page not available: {0}")]
    Unavailable(String),
}

/// Source of page bodies.
///
/// Returns raw HTML; callers parse it synchronously since a parsed
/// [`scraper::Html`] cannot be held across an await point.
#[async_trait]
pub trait PageLoader: Send + Sync {
    async fn load(&self, url: &str) -> Result<String, LoadError>;
}
