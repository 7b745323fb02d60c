//! User agent selection for page requests.
//!
//! The `user_agent` config value is either absent (identify as dealcrawl),
//! the word `impersonate` (rotate through common desktop browsers), or a
//! literal header value.

use std::sync::atomic::{AtomicUsize, Ordering};

pub const USER_AGENT: &str = concat!("dealcrawl/", env!("CARGO_PKG_VERSION"));

/// Desktop browser agents used in impersonate mode.
pub const IMPERSONATE_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:133.0) Gecko/20100101 Firefox/133.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/18.1 Safari/605.1.15",
];

static NEXT_IMPERSONATED: AtomicUsize = AtomicUsize::new(0);

/// Each call hands out the next browser agent in turn.
fn next_impersonated() -> &'static str {
    let slot = NEXT_IMPERSONATED.fetch_add(1, Ordering::Relaxed);
    IMPERSONATE_USER_AGENTS[slot % IMPERSONATE_USER_AGENTS.len()]
}

pub fn resolve_user_agent(config: Option<&str>) -> String {
    match config.map(str::trim) {
        None | Some("") => USER_AGENT.to_string(),
        Some("impersonate") => next_impersonated().to_string(),
        Some(custom) => custom.to_string(),
    }
}
