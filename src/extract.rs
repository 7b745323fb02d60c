//! Configuration-driven field extraction.
//!
//! [`FieldExtractor`] resolves a [`Field`] through the configured
//! [`FieldTable`](crate::config::FieldTable) and reads either the text of the
//! first matching element or one of its attributes. Missing elements and
//! missing attributes are not errors; they produce an empty value that the
//! caller treats as "field unavailable".

pub mod normalize;

use std::sync::Arc;

use scraper::ElementRef;

use crate::config::{CrawlConfig, Field};
use normalize::{clear_string, parse_price, resolve_url, rewrite_url};

/// Errors raised while turning extracted text into values.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("cannot parse price {raw:?} (after rewrite: {rewritten:?}): {source}")]
    Price {
        raw: String,
        rewritten: String,
        #[source]
        source: std::num::ParseFloatError,
    },
    #[error("price {raw:?} is not a finite number")]
    NonFinitePrice { raw: String },
}

/// Reads configured fields out of a markup scope.
#[derive(Debug, Clone)]
pub struct FieldExtractor {
    config: Arc<CrawlConfig>,
}

impl FieldExtractor {
    pub fn new(config: Arc<CrawlConfig>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    /// Normalized string value of `field` within `scope`.
    pub fn text(&self, field: Field, scope: ElementRef<'_>) -> String {
        let binding = self.config.fields.get(field);
        let Some(selector) = binding.selector.as_ref() else {
            return String::new();
        };
        let Some(element) = scope.select(selector).next() else {
            return String::new();
        };

        let value = match binding.attribute.as_deref() {
            Some(attribute) => element.value().attr(attribute).unwrap_or_default().to_string(),
            None => element.text().collect::<String>(),
        };

        clear_string(&value)
    }

    /// Numeric price of `field`, 0 when absent.
    pub fn price(&self, field: Field, scope: ElementRef<'_>) -> Result<f64, ExtractError> {
        let raw = self.text(field, scope);
        parse_price(&raw, self.config.price_rewrite.as_ref())
    }

    /// URL value of `field`, rewritten and resolved against `page_url`.
    pub fn url(&self, field: Field, scope: ElementRef<'_>, page_url: &str) -> String {
        let raw = self.text(field, scope);
        let rewritten = rewrite_url(&raw, self.config.url_rewrite.as_ref());
        resolve_url(page_url, &rewritten)
    }
}
