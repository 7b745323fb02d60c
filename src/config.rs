//! Crawl configuration loaded from a JSON file.
//!
//! The file keeps the flat key layout users already write (`css_products`,
//! `css_products_price_attribute`, `regex_price_old`, ...). It is parsed into
//! [`RawConfig`] and validated into [`CrawlConfig`], which holds parsed
//! selectors and compiled patterns and is read-only for the rest of the run.

mod fields;

pub use fields::{Field, FieldSelector, FieldTable};

use std::path::{Path, PathBuf};
use std::time::Duration;

use regex::Regex;
use scraper::Selector;
use serde::Deserialize;

/// Default request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Report path used when the configuration leaves `output` empty.
pub const DEFAULT_OUTPUT: &str = "result.html";

/// Errors raised while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("missing required config value: {0}")]
    Missing(&'static str),
    #[error("invalid selector in {key}: {message}")]
    Selector { key: String, message: String },
    #[error("invalid pattern in {key}: {source}")]
    Pattern {
        key: &'static str,
        #[source]
        source: regex::Error,
    },
    #[error("invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

/// Configuration file as written by the user.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfig {
    /// Seller name that products must match (empty disables the filter).
    #[serde(default)]
    pub seller: String,
    /// First listing page.
    #[serde(default)]
    pub url: String,
    /// Selector for one product row on a listing page.
    #[serde(default)]
    pub css_products: String,
    #[serde(default)]
    pub css_products_price: String,
    #[serde(default)]
    pub css_products_price_attribute: String,
    #[serde(default)]
    pub css_products_final_price: String,
    #[serde(default)]
    pub css_products_final_price_attribute: String,
    #[serde(default)]
    pub css_products_url: String,
    #[serde(default)]
    pub css_products_url_attribute: String,
    #[serde(default)]
    pub css_product_seller: String,
    #[serde(default)]
    pub css_product_seller_attribute: String,
    #[serde(default)]
    pub css_product_image: String,
    #[serde(default)]
    pub css_product_image_attribute: String,
    #[serde(default)]
    pub css_product_title: String,
    #[serde(default)]
    pub css_product_title_attribute: String,
    #[serde(default)]
    pub css_product_price: String,
    #[serde(default)]
    pub css_product_price_attribute: String,
    #[serde(default)]
    pub css_next_page: String,
    #[serde(default)]
    pub css_next_page_attribute: String,
    /// Pattern applied to price text before numeric parsing.
    #[serde(default)]
    pub regex_price_old: String,
    #[serde(default)]
    pub regex_price_new: String,
    /// Pattern applied to extracted URLs. Active only when `regex_url_new` is set.
    #[serde(default)]
    pub regex_url_old: String,
    #[serde(default)]
    pub regex_url_new: String,
    #[serde(default)]
    pub minimum_porcentage_discount: f64,
    /// Last listing page to visit. Zero or negative visits only the first.
    #[serde(default)]
    pub maximum_pages: i64,
    #[serde(default)]
    pub output: String,
    /// Cap on product fetches in flight. Unbounded when absent.
    #[serde(default)]
    pub max_concurrent_fetches: Option<usize>,
    /// User agent configuration.
    /// - None: crate default user agent
    /// - "impersonate": a real browser user agent
    /// - Any other string: used as-is
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl RawConfig {
    fn field_pairs(&self) -> [(Field, &str, &str); 8] {
        [
            (
                Field::ProductsPrice,
                self.css_products_price.as_str(),
                self.css_products_price_attribute.as_str(),
            ),
            (
                Field::ProductsFinalPrice,
                self.css_products_final_price.as_str(),
                self.css_products_final_price_attribute.as_str(),
            ),
            (
                Field::ProductsUrl,
                self.css_products_url.as_str(),
                self.css_products_url_attribute.as_str(),
            ),
            (
                Field::ProductSeller,
                self.css_product_seller.as_str(),
                self.css_product_seller_attribute.as_str(),
            ),
            (
                Field::ProductImage,
                self.css_product_image.as_str(),
                self.css_product_image_attribute.as_str(),
            ),
            (
                Field::ProductTitle,
                self.css_product_title.as_str(),
                self.css_product_title_attribute.as_str(),
            ),
            (
                Field::ProductPrice,
                self.css_product_price.as_str(),
                self.css_product_price_attribute.as_str(),
            ),
            (
                Field::NextPage,
                self.css_next_page.as_str(),
                self.css_next_page_attribute.as_str(),
            ),
        ]
    }
}

/// A compiled pattern substitution (`regex_*_old` -> `regex_*_new`).
#[derive(Debug, Clone)]
pub struct Rewrite {
    pattern: Regex,
    replacement: String,
}

impl Rewrite {
    pub fn new(
        key: &'static str,
        pattern: &str,
        replacement: &str,
    ) -> Result<Self, ConfigError> {
        let pattern =
            Regex::new(pattern).map_err(|source| ConfigError::Pattern { key, source })?;
        Ok(Self {
            pattern,
            replacement: replacement.to_string(),
        })
    }

    /// Replace every match, expanding `$1`-style group references.
    pub fn apply(&self, value: &str) -> String {
        self.pattern
            .replace_all(value, self.replacement.as_str())
            .into_owned()
    }
}

/// Validated, immutable crawl configuration.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub seller: String,
    pub start_url: String,
    /// Selector matching one product row on a listing page.
    pub rows: Selector,
    pub fields: FieldTable,
    /// Price text substitution; `None` parses the text as extracted.
    pub price_rewrite: Option<Rewrite>,
    pub url_rewrite: Option<Rewrite>,
    pub minimum_discount_pct: f64,
    pub maximum_pages: u32,
    pub output: PathBuf,
    pub max_concurrent_fetches: Option<usize>,
    pub user_agent: Option<String>,
    pub request_timeout: Duration,
}

impl CrawlConfig {
    /// Load and validate configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&contents)
    }

    /// Parse and validate configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = serde_json::from_str(json)?;
        Self::from_raw(&raw)
    }

    pub fn from_raw(raw: &RawConfig) -> Result<Self, ConfigError> {
        let start_url = raw.url.trim();
        if start_url.is_empty() {
            return Err(ConfigError::Missing("url"));
        }

        let rows_css = raw.css_products.trim();
        if rows_css.is_empty() {
            return Err(ConfigError::Missing("css_products"));
        }
        let rows = Selector::parse(rows_css).map_err(|e| ConfigError::Selector {
            key: "css_products".to_string(),
            message: e.to_string(),
        })?;

        let fields = FieldTable::build(raw.field_pairs())?;

        let price_rewrite = if raw.regex_price_old.is_empty() {
            None
        } else {
            Some(Rewrite::new(
                "regex_price_old",
                &raw.regex_price_old,
                &raw.regex_price_new,
            )?)
        };

        let url_rewrite = if raw.regex_url_new.is_empty() {
            None
        } else {
            Some(Rewrite::new(
                "regex_url_old",
                &raw.regex_url_old,
                &raw.regex_url_new,
            )?)
        };

        if !raw.minimum_porcentage_discount.is_finite() {
            return Err(ConfigError::Invalid {
                key: "minimum_porcentage_discount",
                message: "must be a finite number".to_string(),
            });
        }

        if raw.max_concurrent_fetches == Some(0) {
            return Err(ConfigError::Invalid {
                key: "max_concurrent_fetches",
                message: "must be at least 1".to_string(),
            });
        }

        let output = if raw.output.trim().is_empty() {
            PathBuf::from(DEFAULT_OUTPUT)
        } else {
            PathBuf::from(raw.output.trim())
        };

        let timeout_secs = raw
            .request_timeout_secs
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);

        Ok(Self {
            seller: raw.seller.clone(),
            start_url: start_url.to_string(),
            rows,
            fields,
            price_rewrite,
            url_rewrite,
            minimum_discount_pct: raw.minimum_porcentage_discount,
            maximum_pages: u32::try_from(raw.maximum_pages.max(0)).unwrap_or(u32::MAX),
            output,
            max_concurrent_fetches: raw.max_concurrent_fetches,
            user_agent: raw.user_agent.clone(),
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Whether products must be matched against the configured seller.
    pub fn filters_seller(&self) -> bool {
        self.fields.get(Field::ProductSeller).is_configured()
    }
}
