//! Value normalization for extracted strings, prices and URLs.

use url::Url;

use super::ExtractError;
use crate::config::Rewrite;

/// Strip newlines and carriage returns, then trim surrounding whitespace.
pub fn clear_string(value: &str) -> String {
    value.replace(['\n', '\r'], "").trim().to_string()
}

/// Parse price text into a number.
///
/// Empty text means "no price" and yields 0. Otherwise the text goes through
/// the configured substitution and must parse as a float; a failure here means
/// the selector or pattern is wrong for the site and is reported as an error.
/// Infinite and NaN values are rejected the same way.
pub fn parse_price(raw: &str, rewrite: Option<&Rewrite>) -> Result<f64, ExtractError> {
    if raw.is_empty() {
        return Ok(0.0);
    }

    let rewritten = match rewrite {
        Some(rewrite) => rewrite.apply(raw),
        None => raw.to_string(),
    };

    let price = rewritten
        .trim()
        .parse::<f64>()
        .map_err(|source| ExtractError::Price {
            raw: raw.to_string(),
            rewritten: rewritten.clone(),
            source,
        })?;

    // "inf" and "NaN" parse as floats but are never prices.
    if !price.is_finite() {
        return Err(ExtractError::NonFinitePrice {
            raw: raw.to_string(),
        });
    }
    Ok(price)
}

/// Apply the URL substitution, if one is configured.
pub fn rewrite_url(raw: &str, rewrite: Option<&Rewrite>) -> String {
    match rewrite {
        Some(rewrite) if !raw.is_empty() => rewrite.apply(raw),
        _ => raw.to_string(),
    }
}

/// Resolve a possibly relative URL against the page it was found on.
///
/// Absolute and empty values are returned unchanged, as is anything that
/// cannot be joined.
pub fn resolve_url(base: &str, raw: &str) -> String {
    if raw.is_empty() || Url::parse(raw).is_ok() {
        return raw.to_string();
    }

    match Url::parse(base).and_then(|base| base.join(raw)) {
        Ok(url) => url.to_string(),
        Err(_) => raw.to_string(),
    }
}

fn normalize_seller(seller: &str) -> String {
    clear_string(seller).to_lowercase()
}

/// Case-insensitive seller comparison ignoring surrounding whitespace and
/// line endings.
pub fn compare_seller(a: &str, b: &str) -> bool {
    normalize_seller(a) == normalize_seller(b)
}
