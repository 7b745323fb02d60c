//! Listing rows and finished product records.

use serde::Serialize;

/// One product summary scanned from a listing page.
///
/// Lives only long enough to decide whether the product page is worth
/// fetching.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingRow {
    /// List price (0 when absent).
    pub price: f64,
    /// Discounted price (0 when absent).
    pub final_price: f64,
    /// Product page URL, rewritten and resolved.
    pub url: String,
}

impl ListingRow {
    /// Discount of the final price against the list price, in percent.
    ///
    /// Returns `None` when the row carries no usable discount: a missing
    /// final price, a missing list price, or any non-finite result.
    pub fn discount_pct(&self) -> Option<f64> {
        if self.final_price <= 0.0 || self.price == 0.0 {
            return None;
        }

        let pct = ((self.final_price * 100.0) / self.price - 100.0).abs();
        pct.is_finite().then_some(pct)
    }
}

/// A fully extracted product, the unit of report output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductRecord {
    pub image: String,
    pub title: String,
    pub url: String,
    pub price: f64,
    pub discount_pct: f64,
}

impl ProductRecord {
    pub fn new(image: String, title: String, url: String, price: f64, discount_pct: f64) -> Self {
        Self {
            image,
            title,
            url,
            price,
            discount_pct,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(price: f64, final_price: f64) -> ListingRow {
        ListingRow {
            price,
            final_price,
            url: "https://shop.test/p/1".to_string(),
        }
    }

    #[test]
    fn test_discount_pct_basic() {
        let pct = row(200.0, 150.0).discount_pct().unwrap();
        assert!((pct - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_discount_pct_is_absolute() {
        // final above list price still reports the magnitude
        let pct = row(100.0, 120.0).discount_pct().unwrap();
        assert!((pct - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_discount_pct_missing_final_price() {
        assert_eq!(row(100.0, 0.0).discount_pct(), None);
        assert_eq!(row(100.0, -5.0).discount_pct(), None);
    }

    #[test]
    fn test_discount_pct_zero_list_price() {
        assert_eq!(row(0.0, 50.0).discount_pct(), None);
    }

    #[test]
    fn test_discount_pct_nan_input() {
        assert_eq!(row(f64::NAN, 50.0).discount_pct(), None);
    }
}
