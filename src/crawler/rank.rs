//! Ordering of collected products.

use crate::models::ProductRecord;

/// Sort by descending discount. The sort is stable, so equal discounts keep
/// their input order.
pub fn rank(mut records: Vec<ProductRecord>) -> Vec<ProductRecord> {
    records.sort_by(|a, b| b.discount_pct.total_cmp(&a.discount_pct));
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str, discount_pct: f64) -> ProductRecord {
        ProductRecord::new(
            String::new(),
            title.to_string(),
            format!("https://shop.test/{title}"),
            10.0,
            discount_pct,
        )
    }

    #[test]
    fn test_rank_descending() {
        let ranked = rank(vec![
            record("a", 10.0),
            record("b", 55.5),
            record("c", 30.0),
        ]);
        let titles: Vec<_> = ranked.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, ["b", "c", "a"]);
    }

    #[test]
    fn test_rank_ties_keep_input_order() {
        let ranked = rank(vec![
            record("first", 20.0),
            record("top", 40.0),
            record("second", 20.0),
            record("third", 20.0),
        ]);
        let titles: Vec<_> = ranked.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, ["top", "first", "second", "third"]);
    }

    #[test]
    fn test_rank_non_increasing() {
        let ranked = rank(
            [3.0, 99.0, 0.5, 42.0, 42.0, 7.25]
                .iter()
                .enumerate()
                .map(|(i, d)| record(&i.to_string(), *d))
                .collect(),
        );
        assert!(ranked
            .windows(2)
            .all(|w| w[0].discount_pct >= w[1].discount_pct));
    }

    #[test]
    fn test_rank_empty() {
        assert!(rank(Vec::new()).is_empty());
    }
}
