//! Product page fetching.

use std::sync::Arc;

use scraper::Html;
use tracing::debug;

use super::events::{CrawlEvent, EventSink, SkipReason};
use super::CrawlError;
use crate::config::Field;
use crate::extract::normalize::compare_seller;
use crate::extract::{ExtractError, FieldExtractor};
use crate::loader::PageLoader;
use crate::models::ProductRecord;

/// Loads one product page and turns it into a [`ProductRecord`].
pub struct ProductFetcher {
    extractor: FieldExtractor,
    loader: Arc<dyn PageLoader>,
    events: EventSink,
}

impl ProductFetcher {
    pub(crate) fn new(
        extractor: FieldExtractor,
        loader: Arc<dyn PageLoader>,
        events: EventSink,
    ) -> Self {
        Self {
            extractor,
            loader,
            events,
        }
    }

    /// Fetch the product at `url`, carrying the discount computed from the
    /// listing.
    ///
    /// Returns `Ok(None)` when the URL is empty, the page cannot be loaded, or
    /// the seller does not match. Only an unparseable price is an error.
    pub async fn fetch(
        &self,
        url: &str,
        discount_pct: f64,
    ) -> Result<Option<ProductRecord>, CrawlError> {
        if url.is_empty() {
            self.skipped(url, SkipReason::EmptyUrl);
            return Ok(None);
        }

        let body = match self.loader.load(url).await {
            Ok(body) => body,
            Err(e) => {
                debug!("Product fetch failed for {}: {}", url, e);
                self.skipped(url, SkipReason::LoadFailed);
                return Ok(None);
            }
        };

        let record = self.extract_product(&body, url, discount_pct)?;
        if record.is_none() {
            self.skipped(url, SkipReason::SellerMismatch);
        }

        Ok(record)
    }

    fn extract_product(
        &self,
        body: &str,
        url: &str,
        discount_pct: f64,
    ) -> Result<Option<ProductRecord>, ExtractError> {
        let document = Html::parse_document(body);
        let root = document.root_element();
        let config = self.extractor.config();

        if config.filters_seller() {
            let seller = self.extractor.text(Field::ProductSeller, root);
            if !compare_seller(&seller, &config.seller) {
                debug!("Seller {:?} does not match for {}", seller, url);
                return Ok(None);
            }
        }

        let image = self.extractor.url(Field::ProductImage, root, url);
        let title = self.extractor.text(Field::ProductTitle, root);
        let price = self.extractor.price(Field::ProductPrice, root)?;

        Ok(Some(ProductRecord::new(
            image,
            title,
            url.to_string(),
            price,
            discount_pct,
        )))
    }

    fn skipped(&self, url: &str, reason: SkipReason) {
        self.events.emit(CrawlEvent::ProductSkipped {
            url: url.to_string(),
            reason,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CrawlConfig;
    use crate::loader::LoadError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use tokio::sync::mpsc;

    struct Pages(HashMap<String, String>);

    #[async_trait]
    impl PageLoader for Pages {
        async fn load(&self, url: &str) -> Result<String, LoadError> {
            self.0
                .get(url)
                .cloned()
                .ok_or_else(|| LoadError::Unavailable(url.to_string()))
        }
    }

    const KETTLE: &str = r#"<html><body>
        <h1>Blue Kettle</h1>
        <span class="seller"> ACME
        </span>
        <span class="price">$ 39.90</span>
        <img class="main" src="/img/kettle.png">
    </body></html>"#;

    fn fetcher(seller_selector: &str, events: EventSink) -> ProductFetcher {
        let json = serde_json::json!({
            "seller": "acme",
            "url": "https://shop.test/list",
            "css_products": "li",
            "css_product_seller": seller_selector,
            "css_product_title": "h1",
            "css_product_price": ".price",
            "css_product_image": "img.main",
            "css_product_image_attribute": "src",
            "regex_price_old": "[$ ]",
            "regex_price_new": ""
        });
        let config = Arc::new(CrawlConfig::from_json(&json.to_string()).unwrap());
        let mut pages = HashMap::new();
        pages.insert("https://shop.test/p/kettle".to_string(), KETTLE.to_string());
        pages.insert(
            "https://shop.test/p/other".to_string(),
            KETTLE.replace("ACME", "Globex"),
        );
        pages.insert(
            "https://shop.test/p/broken".to_string(),
            KETTLE.replace("$ 39.90", "sold out"),
        );
        ProductFetcher::new(FieldExtractor::new(config), Arc::new(Pages(pages)), events)
    }

    #[tokio::test]
    async fn test_fetch_builds_record() {
        let fetcher = fetcher(".seller", EventSink::default());
        let record = fetcher
            .fetch("https://shop.test/p/kettle", 25.0)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(record.title, "Blue Kettle");
        assert_eq!(record.url, "https://shop.test/p/kettle");
        assert_eq!(record.image, "https://shop.test/img/kettle.png");
        assert!((record.price - 39.90).abs() < 1e-9);
        assert_eq!(record.discount_pct, 25.0);
    }

    #[tokio::test]
    async fn test_seller_mismatch_filtered() {
        let (tx, mut rx) = mpsc::channel(8);
        let fetcher = fetcher(".seller", EventSink::new(tx));
        let record = fetcher
            .fetch("https://shop.test/p/other", 25.0)
            .await
            .unwrap();
        assert!(record.is_none());
        assert_eq!(
            rx.recv().await,
            Some(CrawlEvent::ProductSkipped {
                url: "https://shop.test/p/other".to_string(),
                reason: SkipReason::SellerMismatch,
            })
        );
    }

    #[tokio::test]
    async fn test_no_seller_selector_skips_filter() {
        let fetcher = fetcher("", EventSink::default());
        let record = fetcher
            .fetch("https://shop.test/p/other", 25.0)
            .await
            .unwrap();
        assert!(record.is_some());
    }

    #[tokio::test]
    async fn test_empty_url_is_noop() {
        let fetcher = fetcher(".seller", EventSink::default());
        assert!(fetcher.fetch("", 50.0).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_load_failure_is_skip() {
        let (tx, mut rx) = mpsc::channel(8);
        let fetcher = fetcher(".seller", EventSink::new(tx));
        let record = fetcher
            .fetch("https://shop.test/p/missing", 50.0)
            .await
            .unwrap();
        assert!(record.is_none());
        assert!(matches!(
            rx.recv().await,
            Some(CrawlEvent::ProductSkipped {
                reason: SkipReason::LoadFailed,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_unparseable_price_is_error() {
        let fetcher = fetcher(".seller", EventSink::default());
        let err = fetcher
            .fetch("https://shop.test/p/broken", 50.0)
            .await
            .unwrap_err();
        assert!(matches!(err, CrawlError::Extract(_)));
    }
}
