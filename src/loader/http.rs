//! HTTP page loader backed by reqwest.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::debug;

use super::{resolve_user_agent, LoadError, PageLoader};
use crate::config::CrawlConfig;

/// Loads pages over HTTP. Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct HttpLoader {
    client: Client,
}

impl HttpLoader {
    /// Create a loader with the given timeout and user agent configuration.
    pub fn new(timeout: Duration, user_agent_config: Option<&str>) -> Result<Self, LoadError> {
        let user_agent = resolve_user_agent(user_agent_config);
        let client = Client::builder()
            .user_agent(&user_agent)
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self { client })
    }

    pub fn from_config(config: &CrawlConfig) -> Result<Self, LoadError> {
        Self::new(config.request_timeout, config.user_agent.as_deref())
    }
}

#[async_trait]
impl PageLoader for HttpLoader {
    async fn load(&self, url: &str) -> Result<String, LoadError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        debug!("GET {} -> {}", url, status.as_u16());

        if status != StatusCode::OK {
            return Err(LoadError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn loader() -> HttpLoader {
        HttpLoader::new(Duration::from_secs(5), Some("PriceBot/2.0")).unwrap()
    }

    #[tokio::test]
    async fn test_load_ok() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/list"))
            .and(header("user-agent", "PriceBot/2.0"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<ul></ul>"))
            .mount(&server)
            .await;

        let body = loader()
            .load(&format!("{}/list", server.uri()))
            .await
            .unwrap();
        assert_eq!(body, "<ul></ul>");
    }

    #[tokio::test]
    async fn test_non_200_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/gone"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = loader()
            .load(&format!("{}/gone", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, LoadError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_other_success_status_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let err = loader().load(&server.uri()).await.unwrap_err();
        assert!(matches!(err, LoadError::Status { status: 204, .. }));
    }

    #[tokio::test]
    async fn test_transport_failure_is_error() {
        let err = loader()
            .load("http://127.0.0.1:1/unreachable")
            .await
            .unwrap_err();
        assert!(matches!(err, LoadError::Request(_)));
    }
}
