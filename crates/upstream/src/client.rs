//! Plain GET client for the upstream API.
//!
//! Sends the identifying `User-Agent`, enforces the request timeout and hands
//! back the raw body. Status codes are not inspected: the API reports banned
//! and private subs as JSON bodies on 4xx responses, and those bodies are
//! exactly what classification needs.

use std::sync::Arc;

use tracing::debug;
use url::Url;

use crate::config::UpstreamConfig;
use crate::error::{Error, Result};

/// Client for raw GET requests against the upstream API.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    config: Arc<UpstreamConfig>,
    base_url: Url,
    http_client: reqwest::Client,
}

impl UpstreamClient {
    /// Create a client with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new() -> Result<Self> {
        Self::with_config(UpstreamConfig::default())
    }

    /// Create a client with custom configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL does not parse or the HTTP client
    /// cannot be built.
    pub fn with_config(config: UpstreamConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| Error::invalid_url(config.base_url.clone(), e))?;

        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| Error::client_build(e.to_string()))?;

        Ok(Self {
            config: Arc::new(config),
            base_url,
            http_client,
        })
    }

    /// Resolve an absolute or API-relative URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if the URL cannot be resolved.
    pub fn resolve(&self, url: &str) -> Result<Url> {
        match Url::parse(url) {
            Ok(absolute) => Ok(absolute),
            Err(url::ParseError::RelativeUrlWithoutBase) => self
                .base_url
                .join(url)
                .map_err(|e| Error::invalid_url(url, e)),
            Err(e) => Err(Error::invalid_url(url, e)),
        }
    }

    /// GET a URL and return the body as text, whatever the status code.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if the request fails or times out, and
    /// [`Error::InvalidUrl`] if the URL cannot be resolved.
    pub async fn get_text(&self, url: &str) -> Result<String> {
        let resolved = self.resolve(url)?;

        let response = self
            .http_client
            .get(resolved.clone())
            .send()
            .await
            .map_err(|e| Error::transport(resolved.as_str(), e))?;

        let status = response.status();
        debug!(url = %resolved, status = %status, "Upstream responded");

        response
            .text()
            .await
            .map_err(|e| Error::transport(resolved.as_str(), e))
    }

    /// Get the configuration.
    pub fn config(&self) -> &UpstreamConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> std::result::Result<UpstreamClient, Box<dyn std::error::Error>> {
        let base = server.uri().parse::<Url>()?;
        Ok(UpstreamClient::with_config(UpstreamConfig::with_base_url(&base))?)
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let config = UpstreamConfig {
            base_url: "not a url".to_string(),
            ..Default::default()
        };
        let result = UpstreamClient::with_config(config);
        assert!(matches!(result, Err(Error::InvalidUrl { .. })));
    }

    #[tokio::test]
    async fn test_resolve_relative_and_absolute() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let client = UpstreamClient::new()?;

        let relative = client.resolve("/r/pics.json")?;
        assert_eq!(relative.as_str(), "https://www.reddit.com/r/pics.json");

        let absolute = client.resolve("https://example.com/banned-subs.json")?;
        assert_eq!(absolute.as_str(), "https://example.com/banned-subs.json");
        Ok(())
    }

    #[tokio::test]
    async fn test_get_text_sends_user_agent() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/r/pics.json"))
            .and(header(
                "user-agent",
                UpstreamConfig::default().user_agent.as_str(),
            ))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"data":{}}"#))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server).await?;
        let body = client.get_text("/r/pics.json").await?;

        assert_eq!(body, r#"{"data":{}}"#);
        Ok(())
    }

    #[tokio::test]
    async fn test_get_text_returns_body_on_error_status() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/r/gone.json"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_string(r#"{"reason":"banned","message":"Not Found","error":404}"#),
            )
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server).await?;
        let body = client.get_text("/r/gone.json").await?;

        assert!(body.contains("banned"));
        Ok(())
    }

    #[tokio::test]
    async fn test_get_text_timeout_is_transport_error() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/slow.json"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(10)))
            .mount(&mock_server)
            .await;

        let base = mock_server.uri().parse::<Url>()?;
        let config = UpstreamConfig::with_base_url(&base).timeout(Duration::from_millis(100));
        let client = UpstreamClient::with_config(config)?;

        let result = client.get_text("/slow.json").await;

        assert!(result.as_ref().is_err_and(Error::is_transport));
        Ok(())
    }
}
