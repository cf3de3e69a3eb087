//! Minimal REST client for the issue tracker and the repository contents API.

use std::sync::Arc;

use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::config::TrackerConfig;
use crate::error::{Error, Result};

const API_VERSION_HEADER: &str = "X-GitHub-Api-Version";
const ACCEPT_JSON: &str = "application/vnd.github+json";

/// Body of `POST /repos/{owner}/{repo}/issues`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewIssue {
    pub title: String,
    pub body: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
}

/// The parts of a created issue worth logging.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreatedIssue {
    pub number: u64,
    #[serde(default)]
    pub html_url: Option<String>,
}

/// Body of `PUT /repos/{owner}/{repo}/contents/{path}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentUpdate {
    pub message: String,
    /// Base64 of the full new file.
    pub content: String,
    /// Blob SHA being replaced; absent when creating the file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
}

/// Result of a successful contents update.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CommitReceipt {
    pub sha: String,
    #[serde(default)]
    pub html_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentResponse {
    commit: CommitReceipt,
}

#[derive(Debug, Deserialize)]
struct FileInfo {
    sha: String,
}

/// REST client scoped to one repository.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    config: Arc<TrackerConfig>,
    repo_url: Url,
    http_client: reqwest::Client,
}

impl GitHubClient {
    /// Create a client with custom configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the API base does not parse, the token is not a
    /// valid header value, or the HTTP client cannot be built.
    pub fn with_config(config: TrackerConfig) -> Result<Self> {
        let mut base = config.api_base.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let repo_path = format!("repos/{}/{}/", config.owner, config.repo);
        let repo_url = Url::parse(&base)
            .and_then(|base| base.join(&repo_path))
            .map_err(|e| Error::invalid_url(format!("{base}{repo_path}"), e))?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_JSON));
        headers.insert(
            API_VERSION_HEADER,
            HeaderValue::from_str(&config.api_version)
                .map_err(|e| Error::client_build(e.to_string()))?,
        );
        if let Some(token) = &config.token {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| Error::client_build(e.to_string()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .build()
            .map_err(|e| Error::client_build(e.to_string()))?;

        Ok(Self {
            config: Arc::new(config),
            repo_url,
            http_client,
        })
    }

    /// Get the configuration.
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    fn endpoint(&self, suffix: &str) -> Result<Url> {
        self.repo_url
            .join(suffix)
            .map_err(|e| Error::invalid_url(suffix, e))
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        url: &Url,
    ) -> Result<T> {
        let response = request
            .send()
            .await
            .map_err(|e| Error::transport(url.as_str(), e))?;

        let status = response.status();
        debug!(url = %url, status = %status, "Tracker responded");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::api(url.as_str(), status.as_u16(), body));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| Error::invalid_response(url.as_str(), e))
    }

    /// Open an issue.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`], [`Error::Api`] or
    /// [`Error::InvalidResponse`] if the submission did not go through.
    pub async fn create_issue(&self, issue: &NewIssue) -> Result<CreatedIssue> {
        let url = self.endpoint("issues")?;
        let request = self.http_client.post(url.clone()).json(issue);
        self.send_json(request, &url).await
    }

    /// Current blob SHA of a file, or `None` if the file does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error for any failure other than a 404.
    pub async fn content_sha(&self, path: &str) -> Result<Option<String>> {
        let url = self.endpoint(&format!("contents/{path}"))?;
        let request = self.http_client.get(url.clone());

        match self.send_json::<FileInfo>(request, &url).await {
            Ok(info) => Ok(Some(info.sha)),
            Err(Error::Api { status: 404, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Replace a file in one commit.
    ///
    /// # Errors
    ///
    /// Returns an error if the commit was not made.
    pub async fn put_content(&self, path: &str, update: &ContentUpdate) -> Result<CommitReceipt> {
        let url = self.endpoint(&format!("contents/{path}"))?;
        let request = self.http_client.put(url.clone()).json(update);
        let response: ContentResponse = self.send_json(request, &url).await?;
        Ok(response.commit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> Result<GitHubClient> {
        GitHubClient::with_config(TrackerConfig::with_api_base(server.uri()).token("test-token"))
    }

    #[test]
    fn test_invalid_api_base_rejected() {
        let result = GitHubClient::with_config(TrackerConfig::with_api_base("::nope::"));
        assert!(matches!(result, Err(Error::InvalidUrl { .. })));
    }

    #[test]
    fn test_api_base_with_path_keeps_prefix() -> Result<()> {
        let client = GitHubClient::with_config(TrackerConfig::with_api_base(
            "https://ghe.example.com/api/v3",
        ))?;
        assert_eq!(
            client.endpoint("issues")?.as_str(),
            "https://ghe.example.com/api/v3/repos/username-is-required/reddark-subinfo/issues"
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_create_issue_sends_headers_and_body() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/repos/username-is-required/reddark-subinfo/issues"))
            .and(header("authorization", "Bearer test-token"))
            .and(header("x-github-api-version", "2022-11-28"))
            .and(header_exists("user-agent"))
            .and(body_json(json!({"title": "t", "body": "b"})))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(json!({"number": 7, "html_url": "https://github.com/x/7"})),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server)?;
        let created = client
            .create_issue(&NewIssue {
                title: "t".to_string(),
                body: "b".to_string(),
                labels: Vec::new(),
            })
            .await?;

        assert_eq!(created.number, 7);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_issue_error_status() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("rate limited"))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server)?;
        let result = client
            .create_issue(&NewIssue {
                title: "t".to_string(),
                body: "b".to_string(),
                labels: vec!["bot".to_string()],
            })
            .await;

        assert!(matches!(result, Err(Error::Api { status: 403, .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_content_sha_missing_file_is_none() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/username-is-required/reddark-subinfo/contents/new.json"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Not Found"})))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server)?;
        assert_eq!(client.content_sha("new.json").await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_put_content_returns_commit() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let mock_server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/repos/username-is-required/reddark-subinfo/contents/banned-subs.json"))
            .and(body_json(json!({"message": "m", "content": "e30=", "sha": "abc"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": {"sha": "def"},
                "commit": {"sha": "c0ffee", "html_url": "https://github.com/x/commit/c0ffee"}
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server)?;
        let receipt = client
            .put_content(
                "banned-subs.json",
                &ContentUpdate {
                    message: "m".to_string(),
                    content: "e30=".to_string(),
                    sha: Some("abc".to_string()),
                },
            )
            .await?;

        assert_eq!(receipt.sha, "c0ffee");
        Ok(())
    }
}
