//! JSON fetching with unbounded fixed-delay retry.
//!
//! The upstream API regularly answers with HTML error pages or an "overloaded"
//! JSON envelope for a few seconds at a time. Both are retried after a fixed
//! delay for as long as it takes; a sub is never skipped because the API was
//! briefly unhappy.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::client::UpstreamClient;
use crate::error::{Error, Result};

/// Anything that can hand back a parsed JSON document for a URL.
#[async_trait]
pub trait JsonSource: Send + Sync {
    /// Fetch and parse the document at `url`.
    async fn fetch_json(&self, url: &str) -> Result<Value>;
}

/// Why a body was not accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// The body did not parse as JSON.
    MalformedJson(String),
    /// The body was the `{message, error: 500}` overload envelope.
    Overloaded,
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedJson(reason) => write!(f, "bad JSON: {reason}"),
            Self::Overloaded => write!(f, "upstream overloaded"),
        }
    }
}

/// Decide whether a response body is usable.
///
/// Anything that parses and is not the overload envelope is accepted as-is,
/// whatever its shape.
pub fn accept_body(body: &str) -> std::result::Result<Value, Rejection> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| Rejection::MalformedJson(e.to_string()))?;

    if is_overload_envelope(&value) {
        return Err(Rejection::Overloaded);
    }

    Ok(value)
}

/// The upstream's "try again later" envelope: a `message` key and `error: 500`.
///
/// The code is matched loosely: `500`, `500.0` and `"500"` all count.
pub fn is_overload_envelope(value: &Value) -> bool {
    value.get("message").is_some() && value.get("error").is_some_and(is_server_error_code)
}

fn is_server_error_code(code: &Value) -> bool {
    let numeric = match code {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    numeric.is_some_and(|n| (n - 500.0).abs() < f64::EPSILON)
}

/// Wraps [`UpstreamClient`] with parse-and-retry.
#[derive(Debug, Clone)]
pub struct ResilientFetcher {
    client: UpstreamClient,
    retry_delay: Duration,
}

impl ResilientFetcher {
    /// Create a fetcher using the client's configured retry delay.
    pub fn new(client: UpstreamClient) -> Self {
        let retry_delay = client.config().retry_delay;
        Self {
            client,
            retry_delay,
        }
    }

    /// Override the retry delay.
    #[must_use]
    pub const fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub const fn client(&self) -> &UpstreamClient {
        &self.client
    }

    /// Fetch a URL until the body parses and is not the overload envelope.
    ///
    /// There is no attempt cap and the delay does not grow.
    ///
    /// # Errors
    ///
    /// Returns transport and URL errors from the client unchanged; those are
    /// not retried.
    pub async fn fetch_json(&self, url: &str) -> Result<Value> {
        let mut attempt = 0u64;

        loop {
            attempt = attempt.saturating_add(1);
            let body = self.client.get_text(url).await?;

            match accept_body(&body) {
                Ok(value) => {
                    debug!(url, attempt, "Fetched JSON");
                    return Ok(value);
                }
                Err(rejection) => {
                    warn!(
                        url,
                        attempt,
                        delay_ms = u64::try_from(self.retry_delay.as_millis()).unwrap_or(u64::MAX),
                        reason = %rejection,
                        "Request errored, will retry"
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
            }
        }
    }
}

#[async_trait]
impl JsonSource for ResilientFetcher {
    async fn fetch_json(&self, url: &str) -> Result<Value> {
        Self::fetch_json(self, url).await
    }
}

/// Fetch a document and decode it into `T`.
///
/// # Errors
///
/// Returns fetch errors unchanged, and [`Error::InvalidPayload`] if the JSON
/// does not have the shape of `T`. Shape errors are not retried.
pub async fn fetch_document<T: DeserializeOwned>(source: &dyn JsonSource, url: &str) -> Result<T> {
    let value = source.fetch_json(url).await?;
    serde_json::from_value(value).map_err(|e| Error::invalid_payload(url, e.to_string()))
}
