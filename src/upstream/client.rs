//! HTTP client for the upstream analysis API.
//!
//! # Responsibilities
//! - Hold the credential-bearing endpoint URL
//! - Forward a JSON document with connect and request timeouts
//! - Classify failures (timeout, network, invalid JSON)

use std::time::{Duration, Instant};

use axum::http::StatusCode;
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::config::{LimitsConfig, TimeoutConfig, UpstreamConfig};
use crate::observability::metrics;

/// Errors that can occur while talking to the upstream.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The upstream did not answer within the configured deadline.
    #[error("upstream did not respond within {0} seconds")]
    Timeout(u64),

    /// No connection to the upstream could be established in time.
    #[error("upstream did not accept a connection within {0} seconds")]
    ConnectTimeout(u64),

    /// Connection or transport failure.
    #[error("upstream request failed: {0}")]
    Unreachable(#[source] reqwest::Error),

    /// The upstream answered with a body that is not JSON.
    #[error("upstream returned a non-JSON body (status {status})")]
    InvalidJson { status: StatusCode },

    /// The upstream body exceeded the configured size cap.
    #[error("upstream response exceeded {limit} bytes")]
    ResponseTooLarge { limit: usize },

    /// The client or endpoint could not be constructed.
    #[error("invalid upstream configuration: {0}")]
    Build(String),
}

/// A successful upstream round trip.
#[derive(Debug, Clone)]
pub struct UpstreamReply {
    /// Status returned by the upstream, mirrored to the caller.
    pub status: StatusCode,
    /// Parsed response document.
    pub body: Value,
}

/// Relay's handle on the upstream API.
#[derive(Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    /// Endpoint including the credential query parameter.
    endpoint: Url,
    connect_timeout_secs: u64,
    timeout_secs: u64,
    max_response_bytes: usize,
}

impl UpstreamClient {
    /// Create a new upstream client.
    pub fn new(
        upstream: &UpstreamConfig,
        timeouts: &TimeoutConfig,
        limits: &LimitsConfig,
    ) -> Result<Self, UpstreamError> {
        let mut endpoint = Url::parse(&upstream.url)
            .map_err(|e| UpstreamError::Build(format!("invalid URL '{}': {}", upstream.url, e)))?;
        endpoint
            .query_pairs_mut()
            .append_pair(&upstream.key_param, &upstream.api_key);

        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .timeout(Duration::from_secs(timeouts.upstream_secs))
            .build()
            .map_err(|e| UpstreamError::Build(e.to_string()))?;

        tracing::info!(
            endpoint = %redacted(&endpoint),
            timeout_secs = timeouts.upstream_secs,
            "Upstream client initialized"
        );

        Ok(Self {
            http,
            endpoint,
            connect_timeout_secs: timeouts.connect_secs,
            timeout_secs: timeouts.upstream_secs,
            max_response_bytes: limits.max_upstream_body_bytes,
        })
    }

    /// Forward `body` to the upstream and return its JSON answer.
    pub async fn forward(&self, body: &Value) -> Result<UpstreamReply, UpstreamError> {
        let start = Instant::now();

        let mut response = self
            .http
            .post(self.endpoint.clone())
            .json(body)
            .send()
            .await
            .map_err(|e| self.classify(e, start))?;

        let status = response.status();
        if response
            .content_length()
            .is_some_and(|len| len > self.max_response_bytes as u64)
        {
            return Err(self.oversized(start));
        }

        // Content-Length may be absent or wrong, so the cap is enforced per chunk too
        let mut bytes = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| self.classify(e, start))? {
            if bytes.len() + chunk.len() > self.max_response_bytes {
                return Err(self.oversized(start));
            }
            bytes.extend_from_slice(&chunk);
        }

        let body = serde_json::from_slice::<Value>(&bytes).map_err(|e| {
            tracing::warn!(status = %status, error = %e, "Upstream body is not JSON");
            metrics::record_upstream("invalid_json", start);
            UpstreamError::InvalidJson { status }
        })?;

        tracing::debug!(status = %status, elapsed_ms = start.elapsed().as_millis() as u64, "Upstream replied");
        metrics::record_upstream(if status.is_success() { "ok" } else { "error_status" }, start);

        Ok(UpstreamReply { status, body })
    }

    /// The endpoint with the credential stripped, for logs.
    pub fn endpoint_for_logs(&self) -> String {
        redacted(&self.endpoint)
    }

    fn oversized(&self, start: Instant) -> UpstreamError {
        tracing::warn!(limit = self.max_response_bytes, "Upstream response too large");
        metrics::record_upstream("too_large", start);
        UpstreamError::ResponseTooLarge {
            limit: self.max_response_bytes,
        }
    }

    fn classify(&self, err: reqwest::Error, start: Instant) -> UpstreamError {
        let elapsed_ms = start.elapsed().as_millis() as u64;
        if err.is_timeout() && err.is_connect() {
            tracing::error!(elapsed_ms, "Upstream connect timed out");
            metrics::record_upstream("connect_timeout", start);
            UpstreamError::ConnectTimeout(self.connect_timeout_secs)
        } else if err.is_timeout() {
            tracing::error!(elapsed_ms, "Upstream timed out");
            metrics::record_upstream("timeout", start);
            UpstreamError::Timeout(self.timeout_secs)
        } else {
            // reqwest includes the URL (and so the key) in its Display output
            let err = err.without_url();
            tracing::error!(error = %err, "Upstream unreachable");
            metrics::record_upstream("unreachable", start);
            UpstreamError::Unreachable(err)
        }
    }
}

fn redacted(url: &Url) -> String {
    let mut url = url.clone();
    url.set_query(None);
    url.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(url: &str) -> UpstreamConfig {
        UpstreamConfig {
            url: url.to_string(),
            key_param: "key".to_string(),
            api_key: "s3cr3t&x".to_string(),
        }
    }

    #[test]
    fn test_endpoint_carries_encoded_key() {
        let client = UpstreamClient::new(
            &config("https://language.googleapis.com/v1/documents:analyzeSyntax"),
            &TimeoutConfig::default(),
            &LimitsConfig::default(),
        )
        .unwrap();

        assert_eq!(
            client.endpoint.as_str(),
            "https://language.googleapis.com/v1/documents:analyzeSyntax?key=s3cr3t%26x"
        );
        assert_eq!(
            client.endpoint_for_logs(),
            "https://language.googleapis.com/v1/documents:analyzeSyntax"
        );
    }

    #[test]
    fn test_invalid_url_rejected() {
        let result = UpstreamClient::new(
            &config("not a url"),
            &TimeoutConfig::default(),
            &LimitsConfig::default(),
        );
        assert!(matches!(result, Err(UpstreamError::Build(_))));
    }

    #[tokio::test]
    async fn test_unreachable_upstream() {
        // Port 9 (discard) on localhost is expected to refuse connections
        let client = UpstreamClient::new(
            &config("http://127.0.0.1:9/analyze"),
            &TimeoutConfig::default(),
            &LimitsConfig::default(),
        )
        .unwrap();
        let result = client.forward(&serde_json::json!({"a": 1})).await;

        match result {
            Err(UpstreamError::Unreachable(e)) => assert!(!e.to_string().contains("s3cr3t")),
            other => panic!("expected Unreachable, got {:?}", other.map(|r| r.status)),
        }
    }

    #[test]
    fn test_timeout_messages_name_their_own_deadline() {
        assert_eq!(
            UpstreamError::ConnectTimeout(5).to_string(),
            "upstream did not accept a connection within 5 seconds"
        );
        assert_eq!(
            UpstreamError::Timeout(10).to_string(),
            "upstream did not respond within 10 seconds"
        );
    }
}
