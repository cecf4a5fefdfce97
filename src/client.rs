//! HTTP transport used by the measurement engine
//!
//! Every request carries a fresh `cb=<epoch ms>` query parameter and
//! `Cache-Control: no-store` so intermediaries never answer from cache.

#[cfg(test)]
mod integration_tests;

use crate::error::{AppError, Result};
use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt, TryStreamExt};
use reqwest::{header, Client, StatusCode, Url};
use std::pin::Pin;

/// Body chunks as they arrive off the wire
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// HTTP transport trait for abstraction and testing
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Issue a lightweight request and return the status code.
    ///
    /// Any completed response counts, whatever its status; only transport
    /// failures are errors.
    async fn probe(&self, url: &str) -> Result<u16>;

    /// Open a GET request and hand back its body as a chunk stream.
    ///
    /// Fails on non-success status codes and on responses that cannot carry
    /// a body.
    async fn stream(&self, url: &str) -> Result<ByteStream>;
}

/// `reqwest`-backed transport
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a new transport
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(format!("{}/{}", crate::PKG_NAME, crate::VERSION))
            .no_gzip()
            .build()
            .map_err(|e| AppError::network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    fn get(&self, url: &str) -> Result<reqwest::RequestBuilder> {
        let url = HttpUtils::cache_busted(url)?;
        Ok(self
            .client
            .get(url)
            .header(header::CACHE_CONTROL, "no-store")
            .header(header::PRAGMA, "no-cache"))
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn probe(&self, url: &str) -> Result<u16> {
        let response = self.get(url)?.send().await?;
        let status = response.status().as_u16();
        tracing::debug!(url, status, "probe answered");
        Ok(status)
    }

    async fn stream(&self, url: &str) -> Result<ByteStream> {
        let response = self.get(url)?.send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(AppError::http_request(format!(
                "Server answered {} for {}",
                status, url
            )));
        }

        if status == StatusCode::NO_CONTENT || response.content_length() == Some(0) {
            return Err(AppError::http_request(format!("Response from {} has no body", url)));
        }

        tracing::debug!(url, status = status.as_u16(), length = ?response.content_length(), "download stream opened");

        let body = response.bytes_stream().map_err(AppError::from);
        Ok(body.boxed())
    }
}

/// Utility functions for HTTP operations
pub struct HttpUtils;

impl HttpUtils {
    /// Attach `cb=<epoch ms>`, replacing any existing `cb` parameter
    pub fn cache_busted(url: &str) -> Result<Url> {
        Self::with_cache_buster(url, chrono::Utc::now().timestamp_millis())
    }

    /// Attach a specific cache-buster value
    pub fn with_cache_buster(url: &str, value: i64) -> Result<Url> {
        let mut parsed = Url::parse(url)
            .map_err(|e| AppError::parse(format!("Invalid URL '{}': {}", url, e)))?;

        let kept: Vec<(String, String)> = parsed
            .query_pairs()
            .filter(|(key, _)| key != "cb")
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();

        {
            let mut query = parsed.query_pairs_mut();
            query.clear();
            for (key, value) in &kept {
                query.append_pair(key, value);
            }
            query.append_pair("cb", &value.to_string());
        }

        Ok(parsed)
    }

    /// Check if a URL is valid for HTTP requests
    pub fn is_valid_http_url(url: &str) -> bool {
        match Url::parse(url) {
            Ok(parsed) => parsed.scheme() == "http" || parsed.scheme() == "https",
            Err(_) => false,
        }
    }
}
