//! Network transport used by the offline worker.
//!
//! The worker never talks to reqwest directly; it goes through the
//! `Network` trait so tests can substitute an in-memory transport.

use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use reqwest::{header, Client, Url};
use thiserror::Error;
use tracing::debug;

/// How a request interacts with HTTP caches between us and the origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheMode {
    #[default]
    Default,
    /// Bypass intermediate HTTP caches (`Cache-Control: no-store`).
    NoStore,
}

/// A GET request for one of the app's resources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub url: Url,
    pub cache: CacheMode,
}

impl Request {
    pub fn get(url: Url) -> Self {
        Self {
            url,
            cache: CacheMode::Default,
        }
    }

    pub fn with_cache(mut self, cache: CacheMode) -> Self {
        self.cache = cache;
        self
    }

    /// Key under which this request's response is stored.
    /// Fragments never reach the server, so they are not part of the key.
    pub fn cache_key(&self) -> String {
        let mut url = self.url.clone();
        url.set_fragment(None);
        url.to_string()
    }
}

/// Where a response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
    Network,
    Cache { cached_at: DateTime<Utc> },
}

impl ResponseSource {
    pub fn is_cache(&self) -> bool {
        matches!(self, ResponseSource::Cache { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
    pub source: ResponseSource,
}

impl Response {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Transport-level failure. An HTTP error status is a response, not an error.
#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Network unreachable: {0}")]
    Unreachable(String),
}

/// Something that can fetch a request from the origin.
pub trait Network: Send + Sync + 'static {
    fn fetch(&self, request: &Request)
        -> impl Future<Output = Result<Response, NetworkError>> + Send;
}

/// `Network` over HTTP.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct HttpNetwork {
    client: Client,
}

impl HttpNetwork {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("macroterm/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }
}

impl Network for HttpNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response, NetworkError> {
        let mut builder = self.client.get(request.url.clone());
        if request.cache == CacheMode::NoStore {
            builder = builder
                .header(header::CACHE_CONTROL, "no-store")
                .header(header::PRAGMA, "no-cache");
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?.to_vec();

        debug!(url = %request.url, status, bytes = body.len(), "Network response");

        Ok(Response {
            status,
            content_type,
            body,
            source: ResponseSource::Network,
        })
    }
}
