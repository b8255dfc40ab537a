// src/fetch/http.rs
// =============================================================================
// This module fetches pages over HTTP(S) with reqwest.
//
// Key functionality:
// - One shared Client (connection pooling) for every crawl task
// - GET request, body exposed as a stream of chunks (nothing is buffered)
// - Text encoding picked from the Content-Type charset parameter
//
// Status codes are not treated as failures: a 404 page still has a body, and
// its links are reported like any other page.
// =============================================================================

use std::time::Duration;

use async_trait::async_trait;
use encoding_rs::{Encoding, UTF_8};
use futures::StreamExt;
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::Client;
use tracing::debug;

use super::{Body, PageSource};
use crate::error::CrawlError;

/// Settings for the HTTP client, built from the command line.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Per-request timeout. `None` waits as long as the server does.
    pub timeout: Option<Duration>,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: None,
            user_agent: concat!("link-scout/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Page source backed by a reqwest `Client`.
pub struct HttpSource {
    client: Client,
}

impl HttpSource {
    pub fn new(config: &FetchConfig) -> Result<Self, CrawlError> {
        let mut builder = Client::builder().user_agent(config.user_agent.as_str());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }
}

#[async_trait]
impl PageSource for HttpSource {
    async fn open(&self, url: &str) -> Result<Body, CrawlError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CrawlError::transport(url, e))?;

        let status = response.status();
        if !status.is_success() {
            debug!(%url, %status, "non-success status, scanning body anyway");
        }

        let encoding = encoding_from_headers(response.headers());
        let chunks = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| CrawlError::BodyInterrupted(Box::new(e))))
            .boxed();

        Ok(Body::new(encoding, chunks))
    }
}

// Picks the body encoding from `Content-Type: text/html; charset=...`
//
// Unknown or missing labels fall back to UTF-8. A byte-order mark in the body
// still wins over this, see extract::decode.
fn encoding_from_headers(headers: &HeaderMap) -> &'static Encoding {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(charset_label)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or(UTF_8)
}

fn charset_label(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches('"'))
    })
}
