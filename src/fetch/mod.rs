// src/fetch/mod.rs
// =============================================================================
// This module turns a URL into a stream of body bytes.
//
// Submodules:
// - http: the real implementation, backed by reqwest
//
// The crawl tasks only see the `PageSource` trait, so tests can hand them an
// in-memory source instead of a network client.
// =============================================================================

mod http;

use async_trait::async_trait;
use bytes::Bytes;
use encoding_rs::Encoding;
use futures::stream::BoxStream;

use crate::error::CrawlError;

pub use http::{FetchConfig, HttpSource};

/// The chunks of a response body, in arrival order.
pub type BodyStream = BoxStream<'static, Result<Bytes, CrawlError>>;

/// An opened page: the declared text encoding plus the body chunks.
///
/// Dropping a `Body` releases the underlying response.
pub struct Body {
    pub encoding: &'static Encoding,
    pub chunks: BodyStream,
}

impl Body {
    pub fn new(encoding: &'static Encoding, chunks: BodyStream) -> Self {
        Self { encoding, chunks }
    }
}

/// Anything that can open a page by URL.
///
/// `open` resolves once the response has started; the body itself is read
/// lazily through `Body::chunks`.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn open(&self, url: &str) -> Result<Body, CrawlError>;
}
