// src/crawl/testing.rs
// In-memory PageSource for crawl tests. Unknown URLs fail like an
// unreachable host.

use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use encoding_rs::UTF_8;
use futures::stream::{self, StreamExt};

use crate::error::CrawlError;
use crate::fetch::{Body, PageSource};

enum FakePage {
    Chunks(Vec<String>),
    Broken(Vec<String>),
    Panic,
}

#[derive(Default)]
pub struct FakeSource {
    pages: HashMap<String, FakePage>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(self, url: &str, html: &str) -> Self {
        self.chunked_page(url, &[html])
    }

    pub fn chunked_page(mut self, url: &str, chunks: &[&str]) -> Self {
        let chunks = chunks.iter().map(|c| c.to_string()).collect();
        self.pages.insert(url.to_string(), FakePage::Chunks(chunks));
        self
    }

    // Serves `chunks`, then fails the body stream
    pub fn broken_page(mut self, url: &str, chunks: &[&str]) -> Self {
        let chunks = chunks.iter().map(|c| c.to_string()).collect();
        self.pages.insert(url.to_string(), FakePage::Broken(chunks));
        self
    }

    pub fn panicking(mut self, url: &str) -> Self {
        self.pages.insert(url.to_string(), FakePage::Panic);
        self
    }
}

fn to_items(chunks: &[String]) -> Vec<Result<Bytes, CrawlError>> {
    chunks
        .iter()
        .map(|c| Ok(Bytes::from(c.clone().into_bytes())))
        .collect()
}

#[async_trait]
impl PageSource for FakeSource {
    async fn open(&self, url: &str) -> Result<Body, CrawlError> {
        // Give other tasks a chance to run, as a real network wait would.
        tokio::task::yield_now().await;

        match self.pages.get(url) {
            None => Err(CrawlError::transport(url, "connection refused")),
            Some(FakePage::Panic) => panic!("fake source told to panic on {url}"),
            Some(FakePage::Chunks(chunks)) => {
                Ok(Body::new(UTF_8, stream::iter(to_items(chunks)).boxed()))
            }
            Some(FakePage::Broken(chunks)) => {
                let mut items = to_items(chunks);
                items.push(Err(CrawlError::BodyInterrupted("connection reset".into())));
                Ok(Body::new(UTF_8, stream::iter(items).boxed()))
            }
        }
    }
}
