// src/error.rs
// =============================================================================
// Error types for the crawl pipeline.
//
// None of these ever reach the aggregator: a worker task logs its error and
// turns it into an ordinary completion signal. Only `Client` can surface to
// main, because it happens before any task is launched.
// =============================================================================

use thiserror::Error;

/// Boxed error so page sources other than reqwest can report failures too.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum CrawlError {
    /// The page could not be retrieved at all (DNS, refused connection,
    /// timeout, malformed URL...). The task yields zero links.
    #[error("failed to crawl {url}")]
    Transport {
        url: String,
        #[source]
        source: BoxError,
    },

    /// The body stream broke after the response started. Links found before
    /// this point are kept.
    #[error("response body interrupted")]
    BodyInterrupted(#[source] BoxError),

    /// The aggregator dropped its receivers, so there is nobody to hand links to.
    #[error("link collector is no longer receiving")]
    CollectorGone,

    /// The HTTP client could not be constructed.
    #[error("could not build HTTP client")]
    Client(#[from] reqwest::Error),
}

impl CrawlError {
    pub fn transport(url: &str, source: impl Into<BoxError>) -> Self {
        CrawlError::Transport {
            url: url.to_string(),
            source: source.into(),
        }
    }
}
