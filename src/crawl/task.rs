// src/crawl/task.rs
// =============================================================================
// One crawl task: fetch a single seed page and hand its links to the
// aggregator.
//
// Lifecycle:
// 1. Open the page through the PageSource
// 2. Feed each body chunk to a LinkExtractor
// 3. Send every link found to the link channel, as soon as it is found
// 4. Send exactly one Completion, whatever happened above
//
// Step 4 is what lets the aggregator stop counting. It runs after the work
// future returns, errors and panics included.
// =============================================================================

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::{FutureExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use crate::error::CrawlError;
use crate::extract::{DiscoveredLink, LinkExtractor};
use crate::fetch::PageSource;

/// Completion signal for one task.
///
/// It says which seed finished and how many links it handed off. Whether the
/// fetch succeeded is deliberately not part of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub seed: String,
    pub emitted: usize,
}

// Sending half of the link channel, counting what goes through it
struct Emitter {
    links: mpsc::Sender<DiscoveredLink>,
    emitted: usize,
}

impl Emitter {
    // Waits until the aggregator has room for the link
    async fn emit(&mut self, link: DiscoveredLink) -> Result<(), CrawlError> {
        self.links
            .send(link)
            .await
            .map_err(|_| CrawlError::CollectorGone)?;
        self.emitted += 1;
        Ok(())
    }
}

/// Runs one task to the end. Always sends one `Completion` on `done`.
pub async fn run_task(
    source: Arc<dyn PageSource>,
    seed: String,
    links: mpsc::Sender<DiscoveredLink>,
    done: mpsc::Sender<Completion>,
) {
    let mut emitter = Emitter { links, emitted: 0 };

    let outcome = AssertUnwindSafe(crawl_page(source.as_ref(), &seed, &mut emitter))
        .catch_unwind()
        .await;

    match outcome {
        Ok(Ok(())) => debug!(url = %seed, links = emitter.emitted, "page done"),
        Ok(Err(CrawlError::CollectorGone)) => {
            debug!(url = %seed, "collector stopped listening, ending early")
        }
        Ok(Err(e)) => {
            let cause = std::error::Error::source(&e)
                .map(|s| s.to_string())
                .unwrap_or_default();
            error!(url = %seed, cause = %cause, "failed to crawl");
        }
        Err(_) => error!(url = %seed, "crawl task panicked"),
    }

    // The link sender goes away before the completion is sent.
    let Emitter { links, emitted } = emitter;
    drop(links);

    if done.send(Completion { seed, emitted }).await.is_err() {
        debug!("collector gone before completion could be delivered");
    }
}

// Fetches and tokenizes one page
//
// Returns Ok(()) both when the body ends normally and when it breaks off
// mid-stream; in the second case the links found so far have already been
// sent. The body is dropped (and the connection released) on return.
async fn crawl_page(
    source: &dyn PageSource,
    url: &str,
    emitter: &mut Emitter,
) -> Result<(), CrawlError> {
    let body = source.open(url).await?;
    let mut chunks = body.chunks;
    let mut extractor = LinkExtractor::new(body.encoding);

    while let Some(chunk) = chunks.next().await {
        match chunk {
            Ok(bytes) => {
                for link in extractor.feed(&bytes) {
                    emitter.emit(link).await?;
                }
            }
            Err(e) => {
                warn!(%url, error = %e, "body ended early, keeping links found so far");
                break;
            }
        }
    }
    drop(chunks);

    let (rest, parse_errors) = extractor.finish();
    if parse_errors > 0 {
        debug!(%url, parse_errors, "tokenizer recovered from malformed markup");
    }
    for link in rest {
        emitter.emit(link).await?;
    }

    Ok(())
}
