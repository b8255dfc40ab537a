// src/crawl/aggregator.rs
// =============================================================================
// This module runs the crawl: one task per seed, one loop collecting results.
//
// How it works:
// 1. Create two channels: one for links, one for completion signals
// 2. Spawn a crawl task per seed URL, all at once
// 3. Loop: take whichever message arrives next
//    - a link goes into the result set (duplicates collapse)
//    - a completion bumps the counter
// 4. Stop when every task has reported completion
//
// Only this loop touches the result set and the counter, so no locks are
// needed. Tasks talk to it purely through the channels.
//
// The tasks run on a LocalSet: html5ever's buffers are not Send, so every task
// stays on the thread that drives the loop. Network waits still overlap.
// =============================================================================

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::LocalSet;
use tracing::{debug, info, warn};

use super::report::CrawlReport;
use super::task::{run_task, Completion};
use crate::extract::DiscoveredLink;
use crate::fetch::PageSource;

// Capacity of both channels. This is a one-slot buffer, not a rendezvous: a
// send returns once the message is queued. Links still land before their
// task's completion is counted because the select prefers links and the link
// channel is drained after the loop.
const HANDOFF_CAPACITY: usize = 1;

/// Where the collector is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectorState {
    Collecting,
    Done,
}

/// The aggregator's owned state: the result set and the completion count.
#[derive(Debug)]
pub struct Collector {
    launched: usize,
    completed: usize,
    links: HashSet<String>,
}

impl Collector {
    pub fn new(launched: usize) -> Self {
        Self {
            launched,
            completed: 0,
            links: HashSet::new(),
        }
    }

    pub fn state(&self) -> CollectorState {
        if self.completed >= self.launched {
            CollectorState::Done
        } else {
            CollectorState::Collecting
        }
    }

    pub fn on_link(&mut self, link: DiscoveredLink) {
        self.links.insert(link.into_inner());
    }

    pub fn on_completion(&mut self, completion: Completion) {
        if self.completed == self.launched {
            warn!(seed = %completion.seed, "completion beyond the number of launched tasks, ignoring");
            return;
        }
        self.completed += 1;
        debug!(
            seed = %completion.seed,
            emitted = completion.emitted,
            completed = self.completed,
            launched = self.launched,
            "task completed"
        );
    }

    pub fn completed(&self) -> usize {
        self.completed
    }

    pub fn unique_links(&self) -> usize {
        self.links.len()
    }

    /// Freezes the result set into a report.
    pub fn finish(self) -> CrawlReport {
        CrawlReport::new(self.launched, self.completed, self.links)
    }
}

/// Launches crawl tasks and aggregates their output.
pub struct Crawler {
    source: Arc<dyn PageSource>,
}

impl Crawler {
    pub fn new(source: Arc<dyn PageSource>) -> Self {
        Self { source }
    }

    /// Crawls every seed once and returns the unique links found.
    ///
    /// Returns once every launched task has signalled completion. With no
    /// seeds this returns an empty report straight away.
    pub async fn run(&self, seeds: Vec<String>) -> CrawlReport {
        let mut collector = Collector::new(seeds.len());
        if seeds.is_empty() {
            return collector.finish();
        }

        let (link_tx, mut link_rx) = mpsc::channel::<DiscoveredLink>(HANDOFF_CAPACITY);
        let (done_tx, mut done_rx) = mpsc::channel::<Completion>(HANDOFF_CAPACITY);

        info!(seeds = seeds.len(), "starting crawl");

        let local = LocalSet::new();
        local
            .run_until(async {
                for seed in seeds {
                    tokio::task::spawn_local(run_task(
                        Arc::clone(&self.source),
                        seed,
                        link_tx.clone(),
                        done_tx.clone(),
                    ));
                }
                // Only the tasks hold senders now, so the channels close if
                // every task disappears.
                drop(link_tx);
                drop(done_tx);

                while collector.state() == CollectorState::Collecting {
                    tokio::select! {
                        // Links first: a task's links are sent before its
                        // completion, so none can be left behind.
                        biased;

                        Some(link) = link_rx.recv() => collector.on_link(link),
                        Some(done) = done_rx.recv() => collector.on_completion(done),
                        else => {
                            warn!(
                                completed = collector.completed(),
                                "all tasks gone before every completion arrived"
                            );
                            break;
                        }
                    }
                }

                // Anything already handed off still belongs in the set.
                while let Ok(link) = link_rx.try_recv() {
                    collector.on_link(link);
                }
            })
            .await;

        info!(
            completed = collector.completed(),
            unique = collector.unique_links(),
            "crawl finished"
        );
        collector.finish()
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is tokio::select!?
//    - Waits on several futures at once and runs the branch of whichever
//      finishes first
//    - `biased;` makes it check the branches top to bottom instead of randomly
//    - A branch whose pattern fails (recv() returned None) is disabled; when
//      all are disabled the `else` branch runs
//
// 2. Why mpsc channels instead of a shared HashSet?
//    - mpsc = multi-producer, single-consumer
//    - Many tasks send, one loop receives, so the set has exactly one owner
//    - No Mutex, no Arc around the results
//
// 3. What is a LocalSet?
//    - A group of tasks that all run on the current thread
//    - spawn_local() accepts futures that are not Send
//    - run_until() drives those tasks while also running our loop
//
// 4. Why drop(link_tx) after spawning?
//    - A channel closes when its last sender is dropped
//    - If we kept our own copy, recv() could never return None
// -----------------------------------------------------------------------------
