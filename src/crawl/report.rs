// src/crawl/report.rs
// The frozen result of a crawl, ready for printing.

use std::collections::HashSet;

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct CrawlReport {
    /// Number of tasks launched (one per seed argument).
    pub seeds: usize,
    /// Completion signals received; equals `seeds` after a normal run.
    pub completed: usize,
    pub count: usize,
    /// Unique links, sorted so output is stable between runs.
    pub links: Vec<String>,
}

impl CrawlReport {
    pub fn new(seeds: usize, completed: usize, links: HashSet<String>) -> Self {
        let mut links: Vec<String> = links.into_iter().collect();
        links.sort();

        Self {
            seeds,
            completed,
            count: links.len(),
            links,
        }
    }
}
