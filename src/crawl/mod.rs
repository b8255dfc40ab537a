// src/crawl/mod.rs
// =============================================================================
// This module handles the concurrent crawl.
//
// Features:
// - One task per seed URL, all started at once
// - Links streamed to a single collector as they are found
// - Exactly one completion signal per task, even when a fetch fails
// - Deduplicated, sorted report at the end
//
// Submodules:
// - task: fetch one page and hand off its links
// - aggregator: launch tasks, collect links, count completions
// - report: the final result
// =============================================================================

mod aggregator;
mod report;
mod task;

#[cfg(test)]
mod testing;

// Re-export the pieces main needs
pub use aggregator::Crawler;
pub use report::CrawlReport;
