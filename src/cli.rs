// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Every seed URL is a positional argument. Running with no seeds is allowed
// and simply reports zero links.
// =============================================================================

use std::time::Duration;

use clap::Parser;

use crate::fetch::FetchConfig;

#[derive(Parser, Debug)]
#[command(
    name = "link-scout",
    version,
    about = "Fetch pages concurrently and list the unique https links they contain",
    long_about = "link-scout fetches every seed URL once, all at the same time, and prints the \
                  deduplicated set of https links found in <a href> attributes. \
                  Pages that fail to load are reported on stderr and skipped."
)]
pub struct Cli {
    /// Seed URLs to fetch (e.g., https://example.com)
    #[arg(value_name = "SEED_URL")]
    pub seeds: Vec<String>,

    /// Output results in JSON format instead of a list
    #[arg(long)]
    pub json: bool,

    /// Give up on a request after this many seconds (default: wait forever)
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// User-Agent header sent with every request
    #[arg(long, value_name = "UA")]
    pub user_agent: Option<String>,

    /// Log task progress (debug level) on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// HTTP client settings taken from the flags.
    pub fn fetch_config(&self) -> FetchConfig {
        let defaults = FetchConfig::default();
        FetchConfig {
            timeout: self.timeout.map(Duration::from_secs),
            user_agent: self.user_agent.clone().unwrap_or(defaults.user_agent),
        }
    }
}
