// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging on stderr
// 3. Crawl every seed URL concurrently and collect the unique https links
// 4. Print the report (list or JSON)
// 5. Exit with code 0, or 2 if the crawl could not start
//
// Pages that fail to load do not change the exit code; they only show up as
// diagnostics on stderr and as fewer links in the report.
// =============================================================================

mod cli;
mod crawl;
mod error;
mod extract;
mod fetch;
mod telemetry;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use cli::Cli;
use crawl::{CrawlReport, Crawler};
use fetch::HttpSource;

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    telemetry::init(cli.verbose);

    let source = HttpSource::new(&cli.fetch_config()).context("failed to start crawler")?;
    let crawler = Crawler::new(Arc::new(source));

    let report = crawler.run(cli.seeds).await;

    print_results(&report, cli.json)?;
    Ok(0)
}

// Prints the report either as a plain list or JSON
fn print_results(report: &CrawlReport, json: bool) -> Result<()> {
    if json {
        let json_output = serde_json::to_string_pretty(report)?;
        println!("{}", json_output);
    } else {
        print!("{}", format_list(report));
    }
    Ok(())
}

// Human-readable report: a count line, a blank line, then "- <link>" per link
fn format_list(report: &CrawlReport) -> String {
    let mut out = format!("\nFound {} unique URLs:\n\n", report.count);
    for link in &report.links {
        out.push_str("- ");
        out.push_str(link);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_format_list() {
        let links = HashSet::from(["https://x.example/page".to_string()]);
        let report = CrawlReport::new(2, 2, links);
        assert_eq!(
            format_list(&report),
            "\nFound 1 unique URLs:\n\n- https://x.example/page\n"
        );
    }

    #[test]
    fn test_format_empty_list() {
        let report = CrawlReport::new(0, 0, HashSet::new());
        assert_eq!(format_list(&report), "\nFound 0 unique URLs:\n\n");
    }
}
