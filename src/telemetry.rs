// src/telemetry.rs
// Logging setup. Everything goes to stderr so stdout only ever holds the
// report (and stays valid JSON with --json).

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub fn init(verbose: bool) {
    let default_filter = if verbose {
        "warn,link_scout=debug"
    } else {
        "warn,link_scout=info"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}
