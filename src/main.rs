//! # AEO Feed Digest
//!
//! Pulls the newest post from each of a small, fixed set of blog feeds,
//! cleans and classifies it, and writes a two-post `posts.json` for a
//! static page to render.
//!
//! ## Usage
//!
//! ```sh
//! aeo_feed_digest -o ./posts.json
//! ```
//!
//! ## Architecture
//!
//! A single sequential pass:
//! 1. **Fetching**: Download and parse each RSS/Atom feed in configuration order
//! 2. **Normalizing**: Classify, clean, and truncate the newest entry of each feed
//! 3. **Fallback**: Substitute a static post for feeds that cannot be read
//! 4. **Output**: Keep the first two posts and overwrite the JSON file

use clap::Parser;
use std::error::Error;
use std::time::Duration;
use tracing::{debug, error, info};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod cli;
mod feeds;
mod models;
mod normalize;
mod outputs;
mod pipeline;
mod sources;
mod utils;

use cli::Cli;
use feeds::HttpFeedFetcher;
use pipeline::RunConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("aeo_feed_digest starting up");

    let args = Cli::parse();
    debug!(?args.output, ?args.timeout_secs, "Parsed CLI arguments");

    let config = RunConfig::with_default_sources(args.output);
    let fetcher = HttpFeedFetcher::new(args.timeout_secs.map(Duration::from_secs))?;

    if let Err(e) = pipeline::run(&config, &fetcher).await {
        error!(path = %config.output.display(), error = %e, "Feed update failed");
        return Err(e);
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
