//! Command-line interface definitions for the feed digest.
//!
//! All arguments can be provided via command-line flags or environment
//! variables. The feed list itself is compiled in and not configurable here.

use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for `aeo_feed_digest`.
///
/// # Examples
///
/// ```sh
/// # Write ./posts.json
/// aeo_feed_digest
///
/// # Write into the site's data directory with a request timeout
/// aeo_feed_digest -o site/data/posts.json --timeout-secs 20
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path of the posts JSON file to (over)write
    #[arg(short, long, env = "POSTS_OUTPUT", default_value = "posts.json")]
    pub output: PathBuf,

    /// Per-request HTTP timeout in seconds; unset waits indefinitely
    #[arg(long, env = "FEED_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,
}
