//! Feed retrieval: HTTP transport plus RSS/Atom parsing.
//!
//! The run loop only sees the [`FeedFetch`] trait, so tests and alternative
//! transports can stand in for [`HttpFeedFetcher`].
//!
//! # Submodules
//!
//! - [`parse`]: Streaming `quick-xml` parser for RSS 2.0, RSS 1.0, and Atom
//!
//! Each fetch is a single attempt. Failures bubble up to the caller, which
//! decides whether to substitute a fallback post.

pub mod parse;

use crate::models::Feed;
use crate::utils::truncate_for_log;
use reqwest::Client;
use std::error::Error;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

pub use parse::parse_feed;

/// User agent sent with every feed request.
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Trait for retrieving a parsed feed.
///
/// Implementors fetch the document at `url` and turn it into a [`Feed`].
pub trait FeedFetch {
    /// Fetch and parse the feed at `url`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-success HTTP status,
    /// or a document that is not a parseable feed.
    async fn fetch(&self, url: &str) -> Result<Feed, Box<dyn Error>>;
}

/// [`FeedFetch`] over HTTP(S) using a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFeedFetcher {
    client: Client,
}

impl HttpFeedFetcher {
    /// Build a fetcher. `timeout` of `None` leaves requests unbounded.
    pub fn new(timeout: Option<Duration>) -> Result<Self, Box<dyn Error>> {
        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

impl FeedFetch for HttpFeedFetcher {
    #[instrument(level = "info", skip_all, fields(%url))]
    async fn fetch(&self, url: &str) -> Result<Feed, Box<dyn Error>> {
        let t0 = Instant::now();
        let response = self.client.get(url).send().await?.error_for_status()?;
        let body = response.text().await?;
        debug!(
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u128,
            "Downloaded feed"
        );

        match parse_feed(&body) {
            Ok(feed) => {
                info!(entries = feed.entries.len(), "Parsed feed");
                Ok(feed)
            }
            Err(e) => {
                warn!(
                    error = %e,
                    body_preview = %truncate_for_log(&body, 200),
                    "Feed body did not parse"
                );
                Err(e)
            }
        }
    }
}
