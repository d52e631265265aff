//! The digest run: fetch each feed, normalize its newest entry, write the document.
//!
//! Feeds are processed one at a time in configuration order. Per-feed
//! failures never abort the run:
//!
//! | Outcome | Contribution |
//! |---------|--------------|
//! | Feed parsed, has entries | Normalized first entry |
//! | Feed parsed, no entries | Nothing |
//! | Fetch or parse error | Static fallback post |
//!
//! Only writing the output file can fail a run.

use crate::feeds::FeedFetch;
use crate::models::{Feed, FeedSource, NormalizedPost, PostsDocument};
use crate::normalize::normalize;
use crate::outputs::json::write_posts;
use crate::sources::{default_sources, fallback_post};
use crate::utils::{iso_timestamp, truncate_for_log};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use std::error::Error;
use std::path::PathBuf;
use tracing::{error, info, instrument, warn};

/// Number of posts the web page displays.
pub const DEFAULT_MAX_POSTS: usize = 2;

/// Everything a run needs, passed in explicitly.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Feeds to read, in display order.
    pub sources: Vec<FeedSource>,
    /// Destination of the posts document.
    pub output: PathBuf,
    /// How many collected posts are kept in the document.
    pub max_posts: usize,
}

impl RunConfig {
    /// The built-in feeds writing to `output`, keeping [`DEFAULT_MAX_POSTS`].
    pub fn with_default_sources(output: PathBuf) -> Self {
        Self {
            sources: default_sources(),
            output,
            max_posts: DEFAULT_MAX_POSTS,
        }
    }
}

/// Fetch every source in order and collect one post per feed.
///
/// Never fails: unreachable or malformed feeds yield their fallback post and
/// empty feeds are skipped.
#[instrument(level = "info", skip_all, fields(sources = sources.len()))]
pub async fn collect_posts<F: FeedFetch>(
    fetcher: &F,
    sources: &[FeedSource],
    now: DateTime<Utc>,
) -> Vec<NormalizedPost> {
    let posts: Vec<NormalizedPost> = stream::iter(sources.iter())
        .then(move |source| async move {
            info!(platform = %source.platform_label, url = %source.url, "Fetching feed");
            match fetcher.fetch(&source.url).await {
                Ok(feed) => {
                    info!(
                        platform = %source.platform_label,
                        feed = %feed_title(&feed, source),
                        entries = feed.entries.len(),
                        "Feed fetched"
                    );
                    match feed.entries.first() {
                        Some(latest) => {
                            let post = normalize(latest, source, now);
                            info!(
                                platform = %source.platform_label,
                                title = %truncate_for_log(&post.title, 80),
                                category = %post.category,
                                "Latest post"
                            );
                            Some(post)
                        }
                        None => {
                            warn!(platform = %source.platform_label, "Feed has no entries; skipping");
                            None
                        }
                    }
                }
                Err(e) => {
                    error!(
                        platform = %source.platform_label,
                        url = %source.url,
                        error = %e,
                        "Feed fetch failed; using fallback post"
                    );
                    Some(fallback_post(source, now))
                }
            }
        })
        .filter_map(std::future::ready)
        .collect()
        .await;

    info!(count = posts.len(), "Collected posts");
    posts
}

/// Name shown for a fetched feed: its own title, else the platform label.
fn feed_title<'a>(feed: &'a Feed, source: &'a FeedSource) -> &'a str {
    feed.title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(&source.platform_label)
}

/// Build the posts document, keeping the first `max_posts` in collection order.
///
/// `totalPosts` records how many were collected before the cut.
pub fn build_document(
    mut posts: Vec<NormalizedPost>,
    max_posts: usize,
    now: DateTime<Utc>,
) -> PostsDocument {
    let total_posts = posts.len();
    posts.truncate(max_posts);
    PostsDocument {
        last_updated: iso_timestamp(now),
        total_posts,
        posts,
    }
}

/// Run the digest once and write the posts document.
///
/// # Errors
///
/// Returns an error only if the document cannot be written.
#[instrument(level = "info", skip_all, fields(output = %config.output.display()))]
pub async fn run<F: FeedFetch>(
    config: &RunConfig,
    fetcher: &F,
) -> Result<PostsDocument, Box<dyn Error>> {
    let now = Utc::now();
    info!(feeds = config.sources.len(), "Feed update starting");

    let posts = collect_posts(fetcher, &config.sources, now).await;
    let document = build_document(posts, config.max_posts, now);

    write_posts(&document, &config.output).await?;
    info!(
        kept = document.posts.len(),
        total = document.total_posts,
        path = %config.output.display(),
        "Posts document updated"
    );
    for (i, post) in document.posts.iter().enumerate() {
        info!(
            rank = i + 1,
            category = %post.category,
            title = %post.title,
            platform = %post.platform,
            "Kept post"
        );
    }

    Ok(document)
}
