//! Data models for feed sources, raw entries, and the published posts document.
//!
//! This module defines the core data structures used throughout the application:
//! - [`FeedSource`]: Static description of one syndication feed
//! - [`Feed`] / [`RawEntry`]: A parsed feed as handed back by the fetcher
//! - [`NormalizedPost`]: One cleaned, classified entry ready for display
//! - [`PostsDocument`]: The `posts.json` artifact consumed by the web page
//!
//! The serialized models use camelCase keys to match the JSON shape the
//! presentation layer reads.

use serde::{Deserialize, Serialize};

/// A syndication feed the digest pulls from.
///
/// Sources are fixed at build time (see [`crate::sources::default_sources`])
/// and never mutated during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSource {
    /// RSS or Atom feed URL.
    pub url: String,
    /// Human-readable platform name copied into every post from this feed.
    pub platform_label: String,
    /// Category used when the entry title matches no keyword set.
    pub default_category: String,
    /// Public homepage linked by the fallback post when the feed is unavailable.
    pub homepage: String,
}

impl FeedSource {
    pub fn new(url: &str, platform_label: &str, default_category: &str, homepage: &str) -> Self {
        Self {
            url: url.to_string(),
            platform_label: platform_label.to_string(),
            default_category: default_category.to_string(),
            homepage: homepage.to_string(),
        }
    }
}

/// A parsed feed document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Feed {
    /// Channel (RSS) or feed (Atom) title, if present.
    pub title: Option<String>,
    /// Entries in document order; feeds list the newest entry first.
    pub entries: Vec<RawEntry>,
}

/// A single feed entry before normalization.
///
/// Only one of `snippet`, `description`, and `rich_content` is ever used,
/// in that priority order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEntry {
    pub title: String,
    pub link: String,
    /// Publish timestamp in the feed's native format (RFC 2822 or RFC 3339).
    pub publish_date: Option<String>,
    /// Plain-text rendering of the entry body.
    pub snippet: Option<String>,
    pub description: Option<String>,
    /// Full HTML body (`content:encoded` or Atom `content`).
    pub rich_content: Option<String>,
}

/// A cleaned, classified, length-bounded post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedPost {
    pub category: String,
    pub title: String,
    /// At most 123 characters: 120 plus a `...` marker.
    pub description: String,
    pub link: String,
    pub platform: String,
    /// Calendar date in `YYYY-MM-DD` format (UTC).
    pub published_at: String,
}

/// The `posts.json` document, rebuilt from scratch on every run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostsDocument {
    /// ISO-8601 UTC timestamp of this run.
    pub last_updated: String,
    /// Number of posts collected before the display cap was applied.
    pub total_posts: usize,
    pub posts: Vec<NormalizedPost>,
}
