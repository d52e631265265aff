//! Entry normalization: classification, title and description cleanup, dating.
//!
//! [`normalize`] turns a [`RawEntry`] into a [`NormalizedPost`]. It never
//! fails; missing or malformed input falls back to fixed defaults.
//!
//! # Stages
//!
//! 1. Classify the raw title against two keyword sets (trend keywords win)
//! 2. Strip `[...]` tags from the title and trim it
//! 3. Pick the first non-empty of snippet, description, rich content
//! 4. Strip markup and entities, collapse whitespace, cut to 120 characters
//! 5. Resolve the publish date to a UTC calendar date

use crate::models::{FeedSource, NormalizedPost, RawEntry};
use crate::utils::utc_date;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, instrument};

/// Category assigned to titles that mention trends, analysis, or insights.
pub const TREND_ANALYSIS: &str = "AEO 트렌드 분석";
/// Category assigned to titles that mention technology, implementation, optimization, or cases.
pub const TECHNICAL_REPORT: &str = "AEO 기술 리포트";

const TREND_KEYWORDS: &[&str] = &["트렌드", "분석", "인사이트"];
const TECHNICAL_KEYWORDS: &[&str] = &["기술", "구현", "최적화", "케이스"];

pub const NO_TITLE: &str = "제목 없음";
pub const DEFAULT_DESCRIPTION: &str = "AEO 최적화에 대한 인사이트를 제공합니다.";

/// Maximum number of characters kept from a cleaned description.
pub const DESCRIPTION_LIMIT: usize = 120;
const ELLIPSIS: &str = "...";

static BRACKET_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[.*?\]").unwrap());
static MARKUP_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());
static MARKUP_ENTITY: Lazy<Regex> = Lazy::new(|| Regex::new(r"&[^;]+;").unwrap());
static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Normalize an entry.
///
/// `now` dates entries that carry no usable timestamp.
#[instrument(level = "debug", skip_all, fields(platform = %source.platform_label))]
pub fn normalize(entry: &RawEntry, source: &FeedSource, now: DateTime<Utc>) -> NormalizedPost {
    let category = classify(&entry.title, &source.default_category);
    let title = clean_title(&entry.title);
    let description = clean_description(select_description(entry));
    let published_at = resolve_published_date(entry.publish_date.as_deref(), now);

    debug!(%category, %title, %published_at, "Normalized entry");
    NormalizedPost {
        category,
        title,
        description,
        link: entry.link.clone(),
        platform: source.platform_label.clone(),
        published_at,
    }
}

/// Pick a category from keywords in the raw title.
///
/// Trend keywords are checked first, so a title matching both sets is a
/// trend analysis. Matching is a case-sensitive substring test.
pub fn classify(raw_title: &str, default_category: &str) -> String {
    if TREND_KEYWORDS.iter().any(|k| raw_title.contains(k)) {
        TREND_ANALYSIS.to_string()
    } else if TECHNICAL_KEYWORDS.iter().any(|k| raw_title.contains(k)) {
        TECHNICAL_REPORT.to_string()
    } else {
        default_category.to_string()
    }
}

/// Remove `[...]` tags and surrounding whitespace; empty titles become [`NO_TITLE`].
pub fn clean_title(raw_title: &str) -> String {
    let stripped = BRACKET_TAG.replace_all(raw_title, "");
    let trimmed = stripped.trim();
    if trimmed.is_empty() {
        NO_TITLE.to_string()
    } else {
        trimmed.to_string()
    }
}

/// First non-empty body field, in snippet → description → rich content order.
pub fn select_description(entry: &RawEntry) -> &str {
    [&entry.snippet, &entry.description, &entry.rich_content]
        .into_iter()
        .filter_map(|field| field.as_deref())
        .find(|text| !text.is_empty())
        .unwrap_or("")
}

/// Strip markup, collapse whitespace, and bound the length of a description.
///
/// Text of 120 characters or more is cut to 120 and gets a `...` marker.
/// An empty result becomes [`DEFAULT_DESCRIPTION`].
pub fn clean_description(raw: &str) -> String {
    let text = MARKUP_TAG.replace_all(raw, "");
    let text = MARKUP_ENTITY.replace_all(&text, " ");
    let text = WHITESPACE_RUN.replace_all(&text, " ");
    let text = text.trim();

    let mut description: String = text.chars().take(DESCRIPTION_LIMIT).collect();
    if text.chars().count() >= DESCRIPTION_LIMIT {
        description.push_str(ELLIPSIS);
    }

    if description.is_empty() {
        DEFAULT_DESCRIPTION.to_string()
    } else {
        description
    }
}

/// Parse a feed timestamp into a UTC `YYYY-MM-DD` date, falling back to `now`.
pub fn resolve_published_date(raw: Option<&str>, now: DateTime<Utc>) -> String {
    raw.and_then(parse_feed_date)
        .map(utc_date)
        .unwrap_or_else(|| utc_date(now))
}

/// Parse RSS (RFC 2822) or Atom (RFC 3339) timestamps.
fn parse_feed_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}
