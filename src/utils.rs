//! Utility functions for date formatting, log truncation, and file system checks.
//!
//! This module provides helper functions used throughout the application:
//! - UTC calendar date and timestamp formatting for the posts document
//! - Character-safe string truncation for log previews
//! - Output directory preparation

use chrono::{DateTime, SecondsFormat, Utc};
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{debug, instrument};

/// Format an instant as a UTC calendar date (`YYYY-MM-DD`).
pub fn utc_date(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%d").to_string()
}

/// Format an instant as an ISO-8601 UTC timestamp with millisecond precision.
///
/// # Examples
///
/// ```ignore
/// // 2025-05-06T10:00:00.000Z
/// let ts = iso_timestamp(Utc::now());
/// ```
pub fn iso_timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut after `max` characters with an ellipsis and the
/// number of dropped characters appended. Counting is done in characters so
/// multi-byte text (Hangul titles, for instance) never splits a code point.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    let total = s.chars().count();
    if total <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max).collect();
        format!("{}…(+{} chars)", head, total - max)
    }
}

/// Ensure the directory that will hold `path` exists.
///
/// A bare file name (no parent component) needs nothing created.
#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub async fn ensure_parent_dir(path: &Path) -> Result<(), Box<dyn Error>> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).await?;
            debug!(dir = %parent.display(), "Output directory ready");
            Ok(())
        }
        _ => Ok(()),
    }
}
