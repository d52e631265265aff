//! JSON output for the presentation layer.
//!
//! The posts document is written pretty-printed (two-space indentation) and
//! replaces the previous file in one step: the JSON goes to a sibling
//! `.tmp` file first, which is then renamed over the target.

use crate::models::PostsDocument;
use crate::utils::ensure_parent_dir;
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

/// Temporary sibling used while the new document is being written.
fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write a [`PostsDocument`] to `path`, overwriting any existing file.
///
/// # Errors
///
/// Returns an error if serialization, directory creation, the write, or the
/// final rename fails. On error the previous file is left in place.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_posts(document: &PostsDocument, path: &Path) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(document)?;

    ensure_parent_dir(path).await?;

    let staging = staging_path(path);
    if let Err(e) = fs::write(&staging, json.as_bytes()).await {
        error!(staging = %staging.display(), error = %e, "Failed to write staging file");
        return Err(e.into());
    }
    if let Err(e) = fs::rename(&staging, path).await {
        error!(staging = %staging.display(), error = %e, "Failed to move staging file into place");
        let _ = fs::remove_file(&staging).await;
        return Err(e.into());
    }

    info!(bytes = json.len(), posts = document.posts.len(), "Wrote posts JSON");
    Ok(())
}
