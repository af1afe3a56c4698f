//! Utility functions for text budgeting, log previews, and file system checks.
//!
//! - Character-budget truncation for fetched pages
//! - String truncation for logging
//! - File system validation for output directories

use std::fs as stdfs;
use std::io;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument, warn};

/// Rough characters-per-token ratio used to turn a token budget into a length cap.
pub const CHARS_PER_TOKEN: usize = 4;

/// Cut `text` to at most `max_tokens * 4` characters.
///
/// Counts `char`s, not bytes, so multi-byte text is never split mid-codepoint.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_to_budget("abcdefgh", 1), "abcd");
/// assert_eq!(truncate_to_budget("short", 100), "short");
/// ```
pub fn truncate_to_budget(text: &str, max_tokens: usize) -> String {
    let max_chars = max_tokens.saturating_mul(CHARS_PER_TOKEN);
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => text[..cut].to_string(),
        None => text.to_string(),
    }
}

/// Truncate a string for logging purposes.
///
/// Long strings are truncated to `max` characters with an ellipsis and
/// byte count indicator appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log("a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((cut, _)) => format!("{}…(+{} bytes)", &s[..cut], s.len() - cut),
        None => s.to_string(),
    }
}

/// Ensure a directory exists and is writable.
///
/// This function creates the directory if it doesn't exist, then performs
/// a write test by creating and immediately deleting a probe file.
///
/// # Errors
///
/// Returns an error if:
/// - The directory cannot be created
/// - The directory is not writable (permission denied, read-only filesystem, etc.)
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> io::Result<()> {
    fs::create_dir_all(path).await?;
    // A sync probe keeps the error surface simple
    let probe_path = path.join("..__probe_write__");
    stdfs::File::create(&probe_path)?;
    remove_probe(&probe_path);
    info!("Output directory is writable");
    Ok(())
}

/// Delete the write probe, logging a failure. Returns whether the file was removed.
fn remove_probe(probe_path: &Path) -> bool {
    match stdfs::remove_file(probe_path) {
        Ok(()) => true,
        Err(e) => {
            warn!(path = %probe_path.display(), error = %e, "Failed to remove write probe");
            false
        }
    }
}
