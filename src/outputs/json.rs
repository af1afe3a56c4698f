//! JSON output of the item list.
//!
//! The file is a top-level array of [`Item`] objects in listing order,
//! pretty-printed with four-space indentation. Non-ASCII text (the Chinese half
//! of every summary) is written as-is, not `\u`-escaped.

use crate::models::Item;
use crate::outputs::OutputError;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::path::Path;
use tokio::fs;
use tracing::{error, info, instrument};

/// Serialize items the way they are written to disk.
pub fn to_pretty_json(items: &[Item]) -> Result<Vec<u8>, serde_json::Error> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = Serializer::with_formatter(&mut buf, formatter);
    items.serialize(&mut serializer)?;
    Ok(buf)
}

/// Write `items` to `path`, creating the parent directory when needed.
///
/// # Errors
///
/// Returns an error if serialization, directory creation, or the write fails.
#[instrument(level = "info", skip_all, fields(path = %path.display(), count = items.len()))]
pub async fn write_items(items: &[Item], path: &Path) -> Result<(), OutputError> {
    let json = to_pretty_json(items)?;

    if let Some(dir) = path.parent() {
        if let Err(e) = fs::create_dir_all(dir).await {
            error!(dir = %dir.display(), error = %e, "Failed to create JSON dir");
            return Err(e.into());
        }
    }

    fs::write(path, json).await?;
    info!("Wrote stories JSON");
    Ok(())
}
