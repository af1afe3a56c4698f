//! Run-scoped artifact locations and writers.
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! └── 20251019/
//!     ├── hacker_news_stories_20251019_0830.json
//!     └── hacker_news_stories_20251019_0830.mp3
//! ```
//!
//! Every run gets its own timestamped pair; nothing is deduplicated against
//! earlier runs.

use chrono::{DateTime, TimeZone};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub mod json;

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("failed to serialize items: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),
}

const FILE_STEM: &str = "hacker_news_stories";

/// Where one run writes its artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPaths {
    /// Date-stamped directory, `{output_dir}/{YYYYMMDD}`.
    pub dir: PathBuf,
    /// Structured data file.
    pub json: PathBuf,
    /// Narration audio file.
    pub audio: PathBuf,
}

impl RunPaths {
    pub fn new<Tz>(output_dir: &Path, at: &DateTime<Tz>) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let date = at.format("%Y%m%d").to_string();
        let stamp = at.format("%Y%m%d_%H%M").to_string();
        let dir = output_dir.join(&date);
        Self {
            json: dir.join(format!("{FILE_STEM}_{stamp}.json")),
            audio: dir.join(format!("{FILE_STEM}_{stamp}.mp3")),
            dir,
        }
    }
}
