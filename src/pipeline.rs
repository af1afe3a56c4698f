//! Drives one run from the front page to the archived artifacts.
//!
//! ```text
//! Listing ─▶ PerItem(1..n) ─▶ Reducing ─▶ Narrating ─▶ Persisting ─▶ Done
//!               │   ▲
//!               ▼   │
//!            ItemFailed
//! ```
//!
//! | Stage | On failure |
//! |-------|------------|
//! | Listing | fatal: [`RunError::Fetch`], nothing is written |
//! | Output dir check | fatal: [`RunError::OutputDir`], before any per-item call |
//! | PerItem, article | logged; the item keeps its listing fields and the loop continues |
//! | PerItem, comments | logged; the item is summarized from title and article |
//! | PerItem, summary | logged; the item keeps its content without a summary |
//! | Narrating | logged; no audio file, persisting still happens |
//! | Persisting | fatal: [`RunError::Output`] |
//!
//! Items are processed one after another. The item list is owned here for the
//! whole run and handed back in [`RunOutput`].

use crate::api::Summarizer;
use crate::assembler::assemble;
use crate::cli::Cli;
use crate::config::{ConfigError, Settings};
use crate::models::Item;
use crate::outputs::{OutputError, RunPaths, json};
use crate::retry::RetryPolicy;
use crate::scrapers::FetchError;
use crate::scrapers::hackernews::HackerNews;
use crate::scrapers::proxy::ContentFetcher;
use crate::speech::Narrator;
use crate::utils::{ensure_writable_dir, truncate_for_log};
use chrono::Local;
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::time::{Duration as StdDuration, Instant};
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

/// Separator between item summaries in the narration.
pub const SUMMARY_SEPARATOR: &str = "\n\n";

#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("listing fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("output directory is not usable: {0}")]
    OutputDir(#[from] std::io::Error),
    #[error(transparent)]
    Output(#[from] OutputError),
}

/// Knobs for one run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Per-page token budget.
    pub max_tokens: usize,
    /// Item-count limit, `None` for all items.
    pub limit: Option<usize>,
    /// Root for the date-stamped run directory.
    pub output_dir: PathBuf,
    /// Front page to list items from.
    pub listing_url: String,
    /// Timeout applied to listing and content fetches.
    pub fetch_timeout: StdDuration,
}

impl From<&Cli> for RunOptions {
    fn from(cli: &Cli) -> Self {
        Self {
            max_tokens: cli.max_tokens,
            limit: cli.limit(),
            output_dir: PathBuf::from(&cli.output_dir),
            listing_url: cli.listing_url.clone(),
            fetch_timeout: StdDuration::from_secs(cli.timeout_secs),
        }
    }
}

/// What a finished run produced.
#[derive(Debug)]
pub struct RunOutput {
    /// Every listed item, with whatever fields were populated.
    pub items: Vec<Item>,
    /// Path of the structured-data file.
    pub json_path: PathBuf,
    /// Path of the narration, if one was synthesized.
    pub audio_path: Option<PathBuf>,
}

/// The orchestrator and the clients it owns for one run.
#[derive(Debug)]
pub struct Pipeline {
    listing: HackerNews,
    content: ContentFetcher,
    summarizer: Summarizer,
    narrator: Narrator,
    options: RunOptions,
}

impl Pipeline {
    pub fn new(settings: Settings, options: RunOptions) -> Result<Self, RunError> {
        Self::with_retry(settings, options, RetryPolicy::default())
    }

    /// Build the pipeline with a custom retry policy for listing and content fetches.
    pub fn with_retry(
        settings: Settings,
        options: RunOptions,
        retry: RetryPolicy,
    ) -> Result<Self, RunError> {
        let listing_url =
            Url::parse(&options.listing_url).map_err(|_| ConfigError::InvalidUrl {
                var: "--listing-url",
                value: options.listing_url.clone(),
            })?;
        let client = Client::builder().build().map_err(RunError::Client)?;

        Ok(Self {
            listing: HackerNews::new(
                client.clone(),
                listing_url,
                options.fetch_timeout,
                retry.clone(),
            ),
            content: ContentFetcher::new(
                client.clone(),
                settings.proxy,
                options.fetch_timeout,
                retry,
            ),
            summarizer: Summarizer::new(client.clone(), settings.completion),
            narrator: Narrator::new(client, settings.speech),
            options,
        })
    }

    /// Execute one full run.
    #[instrument(level = "info", skip_all, fields(max_tokens = self.options.max_tokens, limit = ?self.options.limit))]
    pub async fn run(&self) -> Result<RunOutput, RunError> {
        let t0 = Instant::now();

        let mut items = self.listing.index_items().await?;
        if let Some(limit) = self.options.limit {
            if items.len() > limit {
                info!(limit, listed = items.len(), "Limiting to top stories");
                items.truncate(limit);
            }
        }

        let paths = RunPaths::new(&self.options.output_dir, &Local::now());
        ensure_writable_dir(&paths.dir).await?;

        let total = items.len();
        let mut processed = Vec::with_capacity(total);
        for (i, item) in items.into_iter().enumerate() {
            info!(index = i + 1, total, id = %item.id, title = %item.title, "Processing item");
            processed.push(self.process_item(item).await);
        }
        let summarized = processed.iter().filter(|i| i.summary.is_some()).count();
        info!(
            total,
            summarized,
            failed = total - summarized,
            "Finished per-item processing"
        );

        let narration = concatenate_summaries(&processed);
        debug!(narration = %truncate_for_log(&narration, 500), "Combined summary");

        let audio_path = self.narrate(&narration, &paths.audio).await;

        json::write_items(&processed, &paths.json).await?;

        log_results(&processed);
        info!(
            elapsed_ms = t0.elapsed().as_millis(),
            json = %paths.json.display(),
            audio = audio_path.is_some(),
            "Run complete"
        );

        Ok(RunOutput {
            items: processed,
            json_path: paths.json,
            audio_path,
        })
    }

    /// Fetch, assemble and summarize one item. Never fails: a failing stage is
    /// logged and the item comes back with the fields populated so far.
    #[instrument(level = "info", skip_all, fields(id = %item.id))]
    async fn process_item(&self, item: Item) -> Item {
        let max_tokens = self.options.max_tokens;

        let article = match self.content.fetch_article(&item, max_tokens).await {
            Ok(article) => article,
            Err(e) => {
                error!(
                    stage = "fetch_article",
                    title = %item.title,
                    url = %item.url,
                    error = %e,
                    "Article fetch failed; keeping listing fields only"
                );
                return item;
            }
        };

        let comments = match self.content.fetch_comments(&item, max_tokens).await {
            Ok(comments) => comments,
            Err(e) => {
                error!(
                    stage = "fetch_comments",
                    title = %item.title,
                    url = %item.discussion_url,
                    error = %e,
                    "Comments fetch failed; continuing with the article only"
                );
                String::new()
            }
        };

        let content = assemble(&item.title, &article, &comments);

        if content.is_empty() {
            warn!(title = %item.title, "Nothing to summarize");
            return item;
        }

        match self.summarizer.summarize(&content).await {
            Ok(summary) => {
                info!(
                    title = %item.title,
                    summary = %truncate_for_log(&summary, 200),
                    "Summary generated"
                );
                item.with_content(content).with_summary(summary)
            }
            Err(e) => {
                error!(
                    stage = "summarize",
                    title = %item.title,
                    url = %item.url,
                    error = %e,
                    "Summarization failed; item kept without summary"
                );
                item.with_content(content)
            }
        }
    }

    /// Synthesize the narration. Returns the audio path on success.
    async fn narrate(&self, narration: &str, path: &Path) -> Option<PathBuf> {
        if narration.is_empty() {
            warn!("No summaries were produced; skipping narration");
            return None;
        }
        match self.narrator.narrate(narration, path).await {
            Ok(()) => Some(path.to_path_buf()),
            Err(e) => {
                error!(stage = "narrate", path = %path.display(), error = %e, "Narration failed; audio artifact skipped");
                None
            }
        }
    }
}

/// Join every populated summary, in listing order, with a blank line.
pub fn concatenate_summaries(items: &[Item]) -> String {
    items
        .iter()
        .filter_map(|item| item.summary.as_deref())
        .collect::<Vec<_>>()
        .join(SUMMARY_SEPARATOR)
}

fn log_results(items: &[Item]) {
    info!("=== Story processing results ===");
    for item in items {
        info!(
            title = %item.title,
            url = %item.url,
            discussion_url = %item.discussion_url,
            score = %item.score,
            comments = %item.comment_count,
            summary = %item
                .summary
                .as_deref()
                .map(|s| truncate_for_log(s, 200))
                .unwrap_or_else(|| "No summary available".to_string()),
            "Story"
        );
    }
}

/// Validate configuration, then execute one run.
///
/// `load_settings` is called before anything else, so a [`ConfigError`] stops
/// the run before any network call or file write.
pub async fn run_once<F>(cli: &Cli, load_settings: F) -> Result<RunOutput, RunError>
where
    F: FnOnce() -> Result<Settings, ConfigError>,
{
    let settings = load_settings()?;
    Pipeline::new(settings, RunOptions::from(cli))?.run().await
}
