//! # HN Podcast
//!
//! Runs the pipeline once: front page, per-story summaries, narration, archive.
//!
//! ## Usage
//!
//! ```sh
//! export JINA_KEY=... OPENAI_BASE=... OPENAI_MODEL=... OPENAI_API_KEY=...
//! export AZURE_SPEECH_KEY=... AZURE_SPEECH_REGION=...
//! hn_podcast --top-n 10 --max-tokens 1000 -o ./podcasts
//! ```
//!
//! Scheduling repeated runs is left to cron, systemd timers or similar.

use clap::Parser;
use hn_podcast::cli::Cli;
use hn_podcast::config::Settings;
use hn_podcast::pipeline::run_once;
use std::error::Error;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("hn_podcast starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    match run_once(&args, Settings::from_env).await {
        Ok(output) => {
            let elapsed = start_time.elapsed();
            info!(
                ?elapsed,
                secs = elapsed.as_secs(),
                millis = elapsed.subsec_millis(),
                items = output.items.len(),
                json = %output.json_path.display(),
                audio = ?output.audio_path,
                "Execution complete"
            );
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Run aborted");
            Err(e.into())
        }
    }
}
