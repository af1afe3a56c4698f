//! Speech synthesis of the combined narration.
//!
//! Uses the Azure Speech text-to-speech REST endpoint. The narration is wrapped
//! in SSML, XML-escaped with `quick-xml`, and the returned MP3 stream is written
//! straight to the requested path.

use crate::config::SpeechSettings;
use quick_xml::escape::escape;
use reqwest::{Client, StatusCode};
use std::path::Path;
use std::time::Instant;
use thiserror::Error;
use tokio::fs;
use tracing::{error, info, instrument};

/// Audio encoding requested from the provider.
pub const OUTPUT_FORMAT: &str = "audio-24khz-48kbitrate-mono-mp3";

const USER_AGENT: &str = concat!("hn_podcast/", env!("CARGO_PKG_VERSION"));

#[derive(Error, Debug)]
pub enum SynthesisError {
    #[error("synthesis request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("speech synthesis failed ({status}): {reason}")]
    Rejected { status: StatusCode, reason: String },
    #[error("failed to write audio file: {0}")]
    Io(#[from] std::io::Error),
}

/// Text-to-speech client for one subscription and voice.
#[derive(Debug, Clone)]
pub struct Narrator {
    client: Client,
    settings: SpeechSettings,
}

impl Narrator {
    pub fn new(client: Client, settings: SpeechSettings) -> Self {
        Self { client, settings }
    }

    /// Synthesize `text` and write the audio to `output`.
    ///
    /// Not retried. On any failure no file is written.
    #[instrument(level = "info", skip_all, fields(path = %output.display(), region = %self.settings.region, chars = text.chars().count()))]
    pub async fn narrate(&self, text: &str, output: &Path) -> Result<(), SynthesisError> {
        let t0 = Instant::now();
        info!(voice = %self.settings.voice, "Starting speech synthesis");

        let response = self
            .client
            .post(&self.settings.endpoint)
            .header("Ocp-Apim-Subscription-Key", &self.settings.key)
            .header(reqwest::header::CONTENT_TYPE, "application/ssml+xml")
            .header("X-Microsoft-OutputFormat", OUTPUT_FORMAT)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .body(ssml(&self.settings.voice, text))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let reason = if body.trim().is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("unknown reason")
                    .to_string()
            } else {
                body.trim().to_string()
            };
            error!(%status, %reason, "Speech synthesis failed");
            return Err(SynthesisError::Rejected { status, reason });
        }

        let audio = response.bytes().await?;
        fs::write(output, &audio).await?;
        info!(
            bytes = audio.len(),
            elapsed_ms = t0.elapsed().as_millis(),
            "Speech synthesis completed"
        );
        Ok(())
    }
}

/// Wrap narration text in a single-voice SSML document.
pub fn ssml(voice: &str, text: &str) -> String {
    format!(
        "<speak version=\"1.0\" xmlns=\"http://www.w3.org/2001/10/synthesis\" xml:lang=\"en-US\"><voice name=\"{}\">{}</voice></speak>",
        escape(voice),
        escape(text)
    )
}
