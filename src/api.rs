//! LLM completion calls that turn one item into a podcast-ready summary.
//!
//! Talks to any OpenAI-compatible `chat/completions` endpoint. A fixed system
//! instruction asks for a spoken-style, bilingual (English first, then Chinese)
//! narrative covering the article and the range of opinions in its comments.
//!
//! Completion calls are not retried. A failed completion costs one item its
//! summary and the run moves on.

use crate::config::CompletionSettings;
use crate::utils::truncate_for_log;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use thiserror::Error;
use tracing::{info, instrument, warn};

/// Output length cap sent with every completion request.
pub const MAX_OUTPUT_TOKENS: u32 = 1000;

/// Sampling temperature sent with every completion request.
pub const TEMPERATURE: f64 = 0.7;

const REFERER: &str = "https://news.ycombinator.com";
const TITLE: &str = "HN Podcast Assistant";

/// System instruction for the summarizer.
pub const SUMMARIZE_STORY_PROMPT: &str = "\
You are the editorial assistant of a Hacker News podcast. You turn Hacker News stories and their \
comment threads into spoken podcast segments for software developers and technology enthusiasts.

Goals:
- Read the article and the comments you are given.
- Open with a short introduction to the story's main topic, then explain its key points concisely.
- Summarize the opinions in the comments, presenting the different viewpoints that came up.
- Speak plainly and directly, the way you would explain something to a friend.
- Do not use markdown or symbols such as **, *, # or bullet markers; the text will be read aloud.
- Write the segment twice: first in English, then in Chinese. Separate the two versions with a line containing only ---.";

#[derive(Error, Debug)]
pub enum SummarizationError {
    #[error("completion request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("completion provider responded with {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("completion response contained no text")]
    EmptyResponse,
}

#[derive(Serialize, Debug)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize, Debug)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
    temperature: f64,
}

#[derive(Deserialize, Debug)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize, Debug)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize, Debug)]
struct ChatReply {
    content: Option<String>,
}

/// Completion client bound to one provider and model.
#[derive(Debug, Clone)]
pub struct Summarizer {
    client: Client,
    settings: CompletionSettings,
}

impl Summarizer {
    pub fn new(client: Client, settings: CompletionSettings) -> Self {
        Self { client, settings }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.settings.base_url.trim_end_matches('/')
        )
    }

    /// Summarize one assembled content block.
    ///
    /// # Errors
    ///
    /// Any transport failure, non-success status, or response without text is
    /// returned as a [`SummarizationError`]. Nothing is retried.
    #[instrument(level = "info", skip_all, fields(model = %self.settings.model, content_len = content.len()))]
    pub async fn summarize(&self, content: &str) -> Result<String, SummarizationError> {
        let t0 = Instant::now();
        let request = ChatRequest {
            model: &self.settings.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SUMMARIZE_STORY_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content,
                },
            ],
            max_tokens: MAX_OUTPUT_TOKENS,
            temperature: TEMPERATURE,
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.settings.api_key)
            .header("HTTP-Referer", REFERER)
            .header("X-Title", TITLE)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                %status,
                elapsed_ms = t0.elapsed().as_millis(),
                body = %truncate_for_log(&body, 300),
                "Completion call rejected"
            );
            return Err(SummarizationError::Status { status, body });
        }

        let parsed: ChatResponse = response.json().await?;
        let summary = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or(SummarizationError::EmptyResponse)?;

        info!(
            elapsed_ms = t0.elapsed().as_millis(),
            chars = summary.chars().count(),
            "Summary generated"
        );
        Ok(summary)
    }
}
