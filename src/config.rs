//! Provider settings read from the environment.
//!
//! Every credential and endpoint the pipeline needs is resolved once, up front,
//! into a [`Settings`] value. A missing variable is a [`ConfigError`] and the run
//! stops before touching the network or the filesystem.
//!
//! | Variable | Required | Used by |
//! |----------|----------|---------|
//! | `JINA_KEY` | yes | content fetcher (extraction proxy) |
//! | `OPENAI_BASE` | yes | summarizer |
//! | `OPENAI_MODEL` | yes | summarizer |
//! | `OPENAI_API_KEY` | yes | summarizer |
//! | `AZURE_SPEECH_KEY` | yes | narrator |
//! | `AZURE_SPEECH_REGION` | yes | narrator |
//! | `JINA_BASE` | no | overrides the proxy host |
//! | `AZURE_SPEECH_ENDPOINT` | no | overrides the synthesis URL |
//! | `AZURE_SPEECH_VOICE` | no | overrides the narration voice |

use thiserror::Error;
use url::Url;

/// Default host of the extraction proxy.
pub const DEFAULT_PROXY_BASE: &str = "https://r.jina.ai";

/// Multilingual neural voice, able to read both halves of a bilingual summary.
pub const DEFAULT_VOICE: &str = "en-US-AvaMultilingualNeural";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{what} is not set ({var})")]
    Missing {
        var: &'static str,
        what: &'static str,
    },
    #[error("{var} is not a valid URL: {value}")]
    InvalidUrl { var: &'static str, value: String },
}

/// Extraction proxy settings.
#[derive(Debug, Clone)]
pub struct ProxySettings {
    pub base_url: String,
    pub api_key: String,
}

/// OpenAI-compatible completion provider settings.
#[derive(Debug, Clone)]
pub struct CompletionSettings {
    pub base_url: String,
    pub model: String,
    pub api_key: String,
}

/// Azure speech settings.
#[derive(Debug, Clone)]
pub struct SpeechSettings {
    pub key: String,
    pub region: String,
    pub endpoint: String,
    pub voice: String,
}

/// Everything the pipeline needs from the environment.
#[derive(Debug, Clone)]
pub struct Settings {
    pub proxy: ProxySettings,
    pub completion: CompletionSettings,
    pub speech: SpeechSettings,
}

impl Settings {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read settings through an arbitrary lookup.
    ///
    /// Empty values are treated the same as unset ones.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
        let require = |var: &'static str, what: &'static str| {
            get(var).ok_or(ConfigError::Missing { var, what })
        };

        let proxy = ProxySettings {
            api_key: require("JINA_KEY", "Jina key")?,
            base_url: get("JINA_BASE").unwrap_or_else(|| DEFAULT_PROXY_BASE.to_string()),
        };
        validate_url("JINA_BASE", &proxy.base_url)?;

        let completion = CompletionSettings {
            base_url: require("OPENAI_BASE", "OpenAI base URL")?,
            model: require("OPENAI_MODEL", "OpenAI model")?,
            api_key: require("OPENAI_API_KEY", "OpenAI API key")?,
        };
        validate_url("OPENAI_BASE", &completion.base_url)?;

        let key = require("AZURE_SPEECH_KEY", "Azure Speech key")?;
        let region = require("AZURE_SPEECH_REGION", "Azure Speech region")?;
        let endpoint = get("AZURE_SPEECH_ENDPOINT").unwrap_or_else(|| {
            format!("https://{region}.tts.speech.microsoft.com/cognitiveservices/v1")
        });
        validate_url("AZURE_SPEECH_ENDPOINT", &endpoint)?;
        let speech = SpeechSettings {
            key,
            region,
            endpoint,
            voice: get("AZURE_SPEECH_VOICE").unwrap_or_else(|| DEFAULT_VOICE.to_string()),
        };

        Ok(Self {
            proxy,
            completion,
            speech,
        })
    }
}

fn validate_url(var: &'static str, value: &str) -> Result<(), ConfigError> {
    Url::parse(value).map(|_| ()).map_err(|_| ConfigError::InvalidUrl {
        var,
        value: value.to_string(),
    })
}
