//! Network retrieval: the aggregator listing and per-item page text.
//!
//! | Module | Fetches | Method |
//! |--------|---------|--------|
//! | [`hackernews`] | front-page items | HTML scraping with CSS selectors |
//! | [`proxy`] | article and discussion text | extraction proxy returning clean text |
//!
//! Both go through a [`RetryPolicy`](crate::retry::RetryPolicy) and share
//! the [`FetchError`] type. A transient [`FetchError`] means retries are
//! exhausted; a permanent one (4xx other than 429) is returned on first sight.

use reqwest::StatusCode;
use thiserror::Error;

pub mod hackernews;
pub mod proxy;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} responded with {status}")]
    Status { url: String, status: StatusCode },
}

impl FetchError {
    pub(crate) fn request(url: &str, source: reqwest::Error) -> Self {
        Self::Request {
            url: url.to_string(),
            source,
        }
    }

    /// Whether another attempt could succeed: transport failures, 5xx and 429.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Request { .. } => true,
            FetchError::Status { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
        }
    }
}
