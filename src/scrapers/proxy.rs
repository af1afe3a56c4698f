//! Article and discussion text through an extraction proxy.
//!
//! The proxy is addressed as `{proxy_base}/{target_url}` and answers with the
//! rendered page as plain text. Request headers steer what it keeps:
//!
//! | Header | Value | Sent on |
//! |--------|-------|---------|
//! | `X-Retain-Images` | `none` | every request |
//! | `X-Target-Selector` | `#pagespace + tr` | discussion pages (the comment tree) |
//! | `X-Remove-Selector` | `.navs` | discussion pages (navigation chrome) |
//!
//! A non-success status is not an error: it is logged and yields empty text.
//! Transport failures (connect, timeout, broken body) are retried and, once the
//! budget is spent, surface as [`FetchError`].

use crate::config::ProxySettings;
use crate::models::Item;
use crate::retry::RetryPolicy;
use crate::scrapers::FetchError;
use crate::utils::truncate_to_budget;
use reqwest::{Client, RequestBuilder};
use std::time::Duration as StdDuration;
use tracing::{info, instrument, warn};

const RETAIN_IMAGES: (&str, &str) = ("X-Retain-Images", "none");
const TARGET_SELECTOR: (&str, &str) = ("X-Target-Selector", "#pagespace + tr");
const REMOVE_SELECTOR: (&str, &str) = ("X-Remove-Selector", ".navs");

/// Which kind of page is being extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    Article,
    Discussion,
}

impl PageKind {
    fn as_str(self) -> &'static str {
        match self {
            PageKind::Article => "article",
            PageKind::Discussion => "comments",
        }
    }
}

/// Content fetcher for article bodies and comment threads.
#[derive(Debug, Clone)]
pub struct ContentFetcher {
    client: Client,
    settings: ProxySettings,
    timeout: StdDuration,
    retry: RetryPolicy,
}

impl ContentFetcher {
    pub fn new(
        client: Client,
        settings: ProxySettings,
        timeout: StdDuration,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            client,
            settings,
            timeout,
            retry,
        }
    }

    /// Extracted article text for `item`, cut to the token budget.
    pub async fn fetch_article(&self, item: &Item, max_tokens: usize) -> Result<String, FetchError> {
        self.fetch(&item.url, PageKind::Article, max_tokens).await
    }

    /// Extracted comment tree for `item`, cut to the token budget.
    pub async fn fetch_comments(&self, item: &Item, max_tokens: usize) -> Result<String, FetchError> {
        self.fetch(&item.discussion_url, PageKind::Discussion, max_tokens)
            .await
    }

    /// Fetch `target` through the proxy.
    ///
    /// Returns at most `max_tokens * 4` characters. An upstream non-success
    /// status yields `Ok("")`.
    #[instrument(level = "info", skip(self, kind), fields(page = kind.as_str()))]
    pub async fn fetch(
        &self,
        target: &str,
        kind: PageKind,
        max_tokens: usize,
    ) -> Result<String, FetchError> {
        let proxied = self.proxied_url(target);
        let label = format!("{} {}", kind.as_str(), target);

        let fetched = self
            .retry
            .run(&label, || self.fetch_once(&proxied, kind))
            .await?;

        match fetched {
            Some(text) => {
                let text = truncate_to_budget(&text, max_tokens);
                info!(chars = text.chars().count(), "Fetched {}", kind.as_str());
                Ok(text)
            }
            None => Ok(String::new()),
        }
    }

    /// One attempt. `Ok(None)` means the proxy answered with a non-success status.
    async fn fetch_once(&self, proxied: &str, kind: PageKind) -> Result<Option<String>, FetchError> {
        let response = self
            .request(proxied, kind)
            .send()
            .await
            .map_err(|e| FetchError::request(proxied, e))?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, url = %proxied, "Extraction proxy refused {}; continuing without it", kind.as_str());
            return Ok(None);
        }

        response
            .text()
            .await
            .map(Some)
            .map_err(|e| FetchError::request(proxied, e))
    }

    fn request(&self, proxied: &str, kind: PageKind) -> RequestBuilder {
        let builder = self
            .client
            .get(proxied)
            .bearer_auth(&self.settings.api_key)
            .header(RETAIN_IMAGES.0, RETAIN_IMAGES.1)
            .timeout(self.timeout);

        match kind {
            PageKind::Article => builder,
            PageKind::Discussion => builder
                .header(TARGET_SELECTOR.0, TARGET_SELECTOR.1)
                .header(REMOVE_SELECTOR.0, REMOVE_SELECTOR.1),
        }
    }

    fn proxied_url(&self, target: &str) -> String {
        format!("{}/{}", self.settings.base_url.trim_end_matches('/'), target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher(base_url: String, timeout: StdDuration) -> ContentFetcher {
        ContentFetcher::new(
            Client::new(),
            ProxySettings {
                base_url,
                api_key: "jina-test".to_string(),
            },
            timeout,
            RetryPolicy::immediate(3),
        )
    }

    fn item() -> Item {
        Item::new(
            "1",
            "Title",
            "https://a.example/story",
            "https://news.ycombinator.com/item?id=1",
        )
    }

    #[test]
    fn test_proxied_url_prefixes_target() {
        let f = fetcher("https://r.jina.ai/".to_string(), StdDuration::from_secs(30));
        assert_eq!(
            f.proxied_url("https://a.example/story"),
            "https://r.jina.ai/https://a.example/story"
        );
    }

    #[tokio::test]
    async fn test_article_text_is_truncated() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path_regex("a.example/story$"))
            .and(header("X-Retain-Images", "none"))
            .and(header("Authorization", "Bearer jina-test"))
            .respond_with(ResponseTemplate::new(200).set_body_string("x".repeat(100)))
            .expect(1)
            .mount(&server)
            .await;

        let text = fetcher(server.uri(), StdDuration::from_secs(5))
            .fetch_article(&item(), 5)
            .await
            .unwrap();
        assert_eq!(text, "x".repeat(20));
    }

    #[tokio::test]
    async fn test_comments_request_isolates_thread() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("X-Target-Selector", "#pagespace + tr"))
            .and(header("X-Remove-Selector", ".navs"))
            .respond_with(ResponseTemplate::new(200).set_body_string("great thread"))
            .expect(1)
            .mount(&server)
            .await;

        let text = fetcher(server.uri(), StdDuration::from_secs(5))
            .fetch_comments(&item(), 1000)
            .await
            .unwrap();
        assert_eq!(text, "great thread");
    }

    #[tokio::test]
    async fn test_non_success_status_is_empty_and_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(451))
            .expect(1)
            .mount(&server)
            .await;

        let text = fetcher(server.uri(), StdDuration::from_secs(5))
            .fetch_article(&item(), 1000)
            .await
            .unwrap();
        assert!(text.is_empty());
    }

    #[tokio::test]
    async fn test_timeouts_are_retried_then_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("too late")
                    .set_delay(StdDuration::from_secs(2)),
            )
            .expect(3)
            .mount(&server)
            .await;

        let err = fetcher(server.uri(), StdDuration::from_millis(200))
            .fetch_article(&item(), 1000)
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Request { .. }));
    }
}
