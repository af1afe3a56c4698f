//! Hacker News front-page scraper.
//!
//! Each story on the front page is a `tr.athing` row whose `id` attribute is
//! the story id. The title link sits under `.titleline > a`. The row right after
//! it (the "subtext" row) holds the score and the comments link:
//!
//! ```text
//! <tr class="athing" id="41000001">  ... <span class="titleline"><a href="...">Title</a></span>
//! <tr>  ... <span class="score">128 points</span> ... <a href="item?id=41000001">42&nbsp;comments</a>
//! ```
//!
//! Rows without a usable title link or id are skipped with a warning. Score and
//! comment count fall back to zero-value strings when the subtext row lacks them.

use crate::models::{DEFAULT_COMMENT_COUNT, DEFAULT_SCORE, Item};
use crate::retry::RetryPolicy;
use crate::scrapers::FetchError;
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration as StdDuration;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Default listing source.
pub const FRONT_PAGE_URL: &str = "https://news.ycombinator.com";

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.0.0 Safari/537.36";

static ROW: Lazy<Selector> = Lazy::new(|| Selector::parse("tr.athing").expect("static selector"));
static TITLE_LINK: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".titleline > a").expect("static selector"));
static SCORE: Lazy<Selector> = Lazy::new(|| Selector::parse(".score").expect("static selector"));
static ITEM_LINK: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"a[href^="item?id="]"#).expect("static selector"));

/// Why a single listing row was skipped.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("row has no title link")]
    MissingTitle,
    #[error("title link has no href")]
    MissingHref,
    #[error("row has no id attribute")]
    MissingId,
    #[error("cannot resolve link {href}")]
    InvalidLink { href: String },
}

/// Listing fetcher bound to one front-page address.
#[derive(Debug, Clone)]
pub struct HackerNews {
    client: Client,
    listing_url: Url,
    timeout: StdDuration,
    retry: RetryPolicy,
}

impl HackerNews {
    pub fn new(client: Client, listing_url: Url, timeout: StdDuration, retry: RetryPolicy) -> Self {
        Self {
            client,
            listing_url,
            timeout,
            retry,
        }
    }

    /// Fetch the front page and return its items in display order.
    ///
    /// Transport failures, 5xx and 429 are retried per the [`RetryPolicy`]; any
    /// other non-success status fails at once. Malformed rows are skipped,
    /// never fatal.
    #[instrument(level = "info", skip_all, fields(url = %self.listing_url))]
    pub async fn index_items(&self) -> Result<Vec<Item>, FetchError> {
        let html = self
            .retry
            .run_when("listing", || self.fetch_page(), FetchError::is_transient)
            .await?;

        let items = parse_front_page(&html, &self.listing_url);
        info!(count = items.len(), "Indexed front page items");
        for item in &items {
            debug!(id = %item.id, title = %item.title, score = %item.score, comments = %item.comment_count, "Found item");
        }
        Ok(items)
    }

    async fn fetch_page(&self) -> Result<String, FetchError> {
        let url = self.listing_url.as_str();
        let response = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| FetchError::request(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }
        response.text().await.map_err(|e| FetchError::request(url, e))
    }
}

/// Parse front-page markup into items, keeping the page order.
///
/// Links are resolved against `base`, which is also where discussion threads live.
pub fn parse_front_page(html: &str, base: &Url) -> Vec<Item> {
    let document = Html::parse_document(html);
    let mut items = Vec::new();
    let mut skipped = 0usize;

    for (index, row) in document.select(&ROW).enumerate() {
        match parse_row(row, base) {
            Ok(item) => items.push(item),
            Err(e) => {
                skipped += 1;
                warn!(index, error = %e, "Skipping malformed listing row");
            }
        }
    }

    if skipped > 0 {
        warn!(skipped, kept = items.len(), "Some listing rows were malformed");
    }
    items
}

fn parse_row(row: ElementRef<'_>, base: &Url) -> Result<Item, ParseError> {
    let link = row.select(&TITLE_LINK).next().ok_or(ParseError::MissingTitle)?;
    let title = clean_text(link);
    if title.is_empty() {
        return Err(ParseError::MissingTitle);
    }
    let href = link.value().attr("href").ok_or(ParseError::MissingHref)?;
    let id = row
        .value()
        .attr("id")
        .filter(|id| !id.trim().is_empty())
        .ok_or(ParseError::MissingId)?
        .trim();

    let url = resolve(base, href)?;
    let discussion_url = resolve(base, &format!("item?id={id}"))?;
    let mut item = Item::new(id, title, url, discussion_url);

    if let Some(subtext) = row.next_siblings().filter_map(ElementRef::wrap).next() {
        if let Some(score) = subtext.select(&SCORE).next() {
            item = item.with_score(clean_text(score));
        }
        // The first item link is the age ("3 hours ago"); the comments link is the last one
        if let Some(comments) = subtext.select(&ITEM_LINK).last() {
            let text = clean_text(comments);
            if text.contains("comment") {
                item = item.with_comment_count(text);
            }
        }
    }

    if item.score.is_empty() {
        item = item.with_score(DEFAULT_SCORE);
    }
    if item.comment_count.is_empty() {
        item = item.with_comment_count(DEFAULT_COMMENT_COUNT);
    }
    Ok(item)
}

/// Keep absolute links verbatim, resolve relative ones (self posts) against `base`.
fn resolve(base: &Url, href: &str) -> Result<String, ParseError> {
    if Url::parse(href).is_ok() {
        return Ok(href.to_string());
    }
    base.join(href)
        .map(|u| u.to_string())
        .map_err(|_| ParseError::InvalidLink {
            href: href.to_string(),
        })
}

fn clean_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .replace('\u{a0}', " ")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn base() -> Url {
        Url::parse(FRONT_PAGE_URL).unwrap()
    }

    fn story(id: &str, href: &str, title: &str, subtext: &str) -> String {
        format!(
            r#"<tr class="athing submission" id="{id}">
                 <td class="title"><span class="rank">1.</span></td>
                 <td class="title"><span class="titleline"><a href="{href}">{title}</a><span class="sitebit comhead"> (<a href="from?site=x">x</a>)</span></span></td>
               </tr>
               <tr><td colspan="2"></td><td class="subtext"><span class="subline">{subtext}</span></td></tr>
               <tr class="spacer"></tr>"#
        )
    }

    fn subtext(id: &str, score: &str, comments: &str) -> String {
        format!(
            r#"<span class="score" id="score_{id}">{score}</span> by <a href="user?id=pg">pg</a>
               <span class="age"><a href="item?id={id}">3 hours ago</a></span> |
               <a href="hide?id={id}">hide</a> | <a href="item?id={id}">{comments}</a>"#
        )
    }

    fn page(rows: &[String]) -> String {
        format!(
            "<html><body><center><table id=\"hnmain\"><tr><td><table>{}</table></td></tr></table></center></body></html>",
            rows.concat()
        )
    }

    #[test]
    fn test_parses_well_formed_rows() {
        let html = page(&[
            story("1", "https://a.example/one", "First", &subtext("1", "128 points", "42&nbsp;comments")),
            story("2", "https://b.example/two", "Second &amp; more", &subtext("2", "7 points", "1&nbsp;comment")),
        ]);

        let items = parse_front_page(&html, &base());
        assert_eq!(items.len(), 2);

        assert_eq!(items[0].id, "1");
        assert_eq!(items[0].title, "First");
        assert_eq!(items[0].url, "https://a.example/one");
        assert_eq!(items[0].discussion_url, "https://news.ycombinator.com/item?id=1");
        assert_eq!(items[0].score, "128 points");
        assert_eq!(items[0].comment_count, "42 comments");

        assert_eq!(items[1].title, "Second & more");
        assert_eq!(items[1].comment_count, "1 comment");
        assert!(items.iter().all(|i| i.content.is_none() && i.summary.is_none()));
    }

    #[test]
    fn test_malformed_rows_are_skipped_in_order() {
        let no_title = r#"<tr class="athing" id="10"><td class="title">no link here</td></tr><tr><td></td></tr>"#.to_string();
        let no_href = r#"<tr class="athing" id="11"><td><span class="titleline"><a>Dangling</a></span></td></tr><tr><td></td></tr>"#.to_string();
        let no_id = r#"<tr class="athing"><td><span class="titleline"><a href="https://x.example">No id</a></span></td></tr><tr><td></td></tr>"#.to_string();

        let html = page(&[
            no_title,
            story("1", "https://a.example", "A", &subtext("1", "1 point", "2&nbsp;comments")),
            no_href,
            story("2", "https://b.example", "B", &subtext("2", "2 points", "3&nbsp;comments")),
            no_id,
            story("3", "https://c.example", "C", &subtext("3", "3 points", "4&nbsp;comments")),
        ]);

        let ids: Vec<String> = parse_front_page(&html, &base())
            .into_iter()
            .map(|i| i.id)
            .collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_missing_score_and_comments_default() {
        // Job posts carry neither a score nor a comments link
        let job_subtext = r#"<span class="age"><a href="item?id=5">1 hour ago</a></span>"#;
        let html = page(&[story("5", "https://jobs.example", "We are hiring", job_subtext)]);

        let items = parse_front_page(&html, &base());
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].score, "0 points");
        assert_eq!(items[0].comment_count, "0 comments");
    }

    #[test]
    fn test_discuss_link_means_zero_comments() {
        let html = page(&[story("6", "https://d.example", "Fresh", &subtext("6", "2 points", "discuss"))]);
        let items = parse_front_page(&html, &base());
        assert_eq!(items[0].score, "2 points");
        assert_eq!(items[0].comment_count, "0 comments");
    }

    #[test]
    fn test_self_post_link_is_resolved() {
        let html = page(&[story("7", "item?id=7", "Ask HN: Anything?", &subtext("7", "9 points", "5&nbsp;comments"))]);
        let items = parse_front_page(&html, &base());
        assert_eq!(items[0].url, "https://news.ycombinator.com/item?id=7");
        assert_eq!(items[0].url, items[0].discussion_url);
    }

    #[test]
    fn test_discussion_url_follows_listing_base() {
        let local = Url::parse("http://127.0.0.1:8080/").unwrap();
        let html = page(&[story("8", "https://e.example", "E", &subtext("8", "1 point", "discuss"))]);
        let items = parse_front_page(&html, &local);
        assert_eq!(items[0].discussion_url, "http://127.0.0.1:8080/item?id=8");
    }

    #[test]
    fn test_empty_page_yields_no_items() {
        assert!(parse_front_page("<html><body></body></html>", &base()).is_empty());
    }

    fn listing(server: &MockServer) -> HackerNews {
        HackerNews::new(
            Client::new(),
            Url::parse(&server.uri()).unwrap(),
            StdDuration::from_millis(300),
            RetryPolicy::immediate(3),
        )
    }

    #[tokio::test]
    async fn test_not_found_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let err = listing(&server).index_items().await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status, .. } if status == 404));
    }

    #[tokio::test]
    async fn test_rate_limit_is_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(page(&[story(
                "1",
                "https://a.example",
                "A",
                &subtext("1", "1 point", "discuss"),
            )])))
            .expect(1)
            .mount(&server)
            .await;

        let items = listing(&server).index_items().await.unwrap();
        assert_eq!(items.len(), 1);
    }
}
