//! Data model for one front-page entry.
//!
//! An [`Item`] starts out with whatever the listing page tells us and gains
//! `content` and `summary` as it moves through the pipeline. Each stage hands back
//! a new value through [`Item::with_content`] / [`Item::with_summary`], so an item
//! that failed half-way is simply the last value a stage produced.
//!
//! Unpopulated fields serialize as `null`, keeping the shape of the JSON
//! artifact identical for every item.

use serde::{Deserialize, Serialize};

/// Score text used when the listing row has no score (job posts, for instance).
pub const DEFAULT_SCORE: &str = "0 points";

/// Comment-count text used when the listing row has no comments link.
pub const DEFAULT_COMMENT_COUNT: &str = "0 comments";

/// One aggregator entry: an article and its discussion thread.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Item {
    /// The aggregator's internal identifier, unique within a run.
    pub id: String,
    /// Story title as displayed on the front page.
    pub title: String,
    /// External article address. May point at a PDF or other non-HTML resource.
    pub url: String,
    /// Address of the discussion thread on the aggregator.
    pub discussion_url: String,
    /// Display string such as `"128 points"`.
    pub score: String,
    /// Display string such as `"42 comments"`.
    pub comment_count: String,
    /// Assembled text block fed to the summarizer.
    pub content: Option<String>,
    /// Bilingual narrative summary.
    pub summary: Option<String>,
}

impl Item {
    /// Build a freshly listed item with no content or summary yet.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        url: impl Into<String>,
        discussion_url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            url: url.into(),
            discussion_url: discussion_url.into(),
            score: DEFAULT_SCORE.to_string(),
            comment_count: DEFAULT_COMMENT_COUNT.to_string(),
            content: None,
            summary: None,
        }
    }

    pub fn with_score(self, score: impl Into<String>) -> Self {
        Self {
            score: score.into(),
            ..self
        }
    }

    pub fn with_comment_count(self, comment_count: impl Into<String>) -> Self {
        Self {
            comment_count: comment_count.into(),
            ..self
        }
    }

    /// Attach the assembled text block.
    pub fn with_content(self, content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..self
        }
    }

    /// Attach the narrative summary.
    ///
    /// A summary only makes sense on top of non-empty content; an item without
    /// content is returned unchanged.
    pub fn with_summary(self, summary: impl Into<String>) -> Self {
        if !self.has_content() {
            return self;
        }
        Self {
            summary: Some(summary.into()),
            ..self
        }
    }

    pub fn has_content(&self) -> bool {
        self.content.as_deref().is_some_and(|c| !c.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Item {
        Item::new(
            "41000001",
            "Show HN: A tiny database",
            "https://example.com/db",
            "https://news.ycombinator.com/item?id=41000001",
        )
    }

    #[test]
    fn test_new_item_uses_zero_defaults() {
        let item = sample();
        assert_eq!(item.score, "0 points");
        assert_eq!(item.comment_count, "0 comments");
        assert!(item.content.is_none());
        assert!(item.summary.is_none());
    }

    #[test]
    fn test_stages_rebuild_the_item() {
        let listed = sample().with_score("12 points").with_comment_count("3 comments");
        let fetched = listed.clone().with_content("<title>\nShow HN\n</title>");
        let summarized = fetched.clone().with_summary("A short story.");

        assert!(listed.content.is_none());
        assert!(fetched.summary.is_none());
        assert_eq!(summarized.summary.as_deref(), Some("A short story."));
        assert_eq!(summarized.score, "12 points");
    }

    #[test]
    fn test_summary_requires_content() {
        let item = sample().with_summary("orphan");
        assert!(item.summary.is_none());

        let item = sample().with_content("").with_summary("orphan");
        assert!(item.summary.is_none());
    }

    #[test]
    fn test_unpopulated_fields_serialize_as_null() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["id"], "41000001");
        assert_eq!(json["discussion_url"], "https://news.ycombinator.com/item?id=41000001");
        assert!(json["content"].is_null());
        assert!(json["summary"].is_null());
    }

    #[test]
    fn test_item_deserialization() {
        let json = r#"{
            "id": "1",
            "title": "T",
            "url": "https://a.example",
            "discussion_url": "https://news.ycombinator.com/item?id=1",
            "score": "5 points",
            "comment_count": "0 comments",
            "content": "<title>\nT\n</title>",
            "summary": null
        }"#;
        let item: Item = serde_json::from_str(json).unwrap();
        assert_eq!(item.score, "5 points");
        assert!(item.has_content());
        assert!(item.summary.is_none());
    }
}
