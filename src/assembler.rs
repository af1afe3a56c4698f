//! Builds the text block handed to the summarizer for one item.
//!
//! Up to three tagged sections, in a fixed order, joined by a horizontal-rule
//! separator:
//!
//! ```text
//! <title>
//! Story title
//! </title>
//!
//! ---
//!
//! <article>
//! ...
//! </article>
//!
//! ---
//!
//! <comments>
//! ...
//! </comments>
//! ```
//!
//! Sections whose source text is empty are left out.

/// Separator placed between sections.
pub const SECTION_SEPARATOR: &str = "\n\n---\n\n";

/// Combine title, article and comments into one delimited block.
///
/// Returns an empty string only when all three inputs are empty.
pub fn assemble(title: &str, article: &str, comments: &str) -> String {
    [("title", title), ("article", article), ("comments", comments)]
        .into_iter()
        .filter(|(_, text)| !text.is_empty())
        .map(|(tag, text)| format!("<{tag}>\n{text}\n</{tag}>"))
        .collect::<Vec<_>>()
        .join(SECTION_SEPARATOR)
}
