//! # HN Podcast
//!
//! Turns the Hacker News front page into a bilingual audio digest. For every
//! front-page story the article and its discussion are fetched through an
//! extraction proxy and summarized by an OpenAI-compatible LLM. All summaries
//! are then narrated into one MP3 by a speech provider.
//!
//! ## Architecture
//!
//! 1. **Listing**: scrape the front page into [`models::Item`]s ([`scrapers::hackernews`])
//! 2. **Fetching**: article and comment text per item ([`scrapers::proxy`]), with retry ([`retry`])
//! 3. **Assembling**: one tagged text block per item ([`assembler`])
//! 4. **Summarizing**: one completion call per item ([`api`])
//! 5. **Narrating**: all summaries to one audio file ([`speech`])
//! 6. **Output**: the item list as JSON next to the audio ([`outputs`])
//!
//! [`pipeline`] ties the stages together and isolates per-item failures.

pub mod api;
pub mod assembler;
pub mod cli;
pub mod config;
pub mod models;
pub mod outputs;
pub mod pipeline;
pub mod retry;
pub mod scrapers;
pub mod speech;
pub mod utils;
