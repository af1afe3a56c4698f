//! Command-line interface definitions.
//!
//! Provider credentials are not taken as flags; they come from the environment
//! (see [`crate::config`]). The flags only shape a single run.

use crate::scrapers::hackernews::FRONT_PAGE_URL;
use clap::Parser;

/// Fetch the Hacker News front page, summarize each story and its discussion,
/// and narrate the result as one audio file.
///
/// # Examples
///
/// ```sh
/// # Top 10 stories, 1000-token budget per page, artifacts under ./20251019/
/// hn_podcast
///
/// # Top 5 stories with a smaller per-page budget, written under ./out
/// hn_podcast --top-n 5 --max-tokens 500 -o ./out
/// ```
#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct Cli {
    /// Token budget per fetched page; text is cut to four characters per token
    #[arg(long, default_value_t = 1000)]
    pub max_tokens: usize,

    /// Number of top stories to process (0 processes all of them)
    #[arg(long, default_value_t = 10)]
    pub top_n: usize,

    /// Root directory for the date-stamped run directories
    #[arg(short, long, default_value = ".")]
    pub output_dir: String,

    /// Front page to read stories from
    #[arg(long, default_value = FRONT_PAGE_URL)]
    pub listing_url: String,

    /// Timeout in seconds for listing and page fetches
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,
}

impl Cli {
    /// Item-count limit, `None` meaning no limit.
    pub fn limit(&self) -> Option<usize> {
        (self.top_n > 0).then_some(self.top_n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["hn_podcast"]);

        assert_eq!(cli.max_tokens, 1000);
        assert_eq!(cli.top_n, 10);
        assert_eq!(cli.output_dir, ".");
        assert_eq!(cli.listing_url, "https://news.ycombinator.com");
        assert_eq!(cli.timeout_secs, 30);
        assert_eq!(cli.limit(), Some(10));
    }

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from([
            "hn_podcast",
            "--max-tokens",
            "500",
            "--top-n",
            "3",
            "-o",
            "/tmp/podcast",
        ]);

        assert_eq!(cli.max_tokens, 500);
        assert_eq!(cli.top_n, 3);
        assert_eq!(cli.output_dir, "/tmp/podcast");
    }

    #[test]
    fn test_zero_top_n_means_all() {
        let cli = Cli::parse_from(["hn_podcast", "--top-n", "0"]);
        assert_eq!(cli.limit(), None);
    }
}
