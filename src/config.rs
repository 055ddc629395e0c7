//! Fixed engine constants and command-line configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::merge::DedupPolicy;

/// Cross-origin relay every source is fetched through.
pub const RELAY_ENDPOINT: &str = "https://allorigins.hexlet.app";

/// Quiet period between the end of one poll cycle and the start of the next.
pub const POLL_DELAY: Duration = Duration::from_millis(5000);

/// Upper bound on a single relay request, so a hung source cannot stall a
/// cycle forever.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

pub const USER_AGENT: &str = concat!("feedmerge/", env!("CARGO_PKG_VERSION"));

/// Feed shown when no source is given on the command line.
pub const DEFAULT_SOURCE: &str = "https://feeds.bbci.co.uk/news/rss.xml";

/// Tunables of the polling engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    pub poll_delay: Duration,
    pub dedup: DedupPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            poll_delay: POLL_DELAY,
            dedup: DedupPolicy::Title,
        }
    }
}

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "feedmerge", version, about)]
pub struct Cli {
    /// Feed URLs to track from startup.
    pub sources: Vec<String>,

    /// How incoming posts are matched against known ones.
    #[arg(long, value_enum, default_value_t = DedupPolicy::Title)]
    pub dedup: DedupPolicy,

    /// Write logs to this file (the terminal is taken by the UI).
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Log level: trace, debug, info, warn or error.
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Cli {
    /// Sources to submit at startup, falling back to [`DEFAULT_SOURCE`].
    pub fn initial_sources(&self) -> Vec<String> {
        if self.sources.is_empty() {
            vec![DEFAULT_SOURCE.to_string()]
        } else {
            self.sources.clone()
        }
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            dedup: self.dedup,
            ..EngineConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_engine_config_uses_fixed_delay() {
        let config = EngineConfig::default();
        assert_eq!(config.poll_delay, Duration::from_millis(5000));
        assert_eq!(config.dedup, DedupPolicy::Title);
    }

    #[test]
    fn parses_sources_and_flags() {
        let cli = Cli::parse_from([
            "feedmerge",
            "https://a.example/rss",
            "https://b.example/rss",
            "--dedup",
            "feed-and-title",
            "--log-file",
            "/tmp/feedmerge.log",
        ]);

        assert_eq!(cli.sources.len(), 2);
        assert_eq!(cli.dedup, DedupPolicy::FeedAndTitle);
        assert_eq!(cli.log_file, Some(PathBuf::from("/tmp/feedmerge.log")));
        assert_eq!(cli.log_level, "info");
        assert_eq!(cli.engine_config().dedup, DedupPolicy::FeedAndTitle);
        assert_eq!(cli.engine_config().poll_delay, POLL_DELAY);
    }

    #[test]
    fn falls_back_to_default_source() {
        let cli = Cli::parse_from(["feedmerge"]);
        assert_eq!(cli.initial_sources(), vec![DEFAULT_SOURCE.to_string()]);
    }
}
