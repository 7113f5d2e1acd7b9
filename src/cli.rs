// src/cli.rs
// =============================================================================
// Command-line interface, parsed with clap's derive API.
//
// Every flag is optional. Run with no arguments, the tool reads ./urls.txt,
// writes ./raw-results/<site>.txt, fetches at most 2 pages at once per site
// with 1 second between fetch starts, and runs until every crawl finishes.
// =============================================================================

use crate::crawl::{
    CrawlConfig, PolitenessConfig, ScopeMode, DEFAULT_MAX_CONCURRENT_SITES, DEFAULT_OUTPUT_DIR,
};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(
    name = "site-harvester",
    version,
    about = "Crawl a list of websites and record every in-domain link",
    long_about = "site-harvester reads seed URLs (one per line), crawls each site concurrently \
                  while staying polite to its host, and writes the links it finds to one \
                  text file per site."
)]
pub struct Cli {
    /// File with one seed URL per line
    #[arg(long, default_value = "urls.txt")]
    pub seeds: PathBuf,

    /// Directory receiving one <site>.txt per crawled site
    #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// Maximum number of sites crawled at the same time
    #[arg(long, default_value_t = DEFAULT_MAX_CONCURRENT_SITES)]
    pub max_sites: usize,

    /// Maximum fetches in flight per site
    #[arg(long, default_value_t = 2)]
    pub parallelism: usize,

    /// Minimum delay between fetch starts on the same site, in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub delay_ms: u64,

    /// Stop all crawls after this many seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Only follow links whose host is the seed's domain or a subdomain of it,
    /// instead of any URL that mentions the site name
    #[arg(long)]
    pub strict_scope: bool,

    /// Print the final summary as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    pub fn crawl_config(&self) -> CrawlConfig {
        CrawlConfig {
            output_root: self.output_dir.clone(),
            politeness: PolitenessConfig {
                max_in_flight: self.parallelism,
                delay: Duration::from_millis(self.delay_ms),
            },
            scope: if self.strict_scope {
                ScopeMode::Host
            } else {
                ScopeMode::Substring
            },
            max_concurrent_sites: self.max_sites,
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_baseline_behaviour() {
        let cli = Cli::parse_from(["site-harvester"]);
        assert_eq!(cli.seeds, PathBuf::from("urls.txt"));
        assert_eq!(cli.timeout(), None);
        assert!(!cli.json);
        assert_eq!(cli.crawl_config(), CrawlConfig::default());
    }

    #[test]
    fn test_flags_map_into_config() {
        let cli = Cli::parse_from([
            "site-harvester",
            "--output-dir",
            "out",
            "--max-sites",
            "3",
            "--parallelism",
            "4",
            "--delay-ms",
            "250",
            "--timeout-secs",
            "60",
            "--strict-scope",
        ]);

        let config = cli.crawl_config();
        assert_eq!(config.output_root, PathBuf::from("out"));
        assert_eq!(config.max_concurrent_sites, 3);
        assert_eq!(config.politeness.max_in_flight, 4);
        assert_eq!(config.politeness.delay, Duration::from_millis(250));
        assert_eq!(config.scope, ScopeMode::Host);
        assert_eq!(cli.timeout(), Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
