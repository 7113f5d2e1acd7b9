// src/crawl/config.rs
// Settings shared by every site crawl in a run.

use super::classifier::ScopeMode;
use super::governor::PolitenessConfig;
use std::path::PathBuf;

pub const DEFAULT_OUTPUT_DIR: &str = "raw-results";
pub const DEFAULT_MAX_CONCURRENT_SITES: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlConfig {
    /// Directory receiving one <site_name>.txt per site
    pub output_root: PathBuf,
    /// Per-domain concurrency cap and delay
    pub politeness: PolitenessConfig,
    pub scope: ScopeMode,
    /// Upper bound on site crawls running at once
    pub max_concurrent_sites: usize,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from(DEFAULT_OUTPUT_DIR),
            politeness: PolitenessConfig::default(),
            scope: ScopeMode::default(),
            max_concurrent_sites: DEFAULT_MAX_CONCURRENT_SITES,
        }
    }
}
