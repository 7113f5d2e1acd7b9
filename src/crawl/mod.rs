// src/crawl/mod.rs
// =============================================================================
// The crawl engine.
//
// Submodules, leaves first:
// - classifier: which discovered links are in scope
// - visited:    per-crawl "seen it already?" set
// - governor:   per-domain concurrency cap and request spacing
// - sink:       the per-site results file
// - site:       one site's traversal
// - supervisor: one crawl per seed, on a bounded pool
// - config:     settings shared by all crawls
// =============================================================================

mod classifier;
mod config;
mod governor;
mod sink;
mod site;
mod supervisor;
mod visited;

pub use classifier::ScopeMode;
pub use config::{CrawlConfig, DEFAULT_MAX_CONCURRENT_SITES, DEFAULT_OUTPUT_DIR};
pub use governor::PolitenessConfig;
pub use supervisor::{CrawlSummary, Supervisor};
