// src/crawl/supervisor.rs
// =============================================================================
// Runs one SiteCrawler per seed and waits for all of them.
//
// - Each site crawl is its own tokio task, so sites really run in parallel
//   and a panic in one cannot take the others down.
// - At most `max_concurrent_sites` crawls run at once. The seed list feeds a
//   stream, and buffer_unordered() only pulls (and spawns) the next seed when
//   a running crawl finishes.
// - A seed that fails (bad URL, output file trouble) is logged and left out
//   of the summary. Its siblings carry on.
// - Each output file belongs to one seed for the whole run. Seeds sharing a
//   site name (example.com and example.org both map to example.txt) would
//   otherwise write over each other; the first to claim the file wins and
//   the others are abandoned.
// =============================================================================

use super::config::CrawlConfig;
use super::sink::OutputSink;
use super::site::{SiteCrawler, SiteError, SiteIdentity, SiteReport};
use crate::fetch::Fetcher;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, info_span, Instrument};

/// Outcome of a whole run
#[derive(Debug, Clone, Serialize)]
pub struct CrawlSummary {
    /// Reports of every site that got past Init, in completion order
    pub sites: Vec<SiteReport>,
    /// Seeds abandoned with an error
    pub failed_seeds: usize,
}

impl CrawlSummary {
    pub fn total_requests(&self) -> usize {
        self.sites.iter().map(|site| site.requests).sum()
    }
}

// Output files already handed out during this run
#[derive(Debug, Default)]
struct OutputClaims {
    taken: Mutex<HashSet<PathBuf>>,
}

impl OutputClaims {
    // True if `path` was free and now belongs to the caller
    fn claim(&self, path: PathBuf) -> bool {
        self.taken
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path)
    }
}

pub struct Supervisor {
    config: Arc<CrawlConfig>,
    fetcher: Arc<dyn Fetcher>,
}

impl Supervisor {
    pub fn new(config: CrawlConfig, fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            config: Arc::new(config),
            fetcher,
        }
    }

    /// Crawls every seed and returns once all crawls are done
    pub async fn run(&self, seeds: Vec<String>, cancel: CancellationToken) -> CrawlSummary {
        let total = seeds.len();
        let workers = self.config.max_concurrent_sites.max(1);

        info!(seeds = total, workers, "Starting crawls");

        let claims = Arc::new(OutputClaims::default());

        let crawls = seeds.into_iter().map(|seed| {
            let config = self.config.clone();
            let fetcher = self.fetcher.clone();
            let cancel = cancel.clone();
            let claims = claims.clone();
            let span = info_span!("site", seed = %seed);

            tokio::spawn(crawl_seed(seed, config, fetcher, claims, cancel).instrument(span))
        });

        let sites: Vec<SiteReport> = stream::iter(crawls)
            .buffer_unordered(workers)
            .filter_map(|joined| async move {
                match joined {
                    Ok(report) => report,
                    Err(e) => {
                        error!(error = %e, "Site crawl task failed");
                        None
                    }
                }
            })
            .collect()
            .await;

        let summary = CrawlSummary {
            failed_seeds: total - sites.len(),
            sites,
        };

        info!(
            sites = summary.sites.len(),
            failed = summary.failed_seeds,
            requests = summary.total_requests(),
            "Scraping completed for all websites"
        );

        summary
    }
}

// Runs a single seed to completion, turning any failure into a log line
async fn crawl_seed(
    seed: String,
    config: Arc<CrawlConfig>,
    fetcher: Arc<dyn Fetcher>,
    claims: Arc<OutputClaims>,
    cancel: CancellationToken,
) -> Option<SiteReport> {
    info!("Starting scrape");

    let crawler = match start_crawler(&seed, &config, fetcher, &claims).await {
        Ok(crawler) => crawler,
        Err(e) => {
            error!(error = %e, "Abandoning seed");
            return None;
        }
    };

    let site_name = crawler.identity().site_name.clone();

    match crawler.run(cancel).await {
        Ok(report) => Some(report),
        Err(e) => {
            error!(site = %site_name, error = %e, "Crawl aborted");
            None
        }
    }
}

// Init for one seed, after making sure no other seed writes the same file
async fn start_crawler(
    seed: &str,
    config: &CrawlConfig,
    fetcher: Arc<dyn Fetcher>,
    claims: &OutputClaims,
) -> Result<SiteCrawler, SiteError> {
    let identity = SiteIdentity::from_seed(seed)?;

    let path = OutputSink::path_for(&config.output_root, &identity.site_name);
    if !claims.claim(path.clone()) {
        return Err(SiteError::OutputInUse { path });
    }

    SiteCrawler::from_identity(identity, config, fetcher).await
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why spawn inside the stream instead of spawning everything up front?
//    - Iterator::map is lazy: tokio::spawn only runs when buffer_unordered
//      asks for the next item, which it does when a slot frees up
//    - So a 10,000 line seed list never has more than `workers` crawls alive
//
// 2. Why does a JoinError only log?
//    - It means the crawl task panicked or was aborted; that seed is lost,
//      but the rest of the run is unaffected
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawl::governor::PolitenessConfig;
    use crate::fetch::testing::StaticWeb;
    use std::time::Duration;

    fn supervisor(root: &std::path::Path, web: Arc<StaticWeb>, workers: usize) -> Supervisor {
        let config = CrawlConfig {
            output_root: root.to_path_buf(),
            politeness: PolitenessConfig {
                max_in_flight: 2,
                delay: Duration::ZERO,
            },
            max_concurrent_sites: workers,
            ..CrawlConfig::default()
        };
        Supervisor::new(config, web)
    }

    fn read(path: std::path::PathBuf) -> String {
        std::fs::read_to_string(path).unwrap()
    }

    #[tokio::test]
    async fn test_malformed_seed_is_isolated() {
        let dir = tempfile::tempdir().unwrap();
        let web = Arc::new(
            StaticWeb::new()
                .page("http://example.com/", r#"<a href="/a">A</a>"#)
                .page("http://example.com/a", ""),
        );

        let summary = supervisor(dir.path(), web, 4)
            .run(
                vec!["not a url".to_string(), "http://example.com".to_string()],
                CancellationToken::new(),
            )
            .await;

        assert_eq!(summary.failed_seeds, 1);
        assert_eq!(summary.sites.len(), 1);
        assert_eq!(summary.sites[0].site_name, "example");
        assert_eq!(read(dir.path().join("example.txt")), "http://example.com/a\n");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_sites_do_not_share_links() {
        let dir = tempfile::tempdir().unwrap();
        let web = Arc::new(
            StaticWeb::new()
                .page(
                    "https://alpha.com/",
                    r#"<a href="/one">One</a><a href="https://beta.org/x">Beta</a>"#,
                )
                .page("https://alpha.com/one", "")
                .page(
                    "https://beta.org/",
                    r#"<a href="/two">Two</a><a href="https://alpha.com/y">Alpha</a>"#,
                )
                .page("https://beta.org/two", ""),
        );

        let summary = supervisor(dir.path(), web, 4)
            .run(
                vec!["https://alpha.com/".to_string(), "https://beta.org/".to_string()],
                CancellationToken::new(),
            )
            .await;

        assert_eq!(summary.failed_seeds, 0);
        assert_eq!(summary.sites.len(), 2);
        assert_eq!(summary.total_requests(), 4);
        assert_eq!(read(dir.path().join("alpha.txt")), "https://alpha.com/one\n");
        assert_eq!(read(dir.path().join("beta.txt")), "https://beta.org/two\n");
    }

    fn many_links(host: &str, count: usize) -> String {
        (0..count)
            .map(|i| format!(r#"<a href="https://{}/page-{}">{}</a>"#, host, i, i))
            .collect()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_shared_site_name_keeps_one_owner_per_file() {
        let dir = tempfile::tempdir().unwrap();
        let web = Arc::new(
            StaticWeb::new()
                .page("https://example.com/", &many_links("example.com", 200))
                .page("https://example.org/", &many_links("example.org", 200)),
        );

        let summary = supervisor(dir.path(), web, 4)
            .run(
                vec![
                    "https://example.com/".to_string(),
                    "https://example.org/".to_string(),
                ],
                CancellationToken::new(),
            )
            .await;

        // Both map to example.txt: one seed owns it, the other is abandoned
        assert_eq!(summary.sites.len(), 1);
        assert_eq!(summary.failed_seeds, 1);

        let winner = &summary.sites[0];
        assert_eq!(winner.output, dir.path().join("example.txt"));
        assert_eq!(winner.discovered, 200);

        let content = read(winner.output.clone());
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 200);
        let prefix = format!("https://{}/page-", winner.domain);
        assert!(lines.iter().all(|line| line.starts_with(&prefix)));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_output_claims_are_exclusive() {
        let claims = OutputClaims::default();
        assert!(claims.claim(PathBuf::from("out/example.txt")));
        assert!(!claims.claim(PathBuf::from("out/example.txt")));
        assert!(claims.claim(PathBuf::from("out/other.txt")));
    }

    #[tokio::test]
    async fn test_bounded_pool_still_runs_every_seed() {
        let dir = tempfile::tempdir().unwrap();
        let mut web = StaticWeb::new();
        let mut seeds = Vec::new();
        for name in ["one", "two", "three", "four", "five"] {
            let url = format!("https://{}.net/", name);
            web = web.page(&url, "");
            seeds.push(url);
        }

        let summary = supervisor(dir.path(), Arc::new(web), 2)
            .run(seeds, CancellationToken::new())
            .await;

        assert_eq!(summary.sites.len(), 5);
        assert_eq!(summary.failed_seeds, 0);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 5);
    }

    #[tokio::test]
    async fn test_empty_seed_list() {
        let dir = tempfile::tempdir().unwrap();
        let summary = supervisor(dir.path(), Arc::new(StaticWeb::new()), 4)
            .run(Vec::new(), CancellationToken::new())
            .await;

        assert!(summary.sites.is_empty());
        assert_eq!(summary.failed_seeds, 0);
    }
}
