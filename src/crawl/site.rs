// src/crawl/site.rs
// =============================================================================
// Crawls one website, starting from its seed URL.
//
// How it works:
// 1. Init: work out the site's identity (domain + short name) from the seed
//    and open <output_root>/<site_name>.txt. If either fails, this seed is
//    abandoned (the caller logs it), other seeds are unaffected.
// 2. Running: pop a URL off the queue, wait for the politeness governor, then
//    fetch it in its own task. That task scans the page's anchors, resolves
//    and classifies them, and marks each one in the visited set. Only links it
//    saw FIRST come back to the coordinator loop, which writes them to the
//    output file and queues them for fetching.
// 3. Draining: once the queue is empty and no fetch is outstanding, flush
//    the output file.
// 4. Done: hand back a SiteReport.
//
// A failed fetch is logged and simply contributes no links. Nothing is ever
// retried.
// =============================================================================

use super::classifier::LinkClassifier;
use super::config::CrawlConfig;
use super::governor::{FetchPermit, PolitenessGovernor};
use super::sink::OutputSink;
use super::visited::VisitedSet;
use crate::fetch::Fetcher;
use serde::Serialize;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

/// Reasons a whole seed is abandoned
#[derive(Debug, Error)]
pub enum SiteError {
    #[error("invalid seed URL '{seed}': {source}")]
    InvalidSeed {
        seed: String,
        #[source]
        source: url::ParseError,
    },

    #[error("seed URL has no host: {0}")]
    MissingHost(String),

    #[error("could not extract site name from URL: {0}")]
    EmptySiteName(String),

    #[error("error creating directory {}: {source}", path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("output file {} is already used by another seed", path.display())]
    OutputInUse { path: PathBuf },

    #[error("error writing file {}: {source}", path.display())]
    OutputFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Who we are crawling, derived once from the seed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteIdentity {
    /// The parsed seed URL
    pub seed: Url,
    /// Host of the seed, e.g. "www.example.com"
    pub domain: String,
    /// First label of the host without "www.", e.g. "example"
    pub site_name: String,
}

impl SiteIdentity {
    /// Example:
    ///   "https://www.example.com/start" -> domain "www.example.com", site_name "example"
    pub fn from_seed(seed: &str) -> Result<Self, SiteError> {
        let url = Url::parse(seed).map_err(|source| SiteError::InvalidSeed {
            seed: seed.to_string(),
            source,
        })?;

        let domain = url
            .host_str()
            .filter(|host| !host.is_empty())
            .ok_or_else(|| SiteError::MissingHost(seed.to_string()))?
            .to_string();

        let site_name = domain
            .strip_prefix("www.")
            .unwrap_or(&domain)
            .split('.')
            .next()
            .unwrap_or("")
            .to_string();

        if site_name.is_empty() {
            return Err(SiteError::EmptySiteName(seed.to_string()));
        }

        Ok(Self {
            seed: url,
            domain,
            site_name,
        })
    }

    // Only pages on the seed's own host are fetched
    fn hosts(&self, url: &Url) -> bool {
        url.host_str() == Some(self.domain.as_str())
    }
}

/// What a finished site crawl did
#[derive(Debug, Clone, Serialize)]
pub struct SiteReport {
    pub seed: String,
    pub site_name: String,
    pub domain: String,
    pub output: PathBuf,
    /// Fetches issued, including ones that failed
    pub requests: usize,
    /// Lines written to the output file
    pub discovered: usize,
    pub failed_fetches: usize,
    pub cancelled: bool,
}

// Shared by the coordinator and every fetch task of one crawl
struct SiteContext {
    identity: SiteIdentity,
    classifier: LinkClassifier,
    visited: VisitedSet,
    fetcher: Arc<dyn Fetcher>,
}

// Result of one fetch task
struct Visit {
    url: Url,
    // None if the fetch failed
    discovered: Option<Vec<Url>>,
}

/// One site's crawl, ready to run
pub struct SiteCrawler {
    context: Arc<SiteContext>,
    governor: PolitenessGovernor,
    sink: OutputSink,
}

impl SiteCrawler {
    /// Init step: derive the site identity and open the output file
    pub async fn new(
        seed: &str,
        config: &CrawlConfig,
        fetcher: Arc<dyn Fetcher>,
    ) -> Result<Self, SiteError> {
        let identity = SiteIdentity::from_seed(seed)?;
        Self::from_identity(identity, config, fetcher).await
    }

    /// Init step for an identity the caller already derived
    pub async fn from_identity(
        identity: SiteIdentity,
        config: &CrawlConfig,
        fetcher: Arc<dyn Fetcher>,
    ) -> Result<Self, SiteError> {
        let sink = OutputSink::create(&config.output_root, &identity.site_name).await?;
        let classifier = LinkClassifier::new(&identity, config.scope);

        info!(
            domain = %identity.domain,
            output = %sink.path().display(),
            "Allowed domain"
        );

        Ok(Self {
            context: Arc::new(SiteContext {
                identity,
                classifier,
                visited: VisitedSet::new(),
                fetcher,
            }),
            governor: PolitenessGovernor::new(config.politeness),
            sink,
        })
    }

    pub fn identity(&self) -> &SiteIdentity {
        &self.context.identity
    }

    /// Runs the crawl until the queue drains or `cancel` fires
    pub async fn run(mut self, cancel: CancellationToken) -> Result<SiteReport, SiteError> {
        let seed = self.context.identity.seed.clone();

        let mut queue = VecDeque::from([seed]);
        let mut tasks: JoinSet<Visit> = JoinSet::new();
        let mut requests = 0;
        let mut failed_fetches = 0;
        let mut cancelled = false;

        'crawl: loop {
            // Start as many queued fetches as the governor lets through
            while let Some(url) = queue.pop_front() {
                let Some(permit) = self.governor.acquire(&cancel).await else {
                    cancelled = true;
                    break 'crawl;
                };

                requests += 1;
                debug!(url = %url, in_flight = tasks.len() + 1, "Visiting");
                tasks.spawn(visit(self.context.clone(), url, permit));
            }

            let joined = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    cancelled = true;
                    break 'crawl;
                }
                joined = tasks.join_next() => joined,
            };

            // Queue empty and nothing outstanding
            let Some(joined) = joined else {
                break;
            };

            let done = match joined {
                Ok(done) => done,
                Err(e) => {
                    warn!(error = %e, "Fetch task did not complete");
                    failed_fetches += 1;
                    continue;
                }
            };

            let Some(discovered) = done.discovered else {
                failed_fetches += 1;
                continue;
            };

            for link in discovered {
                self.sink.append(link.as_str()).await?;

                if link != self.context.identity.seed && self.context.identity.hosts(&link) {
                    queue.push_back(link);
                }
            }
            debug!(url = %done.url, queued = queue.len(), "Page done");
        }

        if cancelled {
            tasks.abort_all();
            warn!(requests, "Crawl cancelled before the queue drained");
        }

        let discovered = self.sink.lines();
        let output = self.sink.close().await?;
        let identity = &self.context.identity;

        info!(
            requests,
            discovered,
            visited = self.context.visited.len(),
            "Total links visited"
        );

        Ok(SiteReport {
            seed: identity.seed.to_string(),
            site_name: identity.site_name.clone(),
            domain: identity.domain.clone(),
            output,
            requests,
            discovered,
            failed_fetches,
            cancelled,
        })
    }
}

// Fetches one page and returns the links this crawl had not seen before.
// The permit is held until the task ends.
async fn visit(context: Arc<SiteContext>, url: Url, _permit: FetchPermit) -> Visit {
    let page = match context.fetcher.fetch(&url).await {
        Ok(page) => page,
        Err(e) => {
            warn!(url = %url, error = %e, "Error visiting");
            return Visit {
                url,
                discovered: None,
            };
        }
    };

    let discovered = page
        .hrefs()
        .iter()
        .filter_map(|href| page.resolve(href))
        .filter(|link| context.classifier.accepts(link.as_str()))
        .filter(|link| context.visited.mark_if_new(link.as_str()))
        .collect();

    Visit {
        url,
        discovered: Some(discovered),
    }
}
