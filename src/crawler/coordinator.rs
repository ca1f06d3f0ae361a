//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that drains the frontier:
//! - Claiming the next unvisited URL (the visited set is the only dedup point)
//! - Rendering pages, up to the configured number in flight
//! - Extracting text into the corpus and feeding discovered links back
//! - Isolating failures so one bad page never aborts the run
//! - Stopping early on cancellation or when the page cap is reached

use crate::config::CrawlerConfig;
use crate::crawler::frontier::Frontier;
use crate::crawler::parser::{parse_snapshot, ParsedPage};
use crate::output::{CorpusSink, CrawlStatistics, PageRecord};
use crate::renderer::{PageSnapshot, Renderer};
use crate::url::{PageUrl, SiteRoot};
use crate::{ExtractionError, FetchError};
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;

/// Why a single URL produced no record
#[derive(Debug, Clone, Error)]
pub enum PageError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),
}

impl PageError {
    /// Human-readable cause without the URL prefix
    pub fn cause(&self) -> String {
        match self {
            Self::Fetch(e) => e.cause.clone(),
            Self::Extraction(e) => e.to_string(),
        }
    }
}

/// A URL that was visited but left out of the corpus
#[derive(Debug, Clone)]
pub struct PageFailure {
    pub url: PageUrl,
    pub error: PageError,
}

/// Knobs for one crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlOptions {
    /// Pages rendered at the same time; 1 crawls strictly sequentially
    pub max_concurrent_pages_open: usize,

    /// Stop dequeuing after this many attempted URLs
    pub max_pages: Option<u64>,
}

impl CrawlOptions {
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            max_concurrent_pages_open: config.max_concurrent_pages_open.max(1) as usize,
            max_pages: config.max_pages.map(u64::from),
        }
    }
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self::from_config(&CrawlerConfig::default())
    }
}

/// Everything a finished run produced
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// One record per successfully processed page, in visitation order
    ///
    /// Pages rendered concurrently may finish out of order; their records
    /// are still placed by the order their URLs were claimed.
    pub corpus: CorpusSink,

    /// Every attempted URL, in the order it was claimed
    pub visited: Vec<PageUrl>,

    /// Attempted URLs that produced no record, in completion order
    pub failures: Vec<PageFailure>,

    pub stats: CrawlStatistics,
}

impl CrawlReport {
    fn new() -> Self {
        Self {
            corpus: CorpusSink::new(),
            visited: Vec::new(),
            failures: Vec::new(),
            stats: CrawlStatistics::start(),
        }
    }

    pub fn records(&self) -> &[PageRecord] {
        self.corpus.records()
    }

    pub fn was_visited(&self, url: &PageUrl) -> bool {
        self.visited.contains(url)
    }
}

/// Main crawler structure
///
/// Holds the injected renderer and the site root. The frontier is not a
/// field: every call to [`run`](Self::run) builds its own, so independent
/// runs never share state.
pub struct Crawler {
    renderer: Arc<dyn Renderer>,
    site_root: SiteRoot,
    options: CrawlOptions,
    shutdown: Option<watch::Receiver<bool>>,
}

impl Crawler {
    /// Creates a new crawler
    ///
    /// # Arguments
    ///
    /// * `renderer` - The engine that turns URLs into snapshots
    /// * `site_root` - Root used to decide which links are same-site
    /// * `options` - Concurrency and page cap
    pub fn new(renderer: Arc<dyn Renderer>, site_root: SiteRoot, options: CrawlOptions) -> Self {
        Self {
            renderer,
            site_root,
            options,
            shutdown: None,
        }
    }

    /// Installs a cancellation signal
    ///
    /// Once the channel holds `true`, the crawler stops dequeuing, lets pages
    /// already in flight finish, and returns the partial corpus.
    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    pub fn site_root(&self) -> &SiteRoot {
        &self.site_root
    }

    /// Crawls the site starting from `seeds`
    ///
    /// Never fails: per-URL errors are logged, recorded in the report and the
    /// URL stays visited so it is not retried. An empty seed set yields an
    /// empty report.
    pub async fn run<I>(&self, seeds: I) -> CrawlReport
    where
        I: IntoIterator<Item = PageUrl>,
    {
        let mut frontier = Frontier::new();
        frontier.seed(seeds);

        let mut report = CrawlReport::new();
        let mut in_flight = FuturesUnordered::new();

        tracing::info!(
            "Starting crawl of {} with {} seed URLs",
            self.site_root,
            frontier.len()
        );

        // Records of finished pages, keyed by claim position
        let mut completed: Vec<(usize, PageRecord)> = Vec::new();

        loop {
            // Fill the pool from the frontier
            while in_flight.len() < self.options.max_concurrent_pages_open {
                report.stats.duplicates_skipped += frontier.skip_visited() as u64;
                if !frontier.has_work() {
                    break;
                }

                if self.stop_requested(&report.stats) {
                    report.stats.interrupted = true;
                    break;
                }

                let Some(url) = claim_next(&mut frontier, &mut report.stats) else {
                    break;
                };

                tracing::info!("Scraping: {}", url);
                let position = report.visited.len();
                report.stats.pages_attempted += 1;
                report.visited.push(url.clone());

                let renderer = Arc::clone(&self.renderer);
                in_flight.push(async move {
                    let fetched = renderer.render(&url).await;
                    (position, url, fetched)
                });
            }

            let Some((position, url, fetched)) = in_flight.next().await else {
                if report.stats.interrupted {
                    tracing::info!(
                        "Crawl stopped early with {} URLs left in frontier",
                        frontier.len()
                    );
                } else {
                    tracing::info!("Frontier is empty, crawl complete");
                }
                break;
            };

            if let Some(record) = self.handle_page(url, fetched, &mut frontier, &mut report) {
                completed.push((position, record));
            }

            let done = report.stats.pages_processed + report.stats.pages_failed();
            if done % 10 == 0 {
                tracing::info!(
                    "Progress: {} pages done ({} failed), {} in frontier, {} visited",
                    done,
                    report.stats.pages_failed(),
                    frontier.len(),
                    frontier.visited_count()
                );
            }
        }

        completed.sort_by_key(|(position, _)| *position);
        for (_, record) in completed {
            report.corpus.push(record);
        }

        report.stats.finish();

        tracing::info!(
            "Crawl finished: {} records, {} failures, {} URLs visited",
            report.corpus.len(),
            report.failures.len(),
            report.visited.len()
        );

        report
    }

    /// Records the outcome of one rendered URL
    ///
    /// Returns the page's record on success; the caller places it in the
    /// corpus.
    fn handle_page(
        &self,
        url: PageUrl,
        fetched: Result<PageSnapshot, FetchError>,
        frontier: &mut Frontier,
        report: &mut CrawlReport,
    ) -> Option<PageRecord> {
        match self.process_snapshot(fetched) {
            Ok(parsed) => {
                let enqueued = frontier.enqueue_many(parsed.links);
                tracing::debug!("{}: {} new links enqueued", url, enqueued);

                report.stats.pages_processed += 1;
                report.stats.links_enqueued += enqueued as u64;
                Some(PageRecord::new(url, parsed.text))
            }
            Err(error) => {
                tracing::warn!("Failed to scrape {}: {}", url, error.cause());

                match &error {
                    PageError::Fetch(_) => report.stats.fetch_failures += 1,
                    PageError::Extraction(_) => report.stats.extraction_failures += 1,
                }
                report.failures.push(PageFailure { url, error });
                None
            }
        }
    }

    fn process_snapshot(
        &self,
        fetched: Result<PageSnapshot, FetchError>,
    ) -> Result<ParsedPage, PageError> {
        let snapshot = fetched?;
        Ok(parse_snapshot(&snapshot, &self.site_root)?)
    }

    fn stop_requested(&self, stats: &CrawlStatistics) -> bool {
        if let Some(max_pages) = self.options.max_pages {
            if stats.pages_attempted >= max_pages {
                tracing::info!("Page limit of {} reached, stopping", max_pages);
                return true;
            }
        }

        if let Some(shutdown) = &self.shutdown {
            if *shutdown.borrow() {
                tracing::info!("Shutdown requested, stopping");
                return true;
            }
        }

        false
    }
}

/// Pops URLs until one is claimed for this run
///
/// Claiming marks the URL visited before it is rendered, so a queue duplicate
/// or a concurrent rediscovery can never cause a second render.
fn claim_next(frontier: &mut Frontier, stats: &mut CrawlStatistics) -> Option<PageUrl> {
    while frontier.has_work() {
        let url = frontier.dequeue().ok()?;

        if frontier.mark_visited(url.clone()) {
            return Some(url);
        }

        tracing::trace!("Skipping already visited {}", url);
        stats.duplicates_skipped += 1;
    }

    None
}
