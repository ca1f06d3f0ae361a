//! Crawler module for rendering pages and following links
//!
//! This module contains the core crawling logic, including:
//! - The frontier (work queue and visited set)
//! - Snapshot parsing: text extraction and same-site link discovery
//! - Overall crawl coordination with per-page failure isolation

mod coordinator;
mod frontier;
mod parser;

pub use coordinator::{CrawlOptions, CrawlReport, Crawler, PageError, PageFailure};
pub use frontier::Frontier;
pub use parser::{discover_links, extract_text, parse_snapshot, ParsedPage};

use crate::config::{validate, Config};
use crate::renderer::build_renderer;
use crate::url::{PageUrl, SiteRoot};
use crate::GleanError;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::watch;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Validate the configuration
/// 2. Start the renderer (failure here aborts the run)
/// 3. Drain the frontier from the configured seeds
/// 4. Shut the renderer down
/// 5. Write the corpus file
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl completed, possibly with page failures
/// * `Err(GleanError)` - Startup failed or the corpus could not be written
pub async fn crawl(config: &Config) -> Result<CrawlReport, GleanError> {
    run_crawl(config, None).await
}

/// Runs a crawl that stops early once `shutdown` turns `true`
///
/// The partial corpus is still written.
///
/// # Example
///
/// ```no_run
/// use sumi_glean::config::Config;
/// use sumi_glean::crawler::run_crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Config::for_root("https://www.example.com");
/// let (_tx, rx) = tokio::sync::watch::channel(false);
/// let report = run_crawl(&config, Some(rx)).await?;
/// println!("{} pages", report.records().len());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(
    config: &Config,
    shutdown: Option<watch::Receiver<bool>>,
) -> Result<CrawlReport, GleanError> {
    validate(config)?;

    let site_root = SiteRoot::parse(&config.site.root)?;
    let seeds = seed_urls(config, &site_root)?;

    let renderer = build_renderer(config).await?;

    let mut crawler = Crawler::new(
        Arc::clone(&renderer),
        site_root,
        CrawlOptions::from_config(&config.crawler),
    );
    if let Some(shutdown) = shutdown {
        crawler = crawler.with_shutdown(shutdown);
    }

    let report = crawler.run(seeds).await;

    if let Err(e) = renderer.shutdown().await {
        tracing::warn!("Renderer shutdown failed: {}", e);
    }

    report
        .corpus
        .write_json(Path::new(&config.output.corpus_path))?;

    Ok(report)
}

/// Resolves the configured seeds; an empty list means the root alone
pub fn seed_urls(config: &Config, site_root: &SiteRoot) -> Result<Vec<PageUrl>, GleanError> {
    if config.site.seeds.is_empty() {
        return Ok(vec![site_root.as_page_url()]);
    }

    config
        .site
        .seeds
        .iter()
        .map(|seed| PageUrl::new(seed.as_str()).map_err(GleanError::from))
        .collect()
}
