//! Sumi-Glean main entry point
//!
//! This is the command-line interface for the Sumi-Glean site harvester.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use sumi_glean::config::{compute_config_hash, read_config, validate, Config, RendererEngine};
use sumi_glean::crawler::{run_crawl, seed_urls};
use sumi_glean::output::print_statistics;
use sumi_glean::url::SiteRoot;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

/// Sumi-Glean: a rendered-page site harvester
///
/// Sumi-Glean renders every page of a single website in a headless browser,
/// follows same-site links breadth-first and writes the visible text of each
/// page to a JSON corpus.
#[derive(Parser, Debug)]
#[command(name = "sumi-glean")]
#[command(version)]
#[command(about = "A rendered-page site harvester", long_about = None)]
struct Cli {
    /// Site root URL (overrides [site] root from the config file)
    #[arg(value_name = "ROOT")]
    root: Option<String>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Seed URL to start from (repeatable; defaults to the root)
    #[arg(long = "seed", value_name = "URL")]
    seeds: Vec<String>,

    /// Corpus output path
    #[arg(short, long, value_name = "PATH")]
    output: Option<String>,

    /// Rendering engine: chromium or http
    #[arg(long, value_name = "ENGINE")]
    engine: Option<RendererEngine>,

    /// Number of pages rendered at the same time
    #[arg(long, value_name = "N")]
    concurrency: Option<u32>,

    /// Stop after this many attempted pages
    #[arg(long, value_name = "N")]
    max_pages: Option<u32>,

    /// Wait after navigation for dynamic content (milliseconds)
    #[arg(long, value_name = "MS")]
    settle_time: Option<u64>,

    /// Show the browser window instead of running headless
    #[arg(long)]
    headed: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate configuration and show what would be crawled without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = build_config(&cli)?;

    if cli.dry_run {
        handle_dry_run(&config)?;
    } else {
        handle_crawl(config, cli.quiet).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_glean=info,warn"),
            1 => EnvFilter::new("sumi_glean=debug,info"),
            2 => EnvFilter::new("sumi_glean=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the config file (if any), layers CLI overrides on top and validates
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let config = read_config(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            let hash = compute_config_hash(path)?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    if let Some(root) = &cli.root {
        config.site.root = root.clone();
    }
    if !cli.seeds.is_empty() {
        config.site.seeds = cli.seeds.clone();
    }
    if let Some(output) = &cli.output {
        config.output.corpus_path = output.clone();
    }
    if let Some(engine) = cli.engine {
        config.renderer.engine = engine;
    }
    if let Some(concurrency) = cli.concurrency {
        config.crawler.max_concurrent_pages_open = concurrency;
    }
    if let Some(max_pages) = cli.max_pages {
        config.crawler.max_pages = Some(max_pages);
    }
    if let Some(settle_time) = cli.settle_time {
        config.crawler.settle_time = settle_time;
    }
    if cli.headed {
        config.renderer.headless = false;
    }

    validate(&config).context("invalid configuration")?;
    Ok(config)
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    let root = SiteRoot::parse(&config.site.root)?;
    let seeds = seed_urls(config, &root)?;

    println!("=== Sumi-Glean Dry Run ===\n");

    println!("Site:");
    println!("  Root: {}", root);
    println!("  Seeds ({}):", seeds.len());
    for seed in &seeds {
        println!("    * {}", seed);
    }

    println!("\nCrawler Configuration:");
    println!(
        "  Max concurrent pages: {}",
        config.crawler.max_concurrent_pages_open
    );
    println!(
        "  Navigation timeout: {}ms",
        config.crawler.navigation_timeout
    );
    println!("  Settle time: {}ms", config.crawler.settle_time);
    match config.crawler.max_pages {
        Some(max) => println!("  Max pages: {}", max),
        None => println!("  Max pages: unlimited"),
    }

    println!("\nRenderer:");
    println!("  Engine: {}", config.renderer.engine);
    if config.renderer.engine == RendererEngine::Chromium {
        println!("  Headless: {}", config.renderer.headless);
        println!(
            "  Executable: {}",
            config
                .renderer
                .chromium_path
                .as_deref()
                .unwrap_or("auto-detect")
        );
    }

    println!("\nOutput:");
    println!("  Corpus: {}", config.output.corpus_path);

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, quiet: bool) -> anyhow::Result<()> {
    tracing::info!(
        "Crawling {} with the {} renderer",
        config.site.root,
        config.renderer.engine
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing pages in flight");
            let _ = shutdown_tx.send(true);
        }
    });

    // Page failures never reach here; only startup and output errors do
    match run_crawl(&config, Some(shutdown_rx)).await {
        Ok(report) => {
            tracing::info!(
                "Scraping complete. Data saved to {}",
                config.output.corpus_path
            );
            if !quiet {
                println!();
                print_statistics(&report.stats);
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
