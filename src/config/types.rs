use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Default navigation timeout per page (milliseconds)
pub const DEFAULT_NAVIGATION_TIMEOUT_MS: u64 = 60_000;

/// Default wait for dynamic content after navigation (milliseconds)
pub const DEFAULT_SETTLE_TIME_MS: u64 = 2_000;

/// Default corpus output path
pub const DEFAULT_CORPUS_PATH: &str = "scraped_content.json";

/// Main configuration structure for Sumi-Glean
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub renderer: RendererConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Builds a default configuration for crawling `root`
    pub fn for_root(root: impl Into<String>) -> Self {
        Self {
            site: SiteConfig {
                root: root.into(),
                seeds: Vec::new(),
            },
            ..Self::default()
        }
    }
}

/// The site being crawled
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SiteConfig {
    /// Root URL; site-relative links are resolved against it
    #[serde(default)]
    pub root: String,

    /// Seed URLs. Empty means the root alone.
    #[serde(default)]
    pub seeds: Vec<String>,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum number of pages rendered at the same time
    #[serde(rename = "max-concurrent-pages-open", default = "default_concurrency")]
    pub max_concurrent_pages_open: u32,

    /// Upper bound on a single page navigation (milliseconds)
    #[serde(rename = "navigation-timeout", default = "default_navigation_timeout")]
    pub navigation_timeout: u64,

    /// Wait after navigation for dynamic content to settle (milliseconds)
    #[serde(rename = "settle-time", default = "default_settle_time")]
    pub settle_time: u64,

    /// Stop dequeuing after this many attempted pages
    #[serde(rename = "max-pages", default)]
    pub max_pages: Option<u32>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_pages_open: default_concurrency(),
            navigation_timeout: default_navigation_timeout(),
            settle_time: default_settle_time(),
            max_pages: None,
        }
    }
}

/// Which engine turns a URL into a page snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RendererEngine {
    /// Headless Chromium; executes page scripts
    #[default]
    Chromium,
    /// Plain HTTP GET; no script execution
    Http,
}

impl fmt::Display for RendererEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Chromium => f.write_str("chromium"),
            Self::Http => f.write_str("http"),
        }
    }
}

impl FromStr for RendererEngine {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "chromium" => Ok(Self::Chromium),
            "http" => Ok(Self::Http),
            other => Err(format!(
                "unknown renderer engine '{}' (expected 'chromium' or 'http')",
                other
            )),
        }
    }
}

/// Renderer configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RendererConfig {
    #[serde(default)]
    pub engine: RendererEngine,

    /// Explicit Chromium executable; auto-detected when unset
    #[serde(rename = "chromium-path", default)]
    pub chromium_path: Option<String>,

    #[serde(default = "default_headless")]
    pub headless: bool,

    /// User agent override
    #[serde(rename = "user-agent", default)]
    pub user_agent: Option<String>,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            engine: RendererEngine::default(),
            chromium_path: None,
            headless: default_headless(),
            user_agent: None,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path of the JSON corpus file
    #[serde(rename = "corpus-path", default = "default_corpus_path")]
    pub corpus_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            corpus_path: default_corpus_path(),
        }
    }
}

fn default_concurrency() -> u32 {
    1
}

fn default_navigation_timeout() -> u64 {
    DEFAULT_NAVIGATION_TIMEOUT_MS
}

fn default_settle_time() -> u64 {
    DEFAULT_SETTLE_TIME_MS
}

fn default_headless() -> bool {
    true
}

fn default_corpus_path() -> String {
    DEFAULT_CORPUS_PATH.to_string()
}
