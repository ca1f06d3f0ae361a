//! Renderer abstraction: turns a URL into a page snapshot
//!
//! The crawler only sees the [`Renderer`] trait. Two engines implement it:
//! - [`ChromiumRenderer`]: headless Chromium, one fresh browser context per page
//! - [`HttpRenderer`]: plain HTTP GET for sites that need no script execution

mod chromium;
mod http;

pub use chromium::ChromiumRenderer;
pub use http::{build_http_client, HttpRenderer};

use crate::config::{Config, RendererEngine};
use crate::url::PageUrl;
use crate::{FetchError, GleanError};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Rendered markup for one page at fetch time
///
/// Produced once per visit and consumed by text extraction and link
/// discovery. It is never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSnapshot {
    url: PageUrl,
    html: String,
}

impl PageSnapshot {
    pub fn new(url: PageUrl, html: impl Into<String>) -> Self {
        Self {
            url,
            html: html.into(),
        }
    }

    /// The address that was requested
    pub fn url(&self) -> &PageUrl {
        &self.url
    }

    pub fn html(&self) -> &str {
        &self.html
    }
}

/// Timing bounds shared by every engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Upper bound on navigation (and on the whole request for HTTP)
    pub navigation_timeout: Duration,
    /// Wait after navigation for dynamically loaded content
    pub settle_time: Duration,
}

impl RenderOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            navigation_timeout: Duration::from_millis(config.crawler.navigation_timeout),
            settle_time: Duration::from_millis(config.crawler.settle_time),
        }
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// An engine that produces page snapshots
///
/// Every `render` call must run in its own isolated context (no cookies,
/// storage or page state shared with other calls) and release that context
/// before returning, on the error path as well.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Render one page
    async fn render(&self, url: &PageUrl) -> Result<PageSnapshot, FetchError>;

    /// Shut the engine down; no `render` calls may follow
    async fn shutdown(&self) -> Result<(), GleanError>;

    /// Number of rendering contexts currently open
    fn active_contexts(&self) -> usize;
}

/// Builds the renderer selected by the configuration
///
/// Any failure here is a [`GleanError::Startup`]: without a renderer no page
/// can be crawled, so the run must not begin.
pub async fn build_renderer(config: &Config) -> Result<Arc<dyn Renderer>, GleanError> {
    let options = RenderOptions::from_config(config);

    match config.renderer.engine {
        RendererEngine::Chromium => {
            let renderer = ChromiumRenderer::launch(&config.renderer, options).await?;
            Ok(Arc::new(renderer))
        }
        RendererEngine::Http => {
            let renderer = HttpRenderer::new(&config.renderer, options)?;
            Ok(Arc::new(renderer))
        }
    }
}
