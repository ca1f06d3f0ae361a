//! Chromium-based renderer using chromiumoxide.
//!
//! One headless browser is launched per run. Every page is rendered inside its
//! own browser context (an incognito-like profile), so cookies, storage and
//! service workers never leak from one page into the next. The page and its
//! context are torn down before `render` returns, whatever the outcome.

use super::{PageSnapshot, RenderOptions, Renderer};
use crate::config::RendererConfig;
use crate::url::PageUrl;
use crate::{FetchError, GleanError};
use anyhow::{anyhow, bail, Context};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::browser::BrowserContextId;
use chromiumoxide::cdp::browser_protocol::target::{
    CreateBrowserContextParams, CreateTargetParams, DisposeBrowserContextParams,
};
use chromiumoxide::error::CdpError;
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

const SNAPSHOT_SCRIPT: &str = "document.documentElement.outerHTML";

/// Chromium-based renderer.
pub struct ChromiumRenderer {
    browser: Mutex<Browser>,
    handler: JoinHandle<()>,
    options: RenderOptions,
    active_count: AtomicUsize,
}

impl ChromiumRenderer {
    /// Launch a Chromium instance for the run.
    ///
    /// Fails with [`GleanError::Startup`] when no executable is found or the
    /// browser does not come up.
    pub async fn launch(config: &RendererConfig, options: RenderOptions) -> Result<Self, GleanError> {
        let mut builder = BrowserConfig::builder();

        if let Some(path) = &config.chromium_path {
            builder = builder.chrome_executable(path);
        }
        if !config.headless {
            builder = builder.with_head();
        }
        if let Some(agent) = &config.user_agent {
            builder = builder.arg(format!("--user-agent={}", agent));
        }

        let browser_config = builder
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--disable-background-networking")
            .build()
            .map_err(|e| GleanError::Startup(format!("failed to build browser config: {}", e)))?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| GleanError::Startup(format!("failed to launch Chromium: {}", e)))?;

        // The CDP handler must be polled for the browser to make progress
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::trace!("Chromium handler event error: {}", e);
                }
            }
        });

        tracing::info!("Chromium launched (headless: {})", config.headless);

        Ok(Self {
            browser: Mutex::new(browser),
            handler,
            options,
            active_count: AtomicUsize::new(0),
        })
    }

    async fn create_context(&self) -> anyhow::Result<BrowserContextId> {
        let browser = self.browser.lock().await;
        let response = browser
            .execute(CreateBrowserContextParams::default())
            .await
            .context("failed to create browser context")?;
        Ok(response.result.browser_context_id)
    }

    async fn open_page(&self, context_id: &BrowserContextId) -> anyhow::Result<Page> {
        let params = CreateTargetParams::builder()
            .url("about:blank")
            .browser_context_id(context_id.clone())
            .build()
            .map_err(|e| anyhow!("invalid target params: {}", e))?;

        let browser = self.browser.lock().await;
        browser.new_page(params).await.context("failed to open page")
    }

    async fn dispose_context(&self, context_id: BrowserContextId) {
        let browser = self.browser.lock().await;
        if let Err(e) = browser
            .execute(DisposeBrowserContextParams::new(context_id))
            .await
        {
            tracing::debug!("Failed to dispose browser context: {}", e);
        }
    }

    /// Navigate, let dynamic content settle, then snapshot the DOM.
    async fn load(&self, page: &Page, url: &PageUrl) -> anyhow::Result<String> {
        let timeout = self.options.navigation_timeout;

        let navigation = tokio::time::timeout(timeout, async {
            page.goto(url.as_str()).await?;
            page.wait_for_navigation().await?;
            Ok::<(), CdpError>(())
        })
        .await;

        match navigation {
            Ok(Ok(())) => {}
            Ok(Err(e)) => bail!("navigation failed: {}", e),
            Err(_) => bail!("navigation timed out after {}ms", timeout.as_millis()),
        }

        if !self.options.settle_time.is_zero() {
            tokio::time::sleep(self.options.settle_time).await;
        }

        let html: String = page
            .evaluate(SNAPSHOT_SCRIPT)
            .await
            .context("failed to read page HTML")?
            .into_value()
            .map_err(|e| anyhow!("failed to convert HTML result: {:?}", e))?;

        Ok(html)
    }
}

#[async_trait]
impl Renderer for ChromiumRenderer {
    async fn render(&self, url: &PageUrl) -> Result<PageSnapshot, FetchError> {
        let to_fetch_error = |e: anyhow::Error| FetchError::new(url.as_str(), format!("{:#}", e));

        let context_id = self.create_context().await.map_err(to_fetch_error)?;

        let page = match self.open_page(&context_id).await {
            Ok(page) => page,
            Err(e) => {
                self.dispose_context(context_id).await;
                return Err(to_fetch_error(e));
            }
        };

        self.active_count.fetch_add(1, Ordering::Relaxed);
        let result = self.load(&page, url).await;

        if let Err(e) = page.close().await {
            tracing::debug!("Failed to close page for {}: {}", url, e);
        }
        self.dispose_context(context_id).await;
        self.active_count.fetch_sub(1, Ordering::Relaxed);

        result
            .map(|html| PageSnapshot::new(url.clone(), html))
            .map_err(to_fetch_error)
    }

    async fn shutdown(&self) -> Result<(), GleanError> {
        let mut browser = self.browser.lock().await;

        if let Err(e) = browser.close().await {
            tracing::warn!("Failed to close Chromium cleanly: {}", e);
        }
        if let Err(e) = browser.wait().await {
            tracing::debug!("Failed to wait for Chromium exit: {}", e);
        }

        self.handler.abort();
        tracing::debug!("Chromium shut down");
        Ok(())
    }

    fn active_contexts(&self) -> usize {
        self.active_count.load(Ordering::Relaxed)
    }
}
