//! Static HTTP renderer
//!
//! Fetches the server-delivered HTML with a plain GET. No scripts run, so this
//! engine only suits sites whose content is present in the initial response.
//! The client keeps no cookie store, which gives every request the same
//! isolation the browser engine gets from fresh contexts.

use super::{PageSnapshot, RenderOptions, Renderer};
use crate::config::RendererConfig;
use crate::url::PageUrl;
use crate::{FetchError, GleanError};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Default user agent when none is configured
const DEFAULT_USER_AGENT: &str = concat!("SumiGlean/", env!("CARGO_PKG_VERSION"));

/// Markup served in place of an empty response body
const BLANK_DOCUMENT: &str = "<html><head></head><body></body></html>";

/// Builds an HTTP client for page fetching
///
/// # Arguments
///
/// * `config` - The renderer configuration (user agent override)
/// * `options` - Timing bounds; the navigation timeout caps the whole request
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(
    config: &RendererConfig,
    options: &RenderOptions,
) -> Result<Client, reqwest::Error> {
    let user_agent = config
        .user_agent
        .clone()
        .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());

    Client::builder()
        .user_agent(user_agent)
        .timeout(options.navigation_timeout)
        .connect_timeout(Duration::from_secs(10).min(options.navigation_timeout))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Renderer backed by plain HTTP requests
pub struct HttpRenderer {
    client: Client,
    active_count: AtomicUsize,
}

impl HttpRenderer {
    pub fn new(config: &RendererConfig, options: RenderOptions) -> Result<Self, GleanError> {
        let client = build_http_client(config, &options)
            .map_err(|e| GleanError::Startup(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            active_count: AtomicUsize::new(0),
        })
    }

    async fn fetch(&self, url: &PageUrl) -> Result<PageSnapshot, FetchError> {
        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| FetchError::new(url.as_str(), classify_error(&e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(url.as_str(), format!("HTTP {}", status.as_u16())));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !content_type.is_empty() && !content_type.contains("html") {
            return Err(FetchError::new(
                url.as_str(),
                format!("Expected HTML, got {}", content_type),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::new(url.as_str(), format!("Failed to read body: {}", e)))?;

        // A browser shows an empty document for an empty 200; do the same
        if body.trim().is_empty() {
            return Ok(PageSnapshot::new(url.clone(), BLANK_DOCUMENT.to_string()));
        }

        Ok(PageSnapshot::new(url.clone(), body))
    }
}

#[async_trait]
impl Renderer for HttpRenderer {
    async fn render(&self, url: &PageUrl) -> Result<PageSnapshot, FetchError> {
        self.active_count.fetch_add(1, Ordering::Relaxed);
        let result = self.fetch(url).await;
        self.active_count.fetch_sub(1, Ordering::Relaxed);
        result
    }

    async fn shutdown(&self) -> Result<(), GleanError> {
        Ok(())
    }

    fn active_contexts(&self) -> usize {
        self.active_count.load(Ordering::Relaxed)
    }
}

/// Turns a transport error into a short cause string
fn classify_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "Request timeout".to_string()
    } else if error.is_connect() {
        "Connection refused".to_string()
    } else if error.is_builder() {
        format!("Invalid request URL: {}", error)
    } else {
        error.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn renderer() -> HttpRenderer {
        HttpRenderer::new(&RendererConfig::default(), RenderOptions::default()).unwrap()
    }

    #[test]
    fn test_build_http_client() {
        let client = build_http_client(&RendererConfig::default(), &RenderOptions::default());
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn test_render_html_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                "<html><body><p>Hello</p></body></html>",
                "text/html; charset=utf-8",
            ))
            .mount(&server)
            .await;

        let url = PageUrl::new(format!("{}/", server.uri())).unwrap();
        let snapshot = renderer().render(&url).await.unwrap();

        assert_eq!(snapshot.url(), &url);
        assert!(snapshot.html().contains("<p>Hello</p>"));
    }

    #[tokio::test]
    async fn test_http_error_is_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let url = PageUrl::new(format!("{}/missing", server.uri())).unwrap();
        let error = renderer().render(&url).await.unwrap_err();

        assert_eq!(error.url, url.as_str());
        assert_eq!(error.cause, "HTTP 404");
    }

    #[tokio::test]
    async fn test_non_html_is_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("{}", "application/json"))
            .mount(&server)
            .await;

        let url = PageUrl::new(format!("{}/api", server.uri())).unwrap();
        let error = renderer().render(&url).await.unwrap_err();

        assert!(error.cause.contains("application/json"));
    }

    #[tokio::test]
    async fn test_empty_body_renders_blank_document() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/empty"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("", "text/html"))
            .mount(&server)
            .await;

        let url = PageUrl::new(format!("{}/empty", server.uri())).unwrap();
        let snapshot = renderer().render(&url).await.unwrap();

        assert_eq!(snapshot.html(), BLANK_DOCUMENT);
    }

    #[tokio::test]
    async fn test_unparseable_url_is_fetch_error() {
        let renderer = renderer();
        let bad = PageUrl::new("not a url").unwrap();

        assert!(renderer.render(&bad).await.is_err());
        assert_eq!(renderer.active_contexts(), 0);
    }
}
