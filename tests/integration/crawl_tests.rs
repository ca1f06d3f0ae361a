//! Integration tests for the crawler
//!
//! These tests use wiremock to serve a small site and run the full
//! crawl cycle end-to-end through the HTTP renderer.

use sumi_glean::config::{Config, RendererEngine};
use sumi_glean::crawler::{crawl, CrawlOptions, Crawler, PageError};
use sumi_glean::output::load_corpus;
use sumi_glean::renderer::{HttpRenderer, RenderOptions};
use sumi_glean::url::{PageUrl, SiteRoot};
use sumi_glean::GleanError;
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration for the mock site writing into `dir`
fn create_test_config(root: &str, dir: &TempDir) -> Config {
    let mut config = Config::for_root(root);
    config.renderer.engine = RendererEngine::Http;
    config.crawler.navigation_timeout = 5_000;
    config.crawler.settle_time = 0;
    config.output.corpus_path = dir
        .path()
        .join("corpus.json")
        .to_string_lossy()
        .into_owned();
    config
}

async fn mount_page(server: &MockServer, page_path: &str, body: String, expected_hits: u64) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html"))
        .expect(expected_hits)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_crawl_single_site() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    // Index links to one relative page, one absolute page and one external page
    mount_page(
        &mock_server,
        "/",
        format!(
            r#"<html><head><title>Home</title></head><body>
            <nav><a href="/page1">Menu</a></nav>
            <h1>Welcome</h1>
            <a href="/page1">Page 1</a>
            <a href="{}/page2">Page 2</a>
            <a href="https://external.invalid/x">Elsewhere</a>
            </body></html>"#,
            base_url
        ),
        1,
    )
    .await;

    mount_page(
        &mock_server,
        "/page1",
        r#"<html><body><p>Content 1</p><script>window.track = 1;</script>
        <a href="/page2">Page 2 again</a></body></html>"#
            .to_string(),
        1,
    )
    .await;

    mount_page(
        &mock_server,
        "/page2",
        r#"<html><body><p>Content 2</p><footer>Legal</footer>
        <a href="/page1">Back</a></body></html>"#
            .to_string(),
        1,
    )
    .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&base_url, &dir);

    let report = crawl(&config).await.expect("Crawl failed");

    assert_eq!(report.records().len(), 3);
    assert!(report.failures.is_empty());

    // Corpus file matches the in-memory report
    let corpus = load_corpus(std::path::Path::new(&config.output.corpus_path)).unwrap();
    assert_eq!(corpus, report.records());

    let urls: Vec<&str> = corpus.iter().map(|r| r.url().as_str()).collect();
    assert_eq!(
        urls,
        vec![
            base_url.clone(),
            format!("{}/page1", base_url),
            format!("{}/page2", base_url)
        ]
    );

    assert_eq!(corpus[0].text(), "Home Welcome Page 1 Page 2 Elsewhere");
    assert_eq!(corpus[1].text(), "Content 1 Page 2 again");
    assert_eq!(corpus[2].text(), "Content 2 Back");

    // Wiremock verifies every page was requested exactly once on drop
}

#[tokio::test]
async fn test_failed_page_is_isolated() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        r#"<a href="/broken">Broken</a><a href="/ok">Ok</a>"#.to_string(),
        1,
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    mount_page(
        &mock_server,
        "/ok",
        r#"<p>Fine</p><a href="/broken">Broken again</a>"#.to_string(),
        1,
    )
    .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&base_url, &dir);

    let report = crawl(&config).await.expect("Crawl should not abort");

    let broken = PageUrl::new(format!("{}/broken", base_url)).unwrap();
    assert!(report.was_visited(&broken));
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].url, broken);
    assert!(matches!(report.failures[0].error, PageError::Fetch(_)));
    assert_eq!(report.failures[0].error.cause(), "HTTP 500");

    let corpus = load_corpus(std::path::Path::new(&config.output.corpus_path)).unwrap();
    assert_eq!(corpus.len(), 2);
    assert!(corpus.iter().all(|r| r.url() != &broken));
}

#[tokio::test]
async fn test_explicit_seeds_and_page_limit() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/start",
        r#"<a href="/next">Next</a>"#.to_string(),
        1,
    )
    .await;
    mount_page(&mock_server, "/next", "<p>Next</p>".to_string(), 0).await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&base_url, &dir);
    config.site.seeds = vec![format!("{}/start", base_url)];
    config.crawler.max_pages = Some(1);

    let report = crawl(&config).await.unwrap();

    assert_eq!(report.records().len(), 1);
    assert!(report.stats.interrupted);

    let corpus = load_corpus(std::path::Path::new(&config.output.corpus_path)).unwrap();
    assert_eq!(corpus.len(), 1);
}

#[tokio::test]
async fn test_empty_page_recorded_with_empty_text() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        r#"<p>Index</p><a href="/empty">Empty</a>"#.to_string(),
        1,
    )
    .await;
    mount_page(&mock_server, "/empty", String::new(), 1).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&base_url, &dir);

    let report = crawl(&config).await.unwrap();

    assert!(report.failures.is_empty());
    let corpus = load_corpus(std::path::Path::new(&config.output.corpus_path)).unwrap();
    assert_eq!(corpus.len(), 2);
    assert_eq!(corpus[1].url().as_str(), format!("{}/empty", base_url));
    assert_eq!(corpus[1].text(), "");
}

#[tokio::test]
async fn test_crawler_with_injected_renderer() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        r#"<a href="/a">A</a><a href="/b">B</a>"#.to_string(),
        1,
    )
    .await;
    mount_page(&mock_server, "/a", "<p>A</p>".to_string(), 1).await;
    mount_page(&mock_server, "/b", "<p>B</p>".to_string(), 1).await;

    let options = RenderOptions {
        navigation_timeout: std::time::Duration::from_secs(5),
        settle_time: std::time::Duration::ZERO,
    };
    let renderer = Arc::new(HttpRenderer::new(&Default::default(), options).unwrap());
    let root = SiteRoot::parse(&base_url).unwrap();

    let crawler = Crawler::new(
        renderer,
        root.clone(),
        CrawlOptions {
            max_concurrent_pages_open: 2,
            max_pages: None,
        },
    );
    let report = crawler.run(vec![root.as_page_url()]).await;

    assert_eq!(report.records().len(), 3);
    assert_eq!(report.visited.len(), 3);
    assert_eq!(report.records()[0].url(), &root.as_page_url());
}

#[tokio::test]
async fn test_startup_failure_is_fatal() {
    let dir = TempDir::new().unwrap();
    let mut config = create_test_config("https://www.example.com", &dir);
    config.renderer.engine = RendererEngine::Chromium;
    config.renderer.chromium_path = Some("/nonexistent/chromium-binary".to_string());

    let result = crawl(&config).await;

    assert!(matches!(result, Err(GleanError::Startup(_))));
    assert!(!dir.path().join("corpus.json").exists());
}
