//! Snapshot parser for extracting text and links
//!
//! This module turns rendered markup into:
//! - The page's visible text (non-content elements removed, whitespace collapsed)
//! - The same-site links to follow (from `<a href>` only)

use crate::renderer::PageSnapshot;
use crate::url::{resolve_link, PageUrl, SiteRoot};
use crate::ExtractionError;
use scraper::{Html, Node, Selector};
use std::collections::BTreeSet;

/// Elements whose whole subtree is dropped before collecting text
const EXCLUDED_TAGS: &[&str] = &["script", "style", "nav", "footer"];

/// Extracted information from a rendered page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPage {
    /// Visible text, single-space separated
    pub text: String,

    /// Same-site links, lexically ordered
    pub links: BTreeSet<PageUrl>,
}

/// Parses a snapshot once and extracts both text and links
///
/// # Arguments
///
/// * `snapshot` - The rendered page
/// * `root` - The site root used for the same-site test
///
/// # Returns
///
/// * `Ok(ParsedPage)` - Text and links of the page
/// * `Err(ExtractionError)` - The snapshot carried no markup at all
pub fn parse_snapshot(
    snapshot: &PageSnapshot,
    root: &SiteRoot,
) -> Result<ParsedPage, ExtractionError> {
    if snapshot.html().trim().is_empty() {
        return Err(ExtractionError::EmptySnapshot {
            url: snapshot.url().to_string(),
        });
    }

    let document = Html::parse_document(snapshot.html());

    Ok(ParsedPage {
        text: collect_text(&document),
        links: collect_links(&document, root),
    })
}

/// Extracts the visible text of an HTML document
///
/// `script`, `style`, `nav` and `footer` elements are removed together with
/// everything nested inside them. Every remaining text node is stripped and
/// internal whitespace runs are collapsed; the pieces are joined with single
/// spaces.
///
/// # Example
///
/// ```
/// use sumi_glean::crawler::extract_text;
///
/// let html = "<body><nav>Menu</nav><h1>Hello</h1><p>big\n  world</p></body>";
/// assert_eq!(extract_text(html), "Hello big world");
/// ```
pub fn extract_text(html: &str) -> String {
    collect_text(&Html::parse_document(html))
}

/// Finds the same-site links of an HTML document
///
/// See [`resolve_link`] for the membership test. The returned set is ordered
/// lexically, which is the order the crawler enqueues them in.
pub fn discover_links(html: &str, root: &SiteRoot) -> BTreeSet<PageUrl> {
    collect_links(&Html::parse_document(html), root)
}

fn collect_text(document: &Html) -> String {
    let mut words: Vec<&str> = Vec::new();

    for node in document.tree.root().descendants() {
        if let Node::Text(text) = node.value() {
            let hidden = node.ancestors().any(|ancestor| {
                matches!(ancestor.value(), Node::Element(element) if EXCLUDED_TAGS.contains(&element.name()))
            });

            if !hidden {
                words.extend(text.split_whitespace());
            }
        }
    }

    words.join(" ")
}

fn collect_links(document: &Html, root: &SiteRoot) -> BTreeSet<PageUrl> {
    let mut links = BTreeSet::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };

            if let Some(absolute_url) = resolve_link(href, root) {
                if let Ok(url) = PageUrl::new(absolute_url) {
                    links.insert(url);
                }
            }
        }
    }

    links
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root() -> SiteRoot {
        SiteRoot::parse("http://example.com").unwrap()
    }

    fn urls(links: &BTreeSet<PageUrl>) -> Vec<&str> {
        links.iter().map(PageUrl::as_str).collect()
    }

    #[test]
    fn test_removes_non_content_elements() {
        let html = r#"<html><head><title>Title</title><style>body { color: red }</style></head>
            <body><nav><a href="/">Home</a></nav><h1>Heading</h1>
            <p>Body text</p><footer>Copyright</footer></body></html>"#;

        assert_eq!(extract_text(html), "Title Heading Body text");
    }

    #[test]
    fn test_removes_nested_scripts() {
        let html = r#"<div>Hello<script>var s = "<b>not text</b>";</script>
            <span>World<script>track()</script></span></div>"#;

        let text = extract_text(html);
        assert_eq!(text, "Hello World");
        assert!(!text.contains("track"));
    }

    #[test]
    fn test_text_inside_excluded_ancestor_is_dropped() {
        let html = "<footer><div><p>Deep <b>footer</b></p></div></footer><main>Kept</main>";
        assert_eq!(extract_text(html), "Kept");
    }

    #[test]
    fn test_whitespace_is_collapsed() {
        let html = "<p>  lots\n\n of \t space  </p><p>\n</p><p>next</p>";
        assert_eq!(extract_text(html), "lots of space next");
    }

    #[test]
    fn test_comments_are_not_text() {
        assert_eq!(extract_text("<p>a<!-- hidden -->b</p>"), "a b");
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let html = "<body><script>x()</script><p>One</p><p>Two</p></body>";
        assert_eq!(extract_text(html), extract_text(html));
    }

    #[test]
    fn test_scope_restriction() {
        let html = r#"<body>
            <a href="http://example.com/a">A</a>
            <a href="/b">B</a>
            <a href="http://external.com/x">X</a>
        </body>"#;

        let links = discover_links(html, &root());
        assert_eq!(urls(&links), vec!["http://example.com/a", "http://example.com/b"]);
    }

    #[test]
    fn test_links_are_deduplicated() {
        let html = r#"<a href="/a">1</a><a href="/a">2</a><a href="http://example.com/a">3</a>"#;
        assert_eq!(urls(&discover_links(html, &root())), vec!["http://example.com/a"]);
    }

    #[test]
    fn test_no_canonicalization() {
        let html = r#"<a href="/a">1</a><a href="/a/">2</a><a href="/a#top">3</a>"#;
        assert_eq!(
            urls(&discover_links(html, &root())),
            vec!["http://example.com/a", "http://example.com/a#top", "http://example.com/a/"]
        );
    }

    #[test]
    fn test_links_inside_excluded_elements_are_followed() {
        let html = r#"<nav><a href="/menu">Menu</a></nav><footer><a href="/legal">Legal</a></footer>"#;
        assert_eq!(
            urls(&discover_links(html, &root())),
            vec!["http://example.com/legal", "http://example.com/menu"]
        );
    }

    #[test]
    fn test_anchor_without_href_ignored() {
        let html = r#"<a name="top">Top</a><a href="">Empty</a>"#;
        assert!(discover_links(html, &root()).is_empty());
    }

    #[test]
    fn test_parse_snapshot() {
        let url = PageUrl::new("http://example.com").unwrap();
        let snapshot = PageSnapshot::new(url, r#"<p>Hi</p><a href="/next">Next</a>"#);

        let parsed = parse_snapshot(&snapshot, &root()).unwrap();
        assert_eq!(parsed.text, "Hi Next");
        assert_eq!(urls(&parsed.links), vec!["http://example.com/next"]);
    }

    #[test]
    fn test_parse_empty_snapshot_fails() {
        let url = PageUrl::new("http://example.com/blank").unwrap();
        let snapshot = PageSnapshot::new(url, "  \n ");

        let error = parse_snapshot(&snapshot, &root()).unwrap_err();
        assert!(matches!(error, ExtractionError::EmptySnapshot { url } if url == "http://example.com/blank"));
    }
}
