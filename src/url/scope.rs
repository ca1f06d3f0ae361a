//! Same-site membership test for discovered links
//!
//! The test is deliberately loose: any href that contains the root string
//! anywhere is treated as same-site, including hrefs that only mention the
//! root inside a query parameter. Protocol-relative hrefs (`//host/path`)
//! start with `/` and are concatenated onto the root like any other
//! site-relative path.

use super::SiteRoot;

/// Resolves an anchor href against the site root
///
/// # Rules
///
/// 1. href starts with `/` → `root + href`
/// 2. href contains the root string → kept as-is
/// 3. anything else (external hosts, `mailto:`, fragments, relative paths) → `None`
///
/// # Examples
///
/// ```
/// use sumi_glean::url::{resolve_link, SiteRoot};
///
/// let root = SiteRoot::parse("https://example.com").unwrap();
/// assert_eq!(resolve_link("/b", &root), Some("https://example.com/b".to_string()));
/// assert_eq!(resolve_link("https://example.com/a", &root), Some("https://example.com/a".to_string()));
/// assert_eq!(resolve_link("https://external.com/x", &root), None);
/// ```
pub fn resolve_link(href: &str, root: &SiteRoot) -> Option<String> {
    if href.starts_with('/') {
        Some(format!("{}{}", root.as_str(), href))
    } else if href.contains(root.as_str()) {
        Some(href.to_string())
    } else {
        None
    }
}
