//! URL handling module for Sumi-Glean
//!
//! This module provides the two URL types the crawler passes around and the
//! same-site membership test used during link discovery.
//!
//! - `PageUrl`: a page address, compared by its exact string form
//! - `SiteRoot`: the validated root of the site being crawled

mod scope;

use crate::{UrlError, UrlResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

pub use scope::resolve_link;

/// A page address used as the crawl's unit of identity
///
/// Two `PageUrl`s are the same page iff their strings are equal. No
/// canonicalization of query order, fragments or trailing slashes happens
/// here, so `https://example.com/a` and `https://example.com/a/` are distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PageUrl(String);

impl PageUrl {
    /// Wraps a URL string, rejecting empty or whitespace-only input
    ///
    /// # Examples
    ///
    /// ```
    /// use sumi_glean::url::PageUrl;
    ///
    /// let url = PageUrl::new("https://example.com/about").unwrap();
    /// assert_eq!(url.as_str(), "https://example.com/about");
    /// assert!(PageUrl::new("   ").is_err());
    /// ```
    pub fn new(url: impl Into<String>) -> UrlResult<Self> {
        let url = url.into();
        if url.trim().is_empty() {
            return Err(UrlError::Empty);
        }
        Ok(Self(url))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parses the address for consumers that need structured access
    pub fn to_url(&self) -> UrlResult<Url> {
        Url::parse(&self.0).map_err(|e| UrlError::Parse(format!("{}: {}", self.0, e)))
    }
}

impl fmt::Display for PageUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PageUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PageUrl {
    type Error = UrlError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for PageUrl {
    type Error = UrlError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PageUrl> for String {
    fn from(value: PageUrl) -> Self {
        value.0
    }
}

/// The root address of the crawled site
///
/// Site-relative links are resolved by plain concatenation onto this string,
/// so a single trailing `/` is trimmed on construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SiteRoot(String);

impl SiteRoot {
    /// Validates and wraps a site root
    ///
    /// The root must be an absolute `http` or `https` URL with a host.
    ///
    /// # Examples
    ///
    /// ```
    /// use sumi_glean::url::SiteRoot;
    ///
    /// let root = SiteRoot::parse("https://www.example.com/").unwrap();
    /// assert_eq!(root.as_str(), "https://www.example.com");
    /// ```
    pub fn parse(root: &str) -> UrlResult<Self> {
        let root = root.trim();
        let parsed = Url::parse(root).map_err(|e| UrlError::Parse(format!("{}: {}", root, e)))?;

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(UrlError::InvalidScheme(format!(
                "Only HTTP and HTTPS schemes are supported, got: {}",
                parsed.scheme()
            )));
        }

        if parsed.host_str().map_or(true, str::is_empty) {
            return Err(UrlError::MissingHost);
        }

        let trimmed = root.strip_suffix('/').unwrap_or(root);
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The root as a page address; this is the default seed
    pub fn as_page_url(&self) -> PageUrl {
        PageUrl(self.0.clone())
    }
}

impl fmt::Display for SiteRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
