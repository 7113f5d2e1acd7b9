// src/fetch/mod.rs
// =============================================================================
// The crawler's view of "the web": give it a URL, get back a page.
//
// The crawl engine only depends on the Fetcher trait below. It never touches
// reqwest or scraper directly, which lets tests plug in an in-memory web and
// lets another transport be dropped in later.
//
// What the engine needs from a fetch maps onto three things:
// - navigable elements: Page::hrefs() plus Page::resolve() to absolutize them
// - request issued: the engine counts every fetch it starts
// - errors: FetchError carries the cause, the engine logs it with the URL
//
// Submodules:
// - http: the default Fetcher, built on reqwest
// - html: anchor extraction with scraper
// =============================================================================

mod html;
mod http;

pub use http::HttpFetcher;

use async_trait::async_trait;
use thiserror::Error;
use url::Url;

/// A fetched page: the URL it was served from and its HTML body
///
/// Non-HTML responses come back with an empty body, so they simply have
/// no links.
#[derive(Debug, Clone)]
pub struct Page {
    pub url: Url,
    pub body: String,
}

impl Page {
    pub fn new(url: Url, body: impl Into<String>) -> Self {
        Self {
            url,
            body: body.into(),
        }
    }

    /// Raw href values of every anchor on the page
    pub fn hrefs(&self) -> Vec<String> {
        if self.body.is_empty() {
            return Vec::new();
        }
        html::extract_hrefs(&self.body)
    }

    /// Resolves a (possibly relative) href against this page's URL
    ///
    /// Examples, for a page at https://example.com/docs/:
    ///   "intro"              -> https://example.com/docs/intro
    ///   "/about"             -> https://example.com/about
    ///   "https://other.org"  -> https://other.org/
    pub fn resolve(&self, href: &str) -> Option<Url> {
        self.url.join(href).ok()
    }
}

/// Why a single page could not be fetched
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,

    #[error("too many redirects")]
    TooManyRedirects,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("HTTP {0}")]
    Status(u16),

    #[error("{0}")]
    Other(String),
}

/// Anything that can turn a URL into a page
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<Page, FetchError>;
}


#[cfg(test)]
mod tests {
    use super::*;

    fn page(url: &str, body: &str) -> Page {
        Page::new(Url::parse(url).unwrap(), body)
    }

    #[test]
    fn test_resolve_relative_link() {
        let p = page("https://example.com/docs/", "");
        assert_eq!(
            p.resolve("intro").unwrap().as_str(),
            "https://example.com/docs/intro"
        );
        assert_eq!(
            p.resolve("/about").unwrap().as_str(),
            "https://example.com/about"
        );
    }

    #[test]
    fn test_resolve_absolute_link() {
        let p = page("https://example.com/page", "");
        assert_eq!(
            p.resolve("https://other.com").unwrap().as_str(),
            "https://other.com/"
        );
    }

    #[test]
    fn test_resolve_keeps_special_schemes() {
        // The classifier, not the resolver, rejects these
        let p = page("https://example.com/page", "");
        assert_eq!(
            p.resolve("mailto:test@example.com").unwrap().as_str(),
            "mailto:test@example.com"
        );
        assert_eq!(
            p.resolve("#section").unwrap().as_str(),
            "https://example.com/page#section"
        );
    }

    #[test]
    fn test_empty_body_has_no_links() {
        assert!(page("https://example.com/file", "").hrefs().is_empty());
    }

    #[test]
    fn test_fetch_error_messages() {
        assert_eq!(FetchError::Status(503).to_string(), "HTTP 503");
        assert_eq!(FetchError::Timeout.to_string(), "request timed out");
    }
}
