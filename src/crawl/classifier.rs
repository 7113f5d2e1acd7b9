// src/crawl/classifier.rs
// =============================================================================
// Decides whether a discovered link is in scope and worth following.
//
// A link is accepted only if ALL of these hold:
// 1. It looks like an HTTP(S) URL (contains "http")
// 2. It belongs to the site being crawled
// 3. It is navigational (no mailto:, tel:, javascript: or '#' fragments)
// 4. It is not a document or image asset (.pdf, .jpg, .png, .gif, .doc, .docx)
//
// Rule 2 comes in two flavours (see ScopeMode):
// - Substring: the URL text contains the site's short name. Loose on purpose:
//   "example" also matches "notexample.org", and "shop.acme.io" is rejected
//   when the site name is "www-acme".
// - Host: the URL's host is the site's domain or one of its subdomains.
//
// Everything here is a pure function. Malformed input never panics, it just
// fails the check.
// =============================================================================

use super::site::SiteIdentity;
use url::Url;

// Schemes and markers that never lead to another crawlable page
const NON_NAVIGATIONAL: [&str; 4] = ["mailto:", "tel:", "javascript:", "#"];

// Asset suffixes we never record (exact, case-sensitive)
const ASSET_SUFFIXES: [&str; 6] = [".pdf", ".jpg", ".png", ".gif", ".doc", ".docx"];

/// How strictly "belongs to the site" is interpreted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScopeMode {
    /// URL text contains the site's short name
    #[default]
    Substring,
    /// URL host equals the site's domain or is a subdomain of it
    Host,
}

/// Returns true if `url` should be recorded for the site named `site_name`
///
/// Example:
///   is_valid("https://example.com/about", "example") -> true
///   is_valid("https://example.com/logo.png", "example") -> false
pub fn is_valid(url: &str, site_name: &str) -> bool {
    url.contains("http") && url.contains(site_name) && is_followable(url)
}

// Rules 3 and 4, shared by both scope modes
fn is_followable(url: &str) -> bool {
    !NON_NAVIGATIONAL.iter().any(|marker| url.contains(marker))
        && !ASSET_SUFFIXES.iter().any(|suffix| url.ends_with(suffix))
}

// Host-based replacement for rule 2
fn is_on_domain(url: &str, domain: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    let Some(host) = parsed.host_str() else {
        return false;
    };

    let domain = domain.strip_prefix("www.").unwrap_or(domain);
    if domain.is_empty() {
        return false;
    }

    host == domain
        || host
            .strip_suffix(domain)
            .is_some_and(|prefix| prefix.ends_with('.'))
}

/// Link classifier bound to one site
#[derive(Debug, Clone)]
pub struct LinkClassifier {
    site_name: String,
    domain: String,
    mode: ScopeMode,
}

impl LinkClassifier {
    pub fn new(site: &SiteIdentity, mode: ScopeMode) -> Self {
        Self {
            site_name: site.site_name.clone(),
            domain: site.domain.clone(),
            mode,
        }
    }

    /// Applies the rules for this site's scope mode
    pub fn accepts(&self, url: &str) -> bool {
        match self.mode {
            ScopeMode::Substring => is_valid(url, &self.site_name),
            ScopeMode::Host => {
                url.contains("http") && is_on_domain(url, &self.domain) && is_followable(url)
            }
        }
    }
}
