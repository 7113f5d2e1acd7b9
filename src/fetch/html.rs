// src/fetch/html.rs
// =============================================================================
// Pulls link targets out of an HTML page.
//
// We use the `scraper` crate which parses HTML into a DOM (html5ever under the
// hood) and lets us query it with CSS selectors.
//
// Only the raw href values are returned here. Turning them into absolute URLs
// is the page's job (see Page::resolve), because that needs the page's own URL.
// =============================================================================

use scraper::{Html, Selector};
use std::sync::OnceLock;

// "a[href]" is a constant, known-good selector, so parse it once
fn anchor_selector() -> &'static Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    SELECTOR.get_or_init(|| Selector::parse("a[href]").expect("static selector is valid"))
}

/// Returns the href of every <a> element, in document order
///
/// Example:
///   html = "<a href='/docs'>Docs</a><a href='https://x.org'>X</a>"
///   result = ["/docs", "https://x.org"]
pub fn extract_hrefs(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    document
        .select(anchor_selector())
        .filter_map(|element| element.value().attr("href"))
        .map(|href| href.trim().to_string())
        .filter(|href| !href.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_in_document_order() {
        let html = r#"
            <a href="https://www.rust-lang.org">Rust</a>
            <a href="/docs">Docs</a>
            <a href="../about">About</a>
        "#;
        assert_eq!(
            extract_hrefs(html),
            vec!["https://www.rust-lang.org", "/docs", "../about"]
        );
    }

    #[test]
    fn test_skips_anchors_without_href() {
        let html = r#"<a name="top">Top</a><a href="">Empty</a><a href=" /x ">X</a>"#;
        assert_eq!(extract_hrefs(html), vec!["/x"]);
    }

    #[test]
    fn test_keeps_duplicates() {
        let html = r#"<a href="/a">One</a><a href="/a">Two</a>"#;
        assert_eq!(extract_hrefs(html).len(), 2);
    }

    #[test]
    fn test_tolerates_broken_markup() {
        let html = r#"<div><a href="/ok">ok<p></div><a href="/still">"#;
        assert_eq!(extract_hrefs(html), vec!["/ok", "/still"]);
    }
}
