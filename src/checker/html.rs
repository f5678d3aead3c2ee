// src/checker/html.rs
// =============================================================================
// This module extracts links from HTML pages.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Is built on html5ever (Mozilla's HTML parser)
//
// We also use the `url` crate to:
// - Parse and validate URLs
// - Resolve relative URLs to absolute URLs
//
// Output rules:
// - Only http/https links are kept
// - Duplicates are dropped by exact URL string, first one wins
// - Order is the order the links appear in the document
//
// Rust concepts:
// - Result<T, E>: For operations that can fail
// - Iterators: For processing collections
// - Closures: Anonymous functions (|x| ...)
// =============================================================================

use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

use super::error::CheckError;

/// A link found on a page. Never changed after extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// Absolute URL of the link target
    pub url: String,
    /// The page the link was found on
    pub source_page: String,
}

// Extracts all links from HTML content
//
// Parameters:
//   html: the page content to parse (borrowed as &str)
//   base_url: the URL of the page (for resolving relative links)
//
// Returns: the links in document order, or CheckError::Parse when the
// content is not markup at all (plain text, JSON, binary...)
//
// Example:
//   html = "<a href='/docs'>Docs</a>"
//   base_url = "https://example.com"
//   result = [Link { url: "https://example.com/docs", .. }]
pub fn extract_html_links(html: &str, base_url: &Url) -> Result<Vec<Link>, CheckError> {
    if !looks_like_markup(html) {
        return Err(CheckError::Parse(
            "page content is not an HTML document".to_string(),
        ));
    }

    let document = Html::parse_document(html);

    // "a[href]" is a constant selector, parsing it cannot fail at runtime
    let selector = Selector::parse("a[href]").expect("static selector is valid");

    let source_page = base_url.to_string();
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };

        let Some(absolute_url) = resolve_url(base_url, href) else {
            continue;
        };

        // HashSet::insert returns false when the URL was already there
        if is_checkable_link(&absolute_url) && seen.insert(absolute_url.clone()) {
            links.push(Link {
                url: absolute_url,
                source_page: source_page.clone(),
            });
        }
    }

    Ok(links)
}

// Resolves a possibly-relative URL to an absolute URL
//
// Examples:
//   base = "https://example.com/page"
//   href = "/docs" -> Some("https://example.com/docs")
//   href = "../other" -> Some("https://example.com/other")
//   href = "https://other.com" -> Some("https://other.com/")
//   href = "#top" -> None (same page)
fn resolve_url(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();

    // Fragment-only references point back at the page itself
    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    // join() handles both cases: absolute hrefs replace the base,
    // relative ones are resolved against it
    base.join(href).ok().map(|url| url.to_string())
}

// Checks if a URL should be checked
//
// We skip mailto:, tel:, javascript:, data: and file: links
fn is_checkable_link(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

// html5ever accepts any input and never fails, so "is this a document"
// has to be decided before parsing: markup starts with a tag, a doctype
// or a comment once whitespace and a byte-order mark are skipped.
fn looks_like_markup(content: &str) -> bool {
    content
        .trim_start_matches('\u{feff}')
        .trim_start()
        .starts_with('<')
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is `let ... else`?
//    - let Some(x) = expr else { continue; } binds x or runs the else block
//    - The else block must leave the current scope (continue, return, break)
//    - It keeps the happy path un-indented
//
// 2. Why a HashSet AND a Vec?
//    - The HashSet answers "have we seen this URL?" in O(1)
//    - The Vec keeps the order the links appeared in
//    - Collecting straight into a HashSet would lose that order
//
// 3. Why expect() on the selector?
//    - Selector::parse can fail if the CSS selector is invalid
//    - Our selector "a[href]" is constant and known to be valid
//    - Generally avoid unwrap()/expect() on user input!
// -----------------------------------------------------------------------------
