//! URL handling module
//!
//! This module resolves hrefs found on documentation pages into absolute
//! URLs and decides which hrefs point at service or method pages.

mod filter;

use url::Url;

pub use filter::{is_method_href, is_service_href};

/// Builds the absolute URL of the services index page
///
/// # Examples
///
/// ```
/// use boto_docs_crawler::url::index_url;
///
/// let url = index_url("https://docs.example.com/api/latest/", "reference/services/index.html").unwrap();
/// assert_eq!(url.as_str(), "https://docs.example.com/api/latest/reference/services/index.html");
/// ```
pub fn index_url(base_url: &str, index_path: &str) -> Result<Url, url::ParseError> {
    Url::parse(base_url)?.join(index_path)
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - empty hrefs
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
pub fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) if matches!(absolute_url.scheme(), "http" | "https") => {
            Some(absolute_url)
        }
        _ => None,
    }
}
