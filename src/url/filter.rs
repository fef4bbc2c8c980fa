/// Path segments that mark a method-level page on a service page
const METHOD_MARKERS: &[&str] = &["client/", "paginator/", "waiter/"];

/// Anchors that point at a section heading instead of an operation
const SECTION_ANCHORS: &[&str] = &["#client", "#paginators", "#waiters"];

/// Returns true if an index-page href points at a distinct service page
///
/// Service pages are plain `.html` files next to the index. The index
/// itself and anything carrying an anchor are excluded.
pub fn is_service_href(href: &str) -> bool {
    href.ends_with(".html") && href != "index.html" && !href.contains('#')
}

/// Returns true if a service-page href points at a client operation,
/// paginator, or waiter
pub fn is_method_href(href: &str) -> bool {
    METHOD_MARKERS.iter().any(|marker| href.contains(marker))
        && !SECTION_ANCHORS.iter().any(|anchor| href.ends_with(anchor))
}
