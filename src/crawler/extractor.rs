//! Structural extraction from documentation pages
//!
//! Three page roles are understood:
//! - the services index, yielding [`ServiceRef`]s
//! - a service page, yielding [`MethodRef`]s
//! - a method page, yielding a [`MethodDocumentation`]
//!
//! Every extractor is total. Missing structure gives empty results, never an
//! error, so one oddly shaped page cannot stop the crawl.

use crate::model::{MethodDocumentation, MethodRef, Parameter, ServiceRef};
use crate::url::{is_method_href, is_service_href, resolve_link};
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Markers for the heading that precedes a method's return type
const RETURN_MARKERS: &[&str] = &["Return type", "Return Type", "Returns"];

/// Parses an HTML body into a queryable document
pub fn parse_document(body: &str) -> Html {
    Html::parse_document(body)
}

/// Extracts the service list from the services index page
///
/// # Rules
///
/// - The services region is the first `article`, or failing that
///   `section#available-services`
/// - Only the first `div.toctree-wrapper` inside that region is read
/// - Links are `a.reference.internal` whose href names a sibling `.html`
///   page other than `index.html`, with no anchor
///
/// # Example
///
/// ```
/// use boto_docs_crawler::crawler::{extract_services, parse_document};
/// use url::Url;
///
/// let html = r#"<article><div class="toctree-wrapper">
///     <a class="reference internal" href="s3.html">S3</a>
/// </div></article>"#;
/// let index = Url::parse("https://docs.example.com/reference/services/index.html").unwrap();
/// let services = extract_services(&parse_document(html), &index);
/// assert_eq!(services[0].name, "S3");
/// assert_eq!(services[0].url, "https://docs.example.com/reference/services/s3.html");
/// ```
pub fn extract_services(document: &Html, index_url: &Url) -> Vec<ServiceRef> {
    let Some(region) = first_match(document, &["article", "section#available-services"]) else {
        return Vec::new();
    };
    let (Some(toctree_sel), Some(link_sel)) = (
        selector("div.toctree-wrapper"),
        selector("a.reference.internal"),
    ) else {
        return Vec::new();
    };
    let Some(toctree) = region.select(&toctree_sel).next() else {
        return Vec::new();
    };

    toctree
        .select(&link_sel)
        .filter_map(|link| {
            let href = link.value().attr("href")?;
            if !is_service_href(href) {
                return None;
            }
            let url = resolve_link(href, index_url)?;
            Some(ServiceRef {
                name: text_of(link),
                url: url.to_string(),
            })
        })
        .collect()
}

/// Extracts the method list from a service page
///
/// Every `div.toctree-wrapper` on the page is scanned. A link qualifies when
/// its href points at a client operation, paginator, or waiter and is not a
/// bare section anchor. URLs are resolved against `base_url`.
pub fn extract_methods(document: &Html, base_url: &Url) -> Vec<MethodRef> {
    let (Some(toctree_sel), Some(link_sel)) = (
        selector("div.toctree-wrapper"),
        selector("a.reference.internal"),
    ) else {
        return Vec::new();
    };

    let mut methods = Vec::new();
    for toctree in document.select(&toctree_sel) {
        for link in toctree.select(&link_sel) {
            let Some(href) = link.value().attr("href") else {
                continue;
            };
            if !is_method_href(href) {
                continue;
            }
            if let Some(url) = resolve_link(href, base_url) {
                methods.push(MethodRef {
                    name: text_of(link),
                    url: url.to_string(),
                });
            }
        }
    }
    methods
}

/// Extracts a method's documentation record
///
/// # Field rules
///
/// | Field | Source |
/// |-------|--------|
/// | title | first `h1` in the document |
/// | description | first `p` in the main region |
/// | syntax | first `div.highlight` in the main region |
/// | examples | remaining `div.highlight` blocks, in order |
/// | parameters | `dt`/`dd` pairs of the first `dl` in the main region |
/// | returns | element after the parent of the first "Return type"/"Returns" text |
/// | full_text | all text of the main region, one trimmed line per text node |
///
/// The main region is the first `article`, or failing that `div.document`.
/// Without a main region only `url` is filled in.
pub fn extract_method_doc(document: &Html, url: &str) -> MethodDocumentation {
    let mut doc = MethodDocumentation::empty(url);

    let Some(main) = first_match(document, &["article", "div.document"]) else {
        return doc;
    };

    if let Some(h1) = selector("h1").and_then(|sel| document.select(&sel).next()) {
        doc.title = text_of(h1);
    }

    doc.full_text = main
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    if let Some(p) = selector("p").and_then(|sel| main.select(&sel).next()) {
        doc.description = text_of(p);
    }

    if let Some(highlight) = selector("div.highlight") {
        let mut blocks = main.select(&highlight).map(text_of);
        if let Some(first) = blocks.next() {
            doc.syntax = first;
            doc.examples = blocks.collect();
        }
    }

    doc.parameters = extract_parameters(main);
    doc.returns = extract_returns(main);

    doc
}

/// Convenience wrapper: parses a services index body and extracts services
pub fn services_from_html(body: &str, index_url: &Url) -> Vec<ServiceRef> {
    extract_services(&parse_document(body), index_url)
}

/// Convenience wrapper: parses a service page body and extracts methods
pub fn methods_from_html(body: &str, base_url: &Url) -> Vec<MethodRef> {
    extract_methods(&parse_document(body), base_url)
}

/// Convenience wrapper: parses a method page body and extracts its record
pub fn method_doc_from_html(body: &str, url: &str) -> MethodDocumentation {
    extract_method_doc(&parse_document(body), url)
}

/// Pairs the terms and definitions of the first definition list
///
/// All `dt` and all `dd` descendants are paired positionally; a surplus on
/// either side is dropped.
fn extract_parameters(main: ElementRef<'_>) -> Vec<Parameter> {
    let (Some(dl_sel), Some(dt_sel), Some(dd_sel)) =
        (selector("dl"), selector("dt"), selector("dd"))
    else {
        return Vec::new();
    };
    let Some(dl) = main.select(&dl_sel).next() else {
        return Vec::new();
    };

    dl.select(&dt_sel)
        .zip(dl.select(&dd_sel))
        .map(|(dt, dd)| Parameter {
            name: text_of(dt),
            description: text_of(dd),
        })
        .collect()
}

/// Finds the return type description
///
/// Only the first matching text node in document order is considered. If
/// its parent has no following sibling element the result is empty; later
/// matches are not tried.
fn extract_returns(main: ElementRef<'_>) -> String {
    let marker = main.descendants().find(|node| {
        node.value()
            .as_text()
            .is_some_and(|text| RETURN_MARKERS.iter().any(|m| text.contains(m)))
    });

    marker
        .and_then(|node| node.parent())
        .and_then(ElementRef::wrap)
        .and_then(|parent| parent.next_siblings().find_map(ElementRef::wrap))
        .map(text_of)
        .unwrap_or_default()
}

/// Returns the first element matching any of the selectors, tried in order
fn first_match<'a>(document: &'a Html, candidates: &[&str]) -> Option<ElementRef<'a>> {
    candidates.iter().find_map(|css| {
        let sel = selector(css)?;
        document.select(&sel).next()
    })
}

fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
