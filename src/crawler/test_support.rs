//! In-memory page source for unit tests

use crate::crawler::fetcher::{FetchError, FetchFailure, FetchPage, FetchedPage};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Serves fixed bodies by URL and records how many fetches overlap
#[derive(Default)]
pub struct StaticFetcher {
    pages: HashMap<String, String>,
    delay: Duration,
    panic_on: Option<String>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    requested: Mutex<Vec<String>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, body: &str) -> Self {
        self.pages.insert(url.to_string(), body.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn panicking_on(mut self, url: &str) -> Self {
        self.panic_on = Some(url.to_string());
        self
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

impl FetchPage for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        self.requested.lock().unwrap().push(url.to_string());
        if self.panic_on.as_deref() == Some(url) {
            panic!("fetcher blew up on {}", url);
        }

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match self.pages.get(url) {
            Some(body) => Ok(FetchedPage {
                url: url.to_string(),
                final_url: url.to_string(),
                status_code: 200,
                body: body.clone(),
            }),
            None => Err(FetchError::new(url, FetchFailure::Status(404))),
        }
    }
}

/// Documentation root used by the page builders below
pub const BASE_URL: &str = "https://docs.example.com/api/";

pub fn services_index_url() -> String {
    format!("{}reference/services/index.html", BASE_URL)
}

pub fn service_url(service: &str) -> String {
    format!("{}reference/services/{}.html", BASE_URL, service)
}

pub fn method_url(service: &str, method: &str) -> String {
    format!("{}reference/services/{}/client/{}.html", BASE_URL, service, method)
}

/// Services index listing `services` in order
pub fn index_page(services: &[&str]) -> String {
    let links: String = services
        .iter()
        .map(|s| format!(r#"<li><a class="reference internal" href="{0}.html">{0}</a></li>"#, s))
        .collect();
    format!(
        r#"<html><body><article><h1>Available Services</h1>
        <div class="toctree-wrapper"><ul>{}</ul></div></article></body></html>"#,
        links
    )
}

/// Service page listing client methods in order
pub fn service_page(service: &str, methods: &[&str]) -> String {
    let links: String = methods
        .iter()
        .map(|m| {
            format!(
                r#"<li><a class="reference internal" href="{0}/client/{1}.html">{1}</a></li>"#,
                service, m
            )
        })
        .collect();
    format!(
        r##"<html><body><article><h1>{0}</h1>
        <div class="toctree-wrapper"><ul>
        <li><a class="reference internal" href="{0}/client/index.html#client">Client</a></li>
        {1}</ul></div></article></body></html>"##,
        service, links
    )
}

/// Method page with every extracted field present
pub fn method_page(title: &str) -> String {
    format!(
        r#"<html><body><article>
        <h1>{0}</h1>
        <p>Description of {0}.</p>
        <div class="highlight"><pre>response = client.{0}()</pre></div>
        <dl><dt>Bucket</dt><dd>The bucket name.</dd></dl>
        <dl class="field-list"><dt>Return type</dt><dd>dict</dd></dl>
        </article></body></html>"#,
        title
    )
}
