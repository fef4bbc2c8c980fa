//! Bounded-concurrency method worker pool
//!
//! For one service, a fixed number of tokio tasks pull methods from a shared
//! queue, fetch and extract each page, and send the finished record over a
//! channel. The receiving side sees results in completion order.
//!
//! Every submitted method yields exactly one [`MethodResult`]: fetch failures
//! become `{error: "Failed to fetch page"}`, and methods left behind by a
//! worker that died are reported once the channel closes.

use crate::crawler::extractor::method_doc_from_html;
use crate::crawler::fetcher::FetchPage;
use crate::model::{MethodDoc, MethodRef, FETCH_FAILED, WORKER_LOST};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::task::JoinSet;

/// A finished method, tagged with its position in the submitted list
#[derive(Debug, Clone)]
pub struct MethodResult {
    pub index: usize,
    pub name: String,
    pub doc: MethodDoc,
}

/// Pool configuration shared across services
pub struct MethodPool<F> {
    fetcher: Arc<F>,
    concurrency: usize,
}

impl<F: FetchPage + 'static> MethodPool<F> {
    /// Creates a pool running at most `concurrency` fetches at once
    pub fn new(fetcher: Arc<F>, concurrency: usize) -> Self {
        Self {
            fetcher,
            concurrency: concurrency.max(1),
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Starts processing `methods` for one service
    ///
    /// Workers begin immediately; results are drained through the returned
    /// [`MethodResults`]. Must be called from within a tokio runtime.
    pub fn run(&self, service: &str, methods: Vec<MethodRef>) -> MethodResults {
        let total = methods.len();
        let workers = self.concurrency.min(total);
        let queue: Arc<Mutex<VecDeque<(usize, MethodRef)>>> =
            Arc::new(Mutex::new(methods.iter().cloned().enumerate().collect()));
        let (tx, rx) = mpsc::channel(workers.max(1));
        let service: Arc<str> = Arc::from(service);

        tracing::debug!(
            "Starting {} workers for {} methods of {}",
            workers,
            total,
            service
        );

        let mut tasks = JoinSet::new();
        for _ in 0..workers {
            let queue = Arc::clone(&queue);
            let tx = tx.clone();
            let fetcher = Arc::clone(&self.fetcher);
            let service = Arc::clone(&service);

            tasks.spawn(async move {
                loop {
                    // A poisoned queue means a sibling panicked; leftovers are reported by the receiver
                    let next = queue.lock().ok().and_then(|mut q| q.pop_front());
                    let Some((index, method)) = next else {
                        break;
                    };

                    tracing::info!(
                        "  [{}/{}] Processing method: {}.{}",
                        index + 1,
                        total,
                        service,
                        method.name
                    );
                    let doc = fetch_method_doc(fetcher.as_ref(), &method).await;

                    let result = MethodResult {
                        index,
                        name: method.name,
                        doc,
                    };
                    if tx.send(result).await.is_err() {
                        break;
                    }
                }
            });
        }

        MethodResults {
            rx,
            tasks,
            outstanding: methods.into_iter().map(Some).collect(),
            remaining: total,
        }
    }
}

/// Fetches and extracts one method page
///
/// A failed fetch degrades to an error record; extraction itself cannot fail.
pub async fn fetch_method_doc<F: FetchPage>(fetcher: &F, method: &MethodRef) -> MethodDoc {
    match fetcher.fetch(&method.url).await {
        Ok(page) => MethodDoc::Extracted(method_doc_from_html(&page.body, &method.url)),
        Err(e) => {
            tracing::warn!("Method {} degraded: {}", method.name, e);
            MethodDoc::failed(FETCH_FAILED)
        }
    }
}

/// Completion stream for one service's methods
pub struct MethodResults {
    rx: mpsc::Receiver<MethodResult>,
    tasks: JoinSet<()>,
    outstanding: Vec<Option<MethodRef>>,
    remaining: usize,
}

impl MethodResults {
    /// Number of results not yet yielded
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// Waits for the next finished method
    ///
    /// Returns None once every submitted method has been yielded.
    pub async fn next(&mut self) -> Option<MethodResult> {
        while self.remaining > 0 {
            match self.rx.recv().await {
                Some(result) => {
                    let slot = self.outstanding.get_mut(result.index).and_then(Option::take);
                    if slot.is_some() {
                        self.remaining -= 1;
                        return Some(result);
                    }
                }
                None => return self.next_lost().await,
            }
        }
        None
    }

    /// Drains every remaining result
    pub async fn collect(mut self) -> Vec<MethodResult> {
        let mut results = Vec::with_capacity(self.remaining);
        while let Some(result) = self.next().await {
            results.push(result);
        }
        results
    }

    /// All workers are gone; report methods they never finished
    async fn next_lost(&mut self) -> Option<MethodResult> {
        while let Some(joined) = self.tasks.join_next().await {
            if let Err(e) = joined {
                tracing::error!("Method worker terminated abnormally: {}", e);
            }
        }

        let (index, method) = self
            .outstanding
            .iter_mut()
            .enumerate()
            .find_map(|(i, slot)| slot.take().map(|m| (i, m)))?;

        self.remaining -= 1;
        tracing::warn!("Method {} lost with its worker", method.name);
        Some(MethodResult {
            index,
            name: method.name,
            doc: MethodDoc::failed(WORKER_LOST),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::test_support::StaticFetcher;
    use std::collections::HashSet;
    use std::time::Duration;

    const PAGE: &str = "<article><h1>Method</h1><p>Does things.</p></article>";

    fn method(name: &str) -> MethodRef {
        MethodRef {
            name: name.to_string(),
            url: format!("https://docs.example.com/s3/client/{}.html", name),
        }
    }

    fn methods(count: usize) -> Vec<MethodRef> {
        (0..count).map(|i| method(&format!("m{}", i))).collect()
    }

    fn fetcher_for(methods: &[MethodRef]) -> StaticFetcher {
        methods
            .iter()
            .fold(StaticFetcher::new(), |f, m| f.with_page(&m.url, PAGE))
    }

    #[tokio::test]
    async fn test_every_method_yields_one_result() {
        let list = methods(25);
        let pool = MethodPool::new(Arc::new(fetcher_for(&list)), 4);

        let results = pool.run("s3", list).collect().await;

        assert_eq!(results.len(), 25);
        let indexes: HashSet<_> = results.iter().map(|r| r.index).collect();
        assert_eq!(indexes.len(), 25);
        assert!(results.iter().all(|r| !r.doc.is_error()));
        assert_eq!(
            results[0].doc.documentation().map(|d| d.title.as_str()),
            Some("Method")
        );
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let list = methods(12);
        let fetcher = Arc::new(fetcher_for(&list).with_delay(Duration::from_millis(20)));
        let pool = MethodPool::new(Arc::clone(&fetcher), 3);

        let results = pool.run("s3", list).collect().await;

        assert_eq!(results.len(), 12);
        assert!(fetcher.max_in_flight() <= 3);
        assert!(fetcher.max_in_flight() >= 1);
    }

    #[tokio::test]
    async fn test_fetch_failure_is_contained() {
        let list = methods(5);
        // m2 is not served, so its fetch fails
        let fetcher = list
            .iter()
            .filter(|m| m.name != "m2")
            .fold(StaticFetcher::new(), |f, m| f.with_page(&m.url, PAGE));
        let pool = MethodPool::new(Arc::new(fetcher), 2);

        let results = pool.run("s3", list).collect().await;

        assert_eq!(results.len(), 5);
        for result in &results {
            if result.name == "m2" {
                assert_eq!(result.doc, MethodDoc::failed(FETCH_FAILED));
            } else {
                assert!(!result.doc.is_error(), "{} should succeed", result.name);
            }
        }
    }

    #[tokio::test]
    async fn test_empty_method_list() {
        let pool = MethodPool::new(Arc::new(StaticFetcher::new()), 20);
        let mut results = pool.run("s3", Vec::new());
        assert_eq!(results.remaining(), 0);
        assert!(results.next().await.is_none());
    }

    #[tokio::test]
    async fn test_lost_worker_still_reports_its_methods() {
        let list = methods(3);
        let fetcher = fetcher_for(&list).panicking_on(&list[1].url);
        let pool = MethodPool::new(Arc::new(fetcher), 1);

        let results = pool.run("s3", list).collect().await;

        assert_eq!(results.len(), 3);
        let by_name: std::collections::HashMap<_, _> =
            results.iter().map(|r| (r.name.as_str(), &r.doc)).collect();
        assert!(!by_name["m0"].is_error());
        assert_eq!(by_name["m1"], &MethodDoc::failed(WORKER_LOST));
        assert_eq!(by_name["m2"], &MethodDoc::failed(WORKER_LOST));
    }

    #[tokio::test]
    async fn test_zero_concurrency_is_clamped() {
        let list = methods(2);
        let pool = MethodPool::new(Arc::new(fetcher_for(&list)), 0);
        assert_eq!(pool.concurrency(), 1);
        assert_eq!(pool.run("s3", list).collect().await.len(), 2);
    }
}
