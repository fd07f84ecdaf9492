//! Test utilities: mock implementations of all core traits.
//!
//! Handwritten mocks for dependency injection in unit and integration tests.
//! All mocks use `Arc<Mutex<_>>` for interior mutability, allowing
//! test assertions on recorded calls.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::AppError;
use crate::models::{ProductStage, SampleSource};
use crate::pipeline::{PipelineEvent, PipelineReporter};
use crate::traits::{Cleaner, Fetcher, SearchEngine};

// ---------------------------------------------------------------------------
// MockFetcher
// ---------------------------------------------------------------------------

/// Canned response for a mocked URL.
#[derive(Debug, Clone)]
pub enum MockPage {
    Html(String),
    /// Non-2xx response.
    Status(u16),
    /// Connection failure.
    Unreachable,
    /// Never completes; exercises timeouts.
    Hang,
}

impl MockPage {
    pub fn html(body: &str) -> Self {
        MockPage::Html(body.to_string())
    }
}

/// Mock fetcher serving canned pages by URL.
///
/// Lookup order: exact URL, then the longest registered site prefix, then
/// the fallback (HTTP 404 unless overridden). Every request is recorded.
#[derive(Clone)]
pub struct MockFetcher {
    pages: Arc<Mutex<HashMap<String, MockPage>>>,
    sites: Arc<Mutex<Vec<(String, MockPage)>>>,
    fallback: MockPage,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self {
            pages: Arc::new(Mutex::new(HashMap::new())),
            sites: Arc::new(Mutex::new(Vec::new())),
            fallback: MockPage::Status(404),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Serve `page` for exactly `url`.
    pub fn with_page(self, url: &str, page: MockPage) -> Self {
        self.pages.lock().unwrap().insert(url.to_string(), page);
        self
    }

    /// Serve `page` for every URL starting with `prefix`.
    pub fn with_site(self, prefix: &str, page: MockPage) -> Self {
        self.sites.lock().unwrap().push((prefix.to_string(), page));
        self
    }

    pub fn with_fallback(mut self, page: MockPage) -> Self {
        self.fallback = page;
        self
    }

    /// URLs requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    fn lookup(&self, url: &str) -> MockPage {
        if let Some(page) = self.pages.lock().unwrap().get(url) {
            return page.clone();
        }
        self.sites
            .lock()
            .unwrap()
            .iter()
            .filter(|(prefix, _)| url.starts_with(prefix.as_str()))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, page)| page.clone())
            .unwrap_or_else(|| self.fallback.clone())
    }
}

impl Default for MockFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<String, AppError> {
        self.requests.lock().unwrap().push(url.to_string());
        match self.lookup(url) {
            MockPage::Html(body) => Ok(body),
            MockPage::Status(code) => Err(AppError::HttpError(format!("HTTP {code} for {url}"))),
            MockPage::Unreachable => Err(AppError::NetworkError(format!(
                "Connection failed: {url}"
            ))),
            MockPage::Hang => std::future::pending().await,
        }
    }
}

// ---------------------------------------------------------------------------
// MockCleaner
// ---------------------------------------------------------------------------

/// Mock cleaner that returns its input unchanged.
#[derive(Clone)]
pub struct MockCleaner {
    error: Arc<Mutex<Option<AppError>>>,
}

impl MockCleaner {
    /// Creates a cleaner that returns the input unchanged.
    pub fn passthrough() -> Self {
        Self {
            error: Arc::new(Mutex::new(None)),
        }
    }

    /// Creates a cleaner whose first call fails with `error`.
    pub fn with_error(error: AppError) -> Self {
        Self {
            error: Arc::new(Mutex::new(Some(error))),
        }
    }
}

impl Cleaner for MockCleaner {
    fn clean(&self, html: &str) -> Result<String, AppError> {
        let mut err = self.error.lock().unwrap();
        if let Some(e) = err.take() {
            return Err(e);
        }
        Ok(html.to_string())
    }
}

// ---------------------------------------------------------------------------
// MockSearchEngine
// ---------------------------------------------------------------------------

/// Mock search engine returning a configurable number of hits per code.
///
/// A query is attributed to a code when it contains `"<code>"`.
#[derive(Clone)]
pub struct MockSearchEngine {
    default_hits: usize,
    hits: Arc<Mutex<HashMap<String, usize>>>,
    failing: Arc<Mutex<Vec<String>>>,
    queries: Arc<Mutex<Vec<String>>>,
}

impl MockSearchEngine {
    /// Every query returns `default_hits` results.
    pub fn new(default_hits: usize) -> Self {
        Self {
            default_hits,
            hits: Arc::new(Mutex::new(HashMap::new())),
            failing: Arc::new(Mutex::new(Vec::new())),
            queries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_hits_for(self, code: &str, hits: usize) -> Self {
        self.hits.lock().unwrap().insert(code.to_string(), hits);
        self
    }

    /// Queries for `code` fail with a network error.
    pub fn failing_for(self, code: &str) -> Self {
        self.failing.lock().unwrap().push(code.to_string());
        self
    }

    /// Number of searches issued so far.
    pub fn calls(&self) -> usize {
        self.queries.lock().unwrap().len()
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }

    fn mentions(query: &str, code: &str) -> bool {
        query.contains(&format!("\"{code}\""))
    }
}

impl SearchEngine for MockSearchEngine {
    async fn search(&self, query: &str) -> Result<Vec<SampleSource>, AppError> {
        self.queries.lock().unwrap().push(query.to_string());

        if self
            .failing
            .lock()
            .unwrap()
            .iter()
            .any(|code| Self::mentions(query, code))
        {
            return Err(AppError::NetworkError("search endpoint unreachable".into()));
        }

        let count = self
            .hits
            .lock()
            .unwrap()
            .iter()
            .find(|(code, _)| Self::mentions(query, code))
            .map(|(_, hits)| *hits)
            .unwrap_or(self.default_hits);

        Ok((0..count)
            .map(|i| SampleSource {
                title: format!("Result {i}"),
                url: format!("https://search.test/{i}"),
                snippet: query.to_string(),
            })
            .collect())
    }
}

// ---------------------------------------------------------------------------
// RecordingReporter
// ---------------------------------------------------------------------------

/// Pipeline reporter that records every stage transition.
#[derive(Clone, Default)]
pub struct RecordingReporter {
    pub stages: Arc<Mutex<Vec<(String, ProductStage)>>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages visited by `product`, in order.
    pub fn stages_for(&self, product: &str) -> Vec<ProductStage> {
        self.stages
            .lock()
            .unwrap()
            .iter()
            .filter(|(p, _)| p == product)
            .map(|(_, stage)| *stage)
            .collect()
    }
}

impl PipelineReporter for RecordingReporter {
    fn report(&self, event: PipelineEvent<'_>) {
        if let PipelineEvent::StageChanged { product, stage } = event {
            self.stages.lock().unwrap().push((product.to_string(), stage));
        }
    }
}
