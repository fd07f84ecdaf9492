use std::future::Future;

use crate::error::AppError;
use crate::models::SampleSource;

/// Fetches raw HTML content from a URL.
///
/// Implementations return an error for transport failures and non-2xx statuses.
pub trait Fetcher: Send + Sync + Clone {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, AppError>> + Send;
}

/// Converts raw HTML into readable plain text.
pub trait Cleaner: Send + Sync + Clone {
    fn clean(&self, html: &str) -> Result<String, AppError>;
}

/// Runs a general web search and returns the parsed result entries.
///
/// The search markup is provider-specific, so this is kept as a narrow
/// adapter: callers only see [`SampleSource`] entries.
pub trait SearchEngine: Send + Sync + Clone {
    /// Returns at most one page of results; pagination is never followed.
    fn search(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Vec<SampleSource>, AppError>> + Send;
}
