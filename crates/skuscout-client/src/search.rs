//! DuckDuckGo HTML search adapter.
//!
//! The result page markup is the only provider-specific part of web
//! validation, so it lives here behind [`SearchEngine`]. Swapping providers
//! means writing another adapter, not touching the validator.

use scraper::{ElementRef, Html, Selector};
use skuscout_core::error::AppError;
use skuscout_core::models::SampleSource;
use skuscout_core::traits::{Fetcher, SearchEngine};
use skuscout_core::urls::encode_query;
use url::Url;

const DEFAULT_ENDPOINT: &str = "https://duckduckgo.com/html/";

/// Result entries on one page of the HTML endpoint.
pub const MAX_RESULTS: usize = 10;

const RESULT_SELECTOR: &str = "div.result";
const TITLE_SELECTOR: &str = "a.result__a";
const SNIPPET_SELECTOR: &str = ".result__snippet";

/// Web search through DuckDuckGo's HTML endpoint, using any [`Fetcher`].
#[derive(Clone)]
pub struct DuckDuckGoSearch<F: Fetcher> {
    fetcher: F,
    endpoint: String,
}

impl<F: Fetcher> DuckDuckGoSearch<F> {
    pub fn new(fetcher: F) -> Self {
        Self::with_endpoint(fetcher, DEFAULT_ENDPOINT)
    }

    pub fn with_endpoint(fetcher: F, endpoint: impl Into<String>) -> Self {
        Self {
            fetcher,
            endpoint: endpoint.into(),
        }
    }

    /// The URL requested for `query`.
    pub fn search_url(&self, query: &str) -> String {
        format!("{}?q={}", self.endpoint, encode_query(query))
    }
}

impl<F: Fetcher> SearchEngine for DuckDuckGoSearch<F> {
    async fn search(&self, query: &str) -> Result<Vec<SampleSource>, AppError> {
        let url = self.search_url(query);
        tracing::debug!(%url, "Querying search endpoint");
        let html = self.fetcher.fetch(&url).await?;
        parse_results(&html, MAX_RESULTS)
    }
}

/// Parse result entries from a DuckDuckGo HTML result page.
///
/// Only the first `limit` result blocks are considered; a block counts when
/// it has both a title link and a snippet.
pub fn parse_results(html: &str, limit: usize) -> Result<Vec<SampleSource>, AppError> {
    let result_selector = selector(RESULT_SELECTOR)?;
    let title_selector = selector(TITLE_SELECTOR)?;
    let snippet_selector = selector(SNIPPET_SELECTOR)?;

    let document = Html::parse_document(html);
    let hits = document
        .select(&result_selector)
        .take(limit)
        .filter_map(|block| {
            let title = block.select(&title_selector).next()?;
            let snippet = block.select(&snippet_selector).next()?;
            Some(SampleSource {
                title: element_text(title),
                url: resolve_link(title.value().attr("href").unwrap_or_default()),
                snippet: element_text(snippet),
            })
        })
        .collect();
    Ok(hits)
}

fn selector(css: &str) -> Result<Selector, AppError> {
    Selector::parse(css)
        .map_err(|e| AppError::SearchError(format!("invalid selector '{css}': {e:?}")))
}

fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Unwrap DuckDuckGo's redirect links (`//duckduckgo.com/l/?uddg=<target>`).
fn resolve_link(href: &str) -> String {
    let absolute = if href.starts_with("//") {
        format!("https:{href}")
    } else {
        href.to_string()
    };

    Url::parse(&absolute)
        .ok()
        .filter(|u| u.path().starts_with("/l/"))
        .and_then(|u| {
            u.query_pairs()
                .find(|(key, _)| key == "uddg")
                .map(|(_, target)| target.into_owned())
        })
        .unwrap_or_else(|| href.to_string())
}
