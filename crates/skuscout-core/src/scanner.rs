use std::collections::{BTreeMap, BTreeSet};

use crate::config::{ScanConfig, SearchTargets};
use crate::error::AppError;
use crate::matcher::CodeMatcher;
use crate::models::{AggregateResult, PageFailure, SiteResult};
use crate::rules::ExtractionRule;
use crate::throttle::Pacer;
use crate::traits::{Cleaner, Fetcher};
use crate::urls::candidate_urls;

/// Scans retailer sites for product codes.
///
/// For each site a bounded number of candidate search URLs is fetched one
/// after another, with a pause after every successful fetch. Failures never
/// escape: they are recorded on the returned [`SiteResult`].
pub struct SiteScanner<F, C>
where
    F: Fetcher,
    C: Cleaner,
{
    fetcher: F,
    cleaner: C,
    config: ScanConfig,
    pacer: Pacer,
}

impl<F, C> SiteScanner<F, C>
where
    F: Fetcher,
    C: Cleaner,
{
    /// Create a scanner with the default limits (3 URLs, 10s timeout, 1s delay).
    pub fn new(fetcher: F, cleaner: C) -> Self {
        Self::with_config(fetcher, cleaner, ScanConfig::default())
    }

    pub fn with_config(fetcher: F, cleaner: C, config: ScanConfig) -> Self {
        let pacer = Pacer::new(config.page_delay);
        Self {
            fetcher,
            cleaner,
            config,
            pacer,
        }
    }

    /// Scan a single site for codes matching `rules`.
    pub async fn scan_site(
        &self,
        site_url: &str,
        product_name: &str,
        rules: &[ExtractionRule],
    ) -> SiteResult {
        let matcher = CodeMatcher::new(rules);
        self.scan_with(&matcher, site_url, product_name).await
    }

    /// Scan every site in order and merge the codes found.
    ///
    /// Sites are scanned sequentially so the page delay spaces out all
    /// outbound requests, not just those to one site.
    pub async fn scan_all_sites(
        &self,
        product_name: &str,
        sites: &[String],
        rules: &[ExtractionRule],
    ) -> AggregateResult {
        let matcher = CodeMatcher::new(rules);
        tracing::info!(product = %product_name, sites = sites.len(), "Scanning sites");

        let mut found_codes = BTreeSet::new();
        let mut site_results = BTreeMap::new();
        for site in sites {
            let result = self.scan_with(&matcher, site, product_name).await;
            found_codes.extend(result.codes_found.iter().cloned());
            site_results.insert(site.clone(), result);
        }

        tracing::info!(
            product = %product_name,
            codes = found_codes.len(),
            "Site scan complete"
        );

        AggregateResult {
            product_name: product_name.to_string(),
            found_codes,
            site_results,
            skipped_rules: matcher.failures().to_vec(),
        }
    }

    /// Scan the built-in sites with the built-in rules, plus any additions.
    pub async fn search_with_defaults(
        &self,
        product_name: &str,
        extra_sites: &[String],
        extra_rules: &[ExtractionRule],
    ) -> AggregateResult {
        let targets = SearchTargets::defaults()
            .with_sites(extra_sites.iter().cloned())
            .with_rules(extra_rules.iter().cloned());
        self.scan_all_sites(product_name, &targets.sites, &targets.rules)
            .await
    }

    async fn scan_with(
        &self,
        matcher: &CodeMatcher,
        site_url: &str,
        product_name: &str,
    ) -> SiteResult {
        let candidates = match candidate_urls(site_url, product_name) {
            Ok(urls) => urls,
            Err(e) => {
                tracing::warn!(site = %site_url, error = %e, "Cannot scan site");
                return SiteResult::failed(site_url, e.to_string());
            }
        };

        let mut urls_attempted = Vec::new();
        let mut pages_searched = Vec::new();
        let mut failures = Vec::new();
        let mut codes = BTreeSet::new();

        for url in candidates.into_iter().take(self.config.max_candidates) {
            tracing::debug!(%url, "Fetching candidate URL");
            urls_attempted.push(url.clone());

            match self.fetch_text(&url).await {
                Ok(text) => {
                    let found = matcher.extract(&text);
                    tracing::debug!(%url, codes = found.len(), "Scanned page");
                    codes.extend(found);
                    pages_searched.push(url);
                    self.pacer.pause().await;
                }
                Err(e) => {
                    tracing::warn!(%url, error = %e, "Skipping candidate URL");
                    failures.push(PageFailure {
                        url,
                        error: e.to_string(),
                    });
                }
            }
        }

        let result =
            SiteResult::from_attempts(site_url, urls_attempted, pages_searched, failures, codes);
        tracing::info!(
            site = %site_url,
            status = ?result.status,
            codes = result.total_codes,
            "Site scanned"
        );
        result
    }

    async fn fetch_text(&self, url: &str) -> Result<String, AppError> {
        let timeout = self.config.fetch_timeout;
        let html = tokio::time::timeout(timeout, self.fetcher.fetch(url))
            .await
            .map_err(|_| AppError::Timeout(timeout))??;
        self.cleaner.clean(&html)
    }
}
