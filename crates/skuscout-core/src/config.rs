use std::time::Duration;

use crate::error::AppError;
use crate::rules::{ExtractionRule, default_rules};

/// Retailer sites scanned when the caller supplies none.
pub const DEFAULT_SITES: [&str; 3] = [
    "https://gateway-games-ltd.mybigcommerce.com/",
    "https://www.alphaomegahobby.com/",
    "https://www.meeplemart.com/",
];

/// Site scanning limits.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// How many candidate URLs are tried per site.
    pub max_candidates: usize,
    /// Upper bound for a single page fetch.
    pub fetch_timeout: Duration,
    /// Pause after each successful page fetch.
    pub page_delay: Duration,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_candidates: 3,
            fetch_timeout: Duration::from_secs(10),
            page_delay: Duration::from_secs(1),
        }
    }
}

impl ScanConfig {
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn with_page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = delay;
        self
    }
}

/// Web validation limits.
#[derive(Debug, Clone)]
pub struct ValidationConfig {
    /// Result entries considered per query (one page).
    pub max_results: usize,
    /// Sample sources kept per code.
    pub max_samples: usize,
    /// Pause after each search query.
    pub query_delay: Duration,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_results: 10,
            max_samples: 5,
            query_delay: Duration::from_secs(2),
        }
    }
}

impl ValidationConfig {
    pub fn with_query_delay(mut self, delay: Duration) -> Self {
        self.query_delay = delay;
        self
    }
}

/// The sites and rules a search runs against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTargets {
    pub sites: Vec<String>,
    pub rules: Vec<ExtractionRule>,
}

impl SearchTargets {
    pub fn new(sites: Vec<String>, rules: Vec<ExtractionRule>) -> Self {
        Self { sites, rules }
    }

    /// Built-in retailer sites and SKU/barcode rules.
    pub fn defaults() -> Self {
        Self {
            sites: DEFAULT_SITES.iter().map(|s| s.to_string()).collect(),
            rules: default_rules(),
        }
    }

    /// Append sites, skipping blanks and ones already present.
    pub fn with_sites<I, S>(mut self, sites: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for site in sites {
            let site = site.into().trim().to_string();
            if !site.is_empty() && !self.sites.contains(&site) {
                self.sites.push(site);
            }
        }
        self
    }

    /// Append rules, skipping ones already present.
    pub fn with_rules(mut self, rules: impl IntoIterator<Item = ExtractionRule>) -> Self {
        for rule in rules {
            if !self.rules.contains(&rule) {
                self.rules.push(rule);
            }
        }
        self
    }

    /// Reject targets that could never produce a code.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.sites.is_empty() {
            return Err(AppError::ConfigError("at least one site is required".into()));
        }
        if self.rules.is_empty() {
            return Err(AppError::ConfigError(
                "at least one extraction rule is required".into(),
            ));
        }
        Ok(())
    }
}

impl Default for SearchTargets {
    fn default() -> Self {
        Self::defaults()
    }
}
