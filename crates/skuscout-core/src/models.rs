use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::matcher::RuleFailure;

/// Message attached to a validation result when the validator was never called.
pub const NO_CODES_MESSAGE: &str = "No codes found on target sites";

/// Outcome of scanning one site.
///
/// Separates "fetched pages but found nothing" from "could not fetch anything".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SiteStatus {
    CodesFound,
    NoCodes,
    Unreachable,
}

/// A candidate URL that could not be fetched or cleaned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageFailure {
    pub url: String,
    pub error: String,
}

/// Result of scanning a single site.
#[derive(Debug, Clone, Serialize)]
pub struct SiteResult {
    pub site_url: String,
    pub status: SiteStatus,
    /// Every URL requested, in order, whether or not it succeeded.
    pub urls_attempted: Vec<String>,
    /// URLs whose content was fetched and scanned.
    pub pages_searched: Vec<String>,
    pub failures: Vec<PageFailure>,
    pub codes_found: BTreeSet<String>,
    pub total_codes: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SiteResult {
    /// Build a result from the outcome of the candidate fetches.
    ///
    /// A summary error is attached when no candidate URL succeeded.
    pub fn from_attempts(
        site_url: &str,
        urls_attempted: Vec<String>,
        pages_searched: Vec<String>,
        failures: Vec<PageFailure>,
        codes_found: BTreeSet<String>,
    ) -> Self {
        let (status, error) = if pages_searched.is_empty() {
            let detail = failures
                .last()
                .map(|f| format!(": last error: {}", f.error))
                .unwrap_or_default();
            (
                SiteStatus::Unreachable,
                Some(format!(
                    "All {} candidate URLs failed for {site_url}{detail}",
                    urls_attempted.len()
                )),
            )
        } else if codes_found.is_empty() {
            (SiteStatus::NoCodes, None)
        } else {
            (SiteStatus::CodesFound, None)
        };

        Self {
            site_url: site_url.to_string(),
            status,
            urls_attempted,
            pages_searched,
            failures,
            total_codes: codes_found.len(),
            codes_found,
            error,
        }
    }

    /// A site that could not be scanned at all (e.g. its URL is malformed).
    pub fn failed(site_url: &str, error: impl Into<String>) -> Self {
        Self {
            site_url: site_url.to_string(),
            status: SiteStatus::Unreachable,
            urls_attempted: Vec::new(),
            pages_searched: Vec::new(),
            failures: Vec::new(),
            codes_found: BTreeSet::new(),
            total_codes: 0,
            error: Some(error.into()),
        }
    }
}

/// Codes found for one product across all target sites.
#[derive(Debug, Clone, Serialize)]
pub struct AggregateResult {
    pub product_name: String,
    pub found_codes: BTreeSet<String>,
    pub site_results: BTreeMap<String, SiteResult>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped_rules: Vec<RuleFailure>,
}

/// One web search hit backing a validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SampleSource {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

/// Validation outcome for a single code.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationEntry {
    pub code: String,
    pub matches_found: usize,
    pub is_validated: bool,
    pub sample_sources: Vec<SampleSource>,
    /// Set when the search itself failed; `matches_found` is then zero.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Validation outcome for all codes of one product.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationResult {
    pub product_name: String,
    pub codes_validated: BTreeMap<String, ValidationEntry>,
    /// Validated codes, in the order they were checked.
    pub validated_codes: Vec<String>,
    pub overall_validation: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ValidationResult {
    /// The result used when site scanning produced no codes to validate.
    pub fn no_codes(product_name: &str) -> Self {
        Self {
            product_name: product_name.to_string(),
            codes_validated: BTreeMap::new(),
            validated_codes: Vec::new(),
            overall_validation: false,
            message: Some(NO_CODES_MESSAGE.to_string()),
        }
    }
}

/// Combined scan + validation report for one product.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub product_name: String,
    pub site_search: AggregateResult,
    pub web_validation: ValidationResult,
    pub generated_at: DateTime<Utc>,
}

/// Per-product pipeline stage.
///
/// `Pending -> SiteScan -> (NoCodes | Validating) -> Done`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductStage {
    Pending,
    SiteScan,
    NoCodes,
    Validating,
    Done,
}

impl ProductStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStage::Pending => "pending",
            ProductStage::SiteScan => "site_scan",
            ProductStage::NoCodes => "no_codes",
            ProductStage::Validating => "validating",
            ProductStage::Done => "done",
        }
    }
}

impl fmt::Display for ProductStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
