use std::collections::BTreeMap;

use crate::config::ValidationConfig;
use crate::models::{ValidationEntry, ValidationResult};
use crate::throttle::Pacer;
use crate::traits::SearchEngine;

/// Search hits a code needs before it counts as validated, unless overridden.
pub const DEFAULT_MIN_MATCHES: usize = 3;

/// Build the exact-phrase query for a product/code pair.
pub fn build_query(product_name: &str, code: &str) -> String {
    format!("\"{product_name}\" \"{code}\"")
}

/// Confirms codes by counting how often they co-occur with the product
/// name in general web search results.
pub struct WebValidator<S: SearchEngine> {
    engine: S,
    config: ValidationConfig,
    pacer: Pacer,
}

impl<S: SearchEngine> WebValidator<S> {
    pub fn new(engine: S) -> Self {
        Self::with_config(engine, ValidationConfig::default())
    }

    pub fn with_config(engine: S, config: ValidationConfig) -> Self {
        let pacer = Pacer::new(config.query_delay);
        Self {
            engine,
            config,
            pacer,
        }
    }

    /// Validate each code in the given order.
    ///
    /// A code is validated when its search returns at least `min_matches`
    /// entries. A failed search records zero matches and an error, and the
    /// remaining codes are still checked. Repeated codes are checked once.
    pub async fn validate(
        &self,
        product_name: &str,
        codes: &[String],
        min_matches: usize,
    ) -> ValidationResult {
        let mut codes_validated = BTreeMap::new();
        let mut validated_codes = Vec::new();

        for code in codes {
            if codes_validated.contains_key(code) {
                continue;
            }
            let entry = self.check_code(product_name, code, min_matches).await;
            if entry.is_validated {
                validated_codes.push(code.clone());
            }
            codes_validated.insert(code.clone(), entry);
        }

        tracing::info!(
            product = %product_name,
            checked = codes_validated.len(),
            validated = validated_codes.len(),
            "Web validation complete"
        );

        ValidationResult {
            product_name: product_name.to_string(),
            overall_validation: !validated_codes.is_empty(),
            codes_validated,
            validated_codes,
            message: None,
        }
    }

    async fn check_code(
        &self,
        product_name: &str,
        code: &str,
        min_matches: usize,
    ) -> ValidationEntry {
        let query = build_query(product_name, code);
        tracing::debug!(%query, "Searching web");
        let outcome = self.engine.search(&query).await;
        self.pacer.pause().await;

        match outcome {
            Ok(mut hits) => {
                hits.truncate(self.config.max_results);
                let matches_found = hits.len();
                hits.truncate(self.config.max_samples);
                tracing::debug!(%code, matches = matches_found, "Search finished");
                ValidationEntry {
                    code: code.to_string(),
                    matches_found,
                    is_validated: matches_found >= min_matches,
                    sample_sources: hits,
                    error: None,
                }
            }
            Err(e) => {
                tracing::warn!(%code, error = %e, "Web search failed; recording zero matches");
                let matches_found = 0;
                ValidationEntry {
                    code: code.to_string(),
                    matches_found,
                    is_validated: matches_found >= min_matches,
                    sample_sources: Vec::new(),
                    error: Some(e.to_string()),
                }
            }
        }
    }
}
