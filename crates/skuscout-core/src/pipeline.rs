//! Two-phase pipeline: scan retailer sites for codes, then validate them on
//! the web. Products run strictly one after another.

use chrono::Utc;

use crate::models::{PipelineReport, ProductStage, ValidationResult};
use crate::rules::ExtractionRule;
use crate::scanner::SiteScanner;
use crate::traits::{Cleaner, Fetcher, SearchEngine};
use crate::validator::WebValidator;

/// Events emitted by the pipeline for monitoring/logging.
#[derive(Debug, Clone)]
pub enum PipelineEvent<'a> {
    ProductStarted {
        product: &'a str,
        index: usize,
        total: usize,
    },
    StageChanged {
        product: &'a str,
        stage: ProductStage,
    },
    ProductFinished {
        product: &'a str,
        codes_found: usize,
        codes_validated: usize,
        overall: bool,
    },
}

/// Trait for receiving pipeline events (decoupled logging).
pub trait PipelineReporter: Send + Sync {
    fn report(&self, event: PipelineEvent<'_>) {
        let _ = event;
    }
}

/// Reporter that uses the `tracing` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingPipelineReporter;

impl PipelineReporter for TracingPipelineReporter {
    fn report(&self, event: PipelineEvent<'_>) {
        match event {
            PipelineEvent::ProductStarted {
                product,
                index,
                total,
            } => {
                tracing::info!(%product, "Processing product {}/{}", index + 1, total);
            }
            PipelineEvent::StageChanged { product, stage } => {
                tracing::debug!(%product, %stage, "Stage changed");
            }
            PipelineEvent::ProductFinished {
                product,
                codes_found,
                codes_validated,
                overall,
            } => {
                tracing::info!(
                    %product,
                    %codes_found,
                    %codes_validated,
                    %overall,
                    "Product finished"
                );
            }
        }
    }
}

/// Runs site scanning and web validation for one or many products.
///
/// Generic over all external dependencies via traits, so the whole flow can
/// be exercised without real HTTP.
pub struct ProductPipeline<F, C, S, R = TracingPipelineReporter>
where
    F: Fetcher,
    C: Cleaner,
    S: SearchEngine,
    R: PipelineReporter,
{
    scanner: SiteScanner<F, C>,
    validator: WebValidator<S>,
    reporter: R,
}

impl<F, C, S> ProductPipeline<F, C, S>
where
    F: Fetcher,
    C: Cleaner,
    S: SearchEngine,
{
    pub fn new(scanner: SiteScanner<F, C>, validator: WebValidator<S>) -> Self {
        Self::with_reporter(scanner, validator, TracingPipelineReporter)
    }
}

impl<F, C, S, R> ProductPipeline<F, C, S, R>
where
    F: Fetcher,
    C: Cleaner,
    S: SearchEngine,
    R: PipelineReporter,
{
    pub fn with_reporter(
        scanner: SiteScanner<F, C>,
        validator: WebValidator<S>,
        reporter: R,
    ) -> Self {
        Self {
            scanner,
            validator,
            reporter,
        }
    }

    /// Run the full pipeline for each product, in input order.
    ///
    /// Product names are trimmed and blank entries skipped. Each product
    /// finishes both phases before the next one starts.
    pub async fn process(
        &self,
        products: &[String],
        sites: &[String],
        rules: &[ExtractionRule],
        min_matches: usize,
    ) -> Vec<PipelineReport> {
        let products: Vec<&str> = products
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .collect();

        let mut reports = Vec::with_capacity(products.len());
        for (index, &product) in products.iter().enumerate() {
            self.reporter.report(PipelineEvent::ProductStarted {
                product,
                index,
                total: products.len(),
            });
            reports.push(
                self.process_product(product, sites, rules, min_matches)
                    .await,
            );
        }
        reports
    }

    /// Scan `sites` for one product and validate whatever codes turn up.
    ///
    /// When no codes are found the validator is not called at all.
    pub async fn process_product(
        &self,
        product_name: &str,
        sites: &[String],
        rules: &[ExtractionRule],
        min_matches: usize,
    ) -> PipelineReport {
        self.enter(product_name, ProductStage::Pending);
        self.enter(product_name, ProductStage::SiteScan);
        let site_search = self
            .scanner
            .scan_all_sites(product_name, sites, rules)
            .await;

        let web_validation = if site_search.found_codes.is_empty() {
            self.enter(product_name, ProductStage::NoCodes);
            ValidationResult::no_codes(product_name)
        } else {
            self.enter(product_name, ProductStage::Validating);
            let codes: Vec<String> = site_search.found_codes.iter().cloned().collect();
            self.validator
                .validate(product_name, &codes, min_matches)
                .await
        };

        self.enter(product_name, ProductStage::Done);
        self.reporter.report(PipelineEvent::ProductFinished {
            product: product_name,
            codes_found: site_search.found_codes.len(),
            codes_validated: web_validation.validated_codes.len(),
            overall: web_validation.overall_validation,
        });

        PipelineReport {
            product_name: product_name.to_string(),
            site_search,
            web_validation,
            generated_at: Utc::now(),
        }
    }

    fn enter(&self, product: &str, stage: ProductStage) {
        self.reporter
            .report(PipelineEvent::StageChanged { product, stage });
    }
}
