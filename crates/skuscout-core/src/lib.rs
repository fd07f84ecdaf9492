pub mod config;
pub mod error;
pub mod matcher;
pub mod models;
pub mod pipeline;
pub mod rules;
pub mod scanner;
pub mod testutil;
pub mod throttle;
pub mod traits;
pub mod urls;
pub mod validator;

pub use config::{ScanConfig, SearchTargets, ValidationConfig};
pub use error::AppError;
pub use matcher::{CodeMatcher, extract_codes};
pub use models::{
    AggregateResult, PipelineReport, ProductStage, SampleSource, SiteResult, SiteStatus,
    ValidationEntry, ValidationResult,
};
pub use pipeline::{PipelineEvent, PipelineReporter, ProductPipeline, TracingPipelineReporter};
pub use rules::ExtractionRule;
pub use scanner::SiteScanner;
pub use traits::{Cleaner, Fetcher, SearchEngine};
pub use urls::candidate_urls;
pub use validator::{DEFAULT_MIN_MATCHES, WebValidator};
