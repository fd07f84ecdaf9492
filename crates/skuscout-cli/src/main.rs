use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use skuscout_client::{DuckDuckGoSearch, HtmlTextCleaner, ReqwestFetcher};
use skuscout_core::{
    DEFAULT_MIN_MATCHES, ExtractionRule, ProductPipeline, ScanConfig, SearchTargets, SiteScanner,
    ValidationConfig, WebValidator,
};

#[derive(Parser)]
#[command(
    name = "skuscout",
    version,
    about = "Discover product codes on retailer sites and validate them on the web"
)]
struct Cli {
    #[command(flatten)]
    network: NetworkArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct NetworkArgs {
    /// Per-request timeout in seconds
    #[arg(long, global = true, env = "SKUSCOUT_TIMEOUT_SECS", default_value_t = 10)]
    timeout_secs: u64,

    /// Pause after each successful page fetch, in milliseconds
    #[arg(long, global = true, env = "SKUSCOUT_PAGE_DELAY_MS", default_value_t = 1000)]
    page_delay_ms: u64,

    /// Pause after each web search query, in milliseconds
    #[arg(long, global = true, env = "SKUSCOUT_QUERY_DELAY_MS", default_value_t = 2000)]
    query_delay_ms: u64,

    /// Search endpoint used for web validation (DuckDuckGo HTML markup)
    #[arg(
        long,
        global = true,
        env = "SKUSCOUT_SEARCH_ENDPOINT",
        default_value = "https://duckduckgo.com/html/"
    )]
    search_endpoint: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan the default retailer sites (plus any extras) for product codes
    Search {
        /// Product name to search for
        product: String,

        /// Additional site to scan (repeatable)
        #[arg(long = "site")]
        sites: Vec<String>,

        /// Additional rule: `regex:<pattern>` or a literal marker such as `SKU` (repeatable)
        #[arg(long = "rule")]
        rules: Vec<ExtractionRule>,

        /// Use only the given sites and rules, not the built-in defaults
        #[arg(long, default_value_t = false)]
        no_defaults: bool,
    },

    /// Validate codes by counting web search co-occurrences with the product name
    Validate {
        /// Product name
        #[arg(short, long)]
        product: String,

        /// Code to validate (repeatable)
        #[arg(short, long = "code", required = true)]
        codes: Vec<String>,

        /// Minimum search results for a code to be validated
        #[arg(short, long, default_value_t = DEFAULT_MIN_MATCHES)]
        min_matches: usize,
    },

    /// Scan sites and validate the codes found, for one or more products
    Process {
        /// Product name (repeatable)
        #[arg(short, long = "product")]
        products: Vec<String>,

        /// File with one product name per line
        #[arg(long)]
        products_file: Option<PathBuf>,

        /// Site to scan (repeatable; defaults to the built-in sites)
        #[arg(long = "site")]
        sites: Vec<String>,

        /// Extraction rule (repeatable; defaults to the built-in rules)
        #[arg(long = "rule")]
        rules: Vec<ExtractionRule>,

        /// Minimum search results for a code to be validated
        #[arg(short, long, default_value_t = DEFAULT_MIN_MATCHES)]
        min_matches: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Setup tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("skuscout=info".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let network = &cli.network;

    match cli.command {
        Commands::Search {
            product,
            sites,
            rules,
            no_defaults,
        } => {
            let scanner = build_scanner(network)?;
            let result = if no_defaults {
                let targets = SearchTargets::new(sites, rules);
                targets.validate()?;
                scanner
                    .scan_all_sites(&product, &targets.sites, &targets.rules)
                    .await
            } else {
                scanner.search_with_defaults(&product, &sites, &rules).await
            };
            print_json(&result)?;
        }
        Commands::Validate {
            product,
            codes,
            min_matches,
        } => {
            let validator = build_validator(network)?;
            let result = validator.validate(&product, &codes, min_matches).await;
            print_json(&result)?;
        }
        Commands::Process {
            mut products,
            products_file,
            sites,
            rules,
            min_matches,
        } => {
            if let Some(path) = products_file {
                products.extend(read_product_list(&path)?);
            }
            anyhow::ensure!(
                !products.is_empty(),
                "No products given. Use --product or --products-file."
            );

            let targets = resolve_targets(sites, rules);
            targets.validate()?;
            tracing::info!(products = products.len(), "Processing products");

            let pipeline = ProductPipeline::new(build_scanner(network)?, build_validator(network)?);
            let reports = pipeline
                .process(&products, &targets.sites, &targets.rules, min_matches)
                .await;
            print_json(&reports)?;
        }
    }

    Ok(())
}

fn build_scanner(network: &NetworkArgs) -> Result<SiteScanner<ReqwestFetcher, HtmlTextCleaner>> {
    let timeout = Duration::from_secs(network.timeout_secs);
    let fetcher = ReqwestFetcher::with_timeout(timeout).context("Failed to create HTTP client")?;
    let config = ScanConfig::default()
        .with_fetch_timeout(timeout)
        .with_page_delay(Duration::from_millis(network.page_delay_ms));
    Ok(SiteScanner::with_config(fetcher, HtmlTextCleaner::new(), config))
}

fn build_validator(
    network: &NetworkArgs,
) -> Result<WebValidator<DuckDuckGoSearch<ReqwestFetcher>>> {
    let fetcher = ReqwestFetcher::with_timeout(Duration::from_secs(network.timeout_secs))
        .context("Failed to create HTTP client")?;
    let search = DuckDuckGoSearch::with_endpoint(fetcher, network.search_endpoint.clone());
    let config =
        ValidationConfig::default().with_query_delay(Duration::from_millis(network.query_delay_ms));
    Ok(WebValidator::with_config(search, config))
}

/// Explicit sites/rules win; an empty list falls back to the built-in defaults.
fn resolve_targets(sites: Vec<String>, rules: Vec<ExtractionRule>) -> SearchTargets {
    let defaults = SearchTargets::defaults();
    SearchTargets::new(
        if sites.is_empty() { defaults.sites } else { sites },
        if rules.is_empty() { defaults.rules } else { rules },
    )
}

/// Read newline-separated product names, skipping blank lines.
fn read_product_list(path: &Path) -> Result<Vec<String>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read products file: {}", path.display()))?;
    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
