use std::time::Duration;

use anyhow::Result;
use skuscout_client::fetcher::DEFAULT_USER_AGENT;
use skuscout_client::{DuckDuckGoSearch, HtmlTextCleaner, ReqwestFetcher};
use skuscout_core::{
    AppError, ExtractionRule, Fetcher, ScanConfig, SearchEngine, SiteScanner, SiteStatus,
    ValidationConfig, WebValidator,
};

use crate::integration::common::{
    Route, closed_port_url, serve, serve_silent, serve_user_agent_echo,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("skuscout=debug")
        .try_init();
}

fn quiet_scan() -> ScanConfig {
    ScanConfig::default().with_page_delay(Duration::ZERO)
}

#[tokio::test]
async fn fetcher_returns_body_on_success() -> Result<()> {
    let base = serve(vec![("/", Route::ok("<p>hello</p>"))]).await;
    let html = ReqwestFetcher::new()?.fetch(&base).await?;
    assert_eq!(html, "<p>hello</p>");
    Ok(())
}

#[tokio::test]
async fn fetcher_rejects_non_success_status() -> Result<()> {
    let base = serve(vec![("/", Route::status(500))]).await;
    let err = ReqwestFetcher::new()?
        .fetch(&format!("{base}/missing"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::HttpError(ref m) if m.contains("HTTP 404")));
    Ok(())
}

#[tokio::test]
async fn fetcher_sends_user_agent() -> Result<()> {
    let base = serve_user_agent_echo().await;

    let sent = ReqwestFetcher::new()?.fetch(&base).await?;
    assert_eq!(sent, DEFAULT_USER_AGENT);

    let custom = ReqwestFetcher::new()?.with_user_agent("TestAgent/1.0")?;
    assert_eq!(custom.fetch(&base).await?, "TestAgent/1.0");
    Ok(())
}

#[tokio::test]
async fn fetcher_reports_connection_failures() -> Result<()> {
    let base = closed_port_url().await;
    let err = ReqwestFetcher::new()?.fetch(&base).await.unwrap_err();
    assert!(matches!(err, AppError::NetworkError(_)));
    Ok(())
}

#[tokio::test]
async fn fetcher_times_out_on_silent_server() -> Result<()> {
    let base = serve_silent().await;
    let fetcher = ReqwestFetcher::with_timeout(Duration::from_millis(200))?;
    let err = fetcher.fetch(&base).await.unwrap_err();
    assert!(matches!(err, AppError::Timeout(_)));
    Ok(())
}

#[tokio::test]
async fn scanner_runs_end_to_end_over_http() -> Result<()> {
    init_tracing();
    let base = serve(vec![
        (
            "/",
            Route::ok(
                "<html><body><script>var hidden = '99-99';</script>\
                 <p>Item code: 12-34</p></body></html>",
            ),
        ),
        ("/?search=Power+Armor", Route::status(500)),
        (
            "/?q=Power+Armor",
            Route::ok("<ul><li>SKU <b>ABCD1234</b></li><li>Other WXYZ9876</li></ul>"),
        ),
    ])
    .await;

    let scanner =
        SiteScanner::with_config(ReqwestFetcher::new()?, HtmlTextCleaner::new(), quiet_scan());
    let rules = vec![
        ExtractionRule::regex("[0-9]{2}-[0-9]{2}"),
        ExtractionRule::literal("SKU"),
    ];
    let result = scanner.scan_site(&base, "Power Armor", &rules).await;

    let codes: Vec<&str> = result.codes_found.iter().map(String::as_str).collect();
    assert_eq!(codes, vec!["12-34", "ABCD1234"]);
    assert_eq!(result.status, SiteStatus::CodesFound);
    assert_eq!(result.urls_attempted.len(), 3);
    assert_eq!(result.pages_searched.len(), 2);
    assert_eq!(result.failures.len(), 1);
    assert!(result.failures[0].error.contains("HTTP 500"));
    Ok(())
}

#[tokio::test]
async fn duckduckgo_adapter_parses_local_result_page() -> Result<()> {
    let results: String = (0..4)
        .map(|i| {
            format!(
                "<div class=\"result\"><a class=\"result__a\" href=\"https://r{i}.test\">Result {i}</a>\
                 <a class=\"result__snippet\">Widget AB12 listing {i}</a></div>"
            )
        })
        .collect();
    let base = serve(vec![("/html/", Route::ok(&results))]).await;

    let search = DuckDuckGoSearch::with_endpoint(ReqwestFetcher::new()?, format!("{base}/html/"));
    let hits = search.search("\"Widget\" \"AB12\"").await?;
    assert_eq!(hits.len(), 4);
    assert_eq!(hits[2].url, "https://r2.test");

    let validator = WebValidator::with_config(
        search,
        ValidationConfig::default().with_query_delay(Duration::ZERO),
    );
    let result = validator
        .validate("Widget", &["AB12".to_string()], 3)
        .await;
    assert!(result.overall_validation);
    assert_eq!(result.codes_validated["AB12"].matches_found, 4);
    Ok(())
}
