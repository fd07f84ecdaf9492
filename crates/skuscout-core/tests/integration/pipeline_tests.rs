use skuscout_core::testutil::{MockFetcher, MockPage, MockSearchEngine, RecordingReporter};
use skuscout_core::{ExtractionRule, ProductStage};

use crate::integration::common::{pipeline, strings};

#[tokio::test]
async fn product_without_codes_never_reaches_the_validator() {
    let fetcher = MockFetcher::new().with_site("https://shop.test", MockPage::html("Sold out"));
    let engine = MockSearchEngine::new(10);
    let reporter = RecordingReporter::new();
    let p = pipeline(fetcher, engine.clone(), reporter.clone());

    let reports = p
        .process(
            &strings(&["ProductA"]),
            &strings(&["https://shop.test"]),
            &[ExtractionRule::regex("[0-9]{2}-[0-9]{2}")],
            3,
        )
        .await;

    let json = serde_json::to_value(&reports).unwrap();
    assert_eq!(json[0]["web_validation"]["overall_validation"], false);
    assert_eq!(json[0]["web_validation"]["codes_validated"], serde_json::json!({}));
    assert_eq!(engine.calls(), 0);
    assert_eq!(
        reporter.stages_for("ProductA"),
        vec![
            ProductStage::Pending,
            ProductStage::SiteScan,
            ProductStage::NoCodes,
            ProductStage::Done,
        ]
    );
}

#[tokio::test]
async fn multi_product_run_mixes_outcomes() {
    let fetcher = MockFetcher::new()
        .with_site("https://shop.test?search=Alpha", MockPage::html("Alpha kit 11-22"))
        .with_site("https://shop.test?search=Beta", MockPage::html("Beta kit 33-44"))
        .with_fallback(MockPage::html("front page"));
    let engine = MockSearchEngine::new(5)
        .with_hits_for("33-44", 1)
        .failing_for("11-22");
    let p = pipeline(fetcher, engine.clone(), RecordingReporter::new());

    let reports = p
        .process(
            &strings(&["Alpha", "Beta", "Gamma"]),
            &strings(&["https://shop.test"]),
            &[ExtractionRule::regex("[0-9]{2}-[0-9]{2}")],
            3,
        )
        .await;

    assert_eq!(reports.len(), 3);

    let alpha = &reports[0].web_validation;
    assert!(!alpha.overall_validation);
    assert!(alpha.codes_validated["11-22"].error.is_some());

    let beta = &reports[1].web_validation;
    assert_eq!(beta.codes_validated["33-44"].matches_found, 1);
    assert!(!beta.overall_validation);

    let gamma = &reports[2];
    assert!(gamma.site_search.found_codes.is_empty());
    assert!(gamma.web_validation.message.is_some());

    assert_eq!(engine.calls(), 2);
}

#[tokio::test]
async fn duplicate_matches_across_rules_and_pages_are_collapsed() {
    let page = "SKU 12-34 | SKU 12-34 | item 12-34";
    let fetcher = MockFetcher::new().with_site("https://shop.test", MockPage::html(page));
    let engine = MockSearchEngine::new(3);
    let p = pipeline(fetcher, engine.clone(), RecordingReporter::new());

    let report = p
        .process_product(
            "Widget",
            &strings(&["https://shop.test"]),
            &[
                ExtractionRule::regex("[0-9]{2}-[0-9]{2}"),
                ExtractionRule::regex("12-34"),
            ],
            3,
        )
        .await;

    assert_eq!(report.site_search.found_codes.len(), 1);
    assert_eq!(engine.calls(), 1);
    assert_eq!(report.web_validation.validated_codes, vec!["12-34"]);
}
