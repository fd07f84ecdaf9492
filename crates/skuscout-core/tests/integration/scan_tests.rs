use skuscout_core::testutil::{MockFetcher, MockPage};
use skuscout_core::{ExtractionRule, SiteStatus};

use crate::integration::common::{scanner, strings};

const CATALOGUE: &str = "<html><body>
<h1>Space Marine Tactical Squad</h1>
<p>Product code: 48-07</p>
<p>Barcode 5011921912345</p>
<p>SKU WH40K0711 in stock</p>
</body></html>";

#[tokio::test]
async fn one_failing_site_does_not_hide_the_other() {
    let fetcher = MockFetcher::new()
        .with_site("https://down.test", MockPage::Unreachable)
        .with_site("https://up.test", MockPage::html(CATALOGUE));
    let sites = strings(&["https://down.test", "https://up.test"]);
    let rules = vec![ExtractionRule::regex("[0-9]{2}-[0-9]{2}")];

    let result = scanner(fetcher)
        .scan_all_sites("Tactical Squad", &sites, &rules)
        .await;

    assert_eq!(result.found_codes.len(), 1);
    assert!(result.found_codes.contains("48-07"));

    let down = &result.site_results["https://down.test"];
    assert_eq!(down.status, SiteStatus::Unreachable);
    assert!(down.error.is_some());
    assert!(down.codes_found.is_empty());

    let up = &result.site_results["https://up.test"];
    assert_eq!(up.status, SiteStatus::CodesFound);
    assert_eq!(up.pages_searched.len(), 3);
}

#[tokio::test]
async fn default_rules_and_literal_additions_work_together() {
    let fetcher = MockFetcher::new().with_site("https://up.test", MockPage::html(CATALOGUE));

    let result = scanner(fetcher)
        .search_with_defaults(
            "Tactical Squad",
            &strings(&["https://up.test"]),
            &[ExtractionRule::literal("SKU")],
        )
        .await;

    assert!(result.found_codes.contains("48-07"));
    assert!(result.found_codes.contains("5011921912345"));
    assert!(result.found_codes.contains("WH40K0711"));
    assert_eq!(result.site_results.len(), 4);
}

#[tokio::test]
async fn zero_codes_and_unreachable_are_distinguishable() {
    let fetcher = MockFetcher::new()
        .with_site("https://empty.test", MockPage::html("<p>Nothing to see</p>"))
        .with_site("https://down.test", MockPage::Status(503));
    let sites = strings(&["https://empty.test", "https://down.test"]);
    let rules = vec![ExtractionRule::regex("[0-9]{2}-[0-9]{2}")];

    let result = scanner(fetcher).scan_all_sites("Kit", &sites, &rules).await;

    assert!(result.found_codes.is_empty());
    assert_eq!(
        result.site_results["https://empty.test"].status,
        SiteStatus::NoCodes
    );
    assert_eq!(
        result.site_results["https://down.test"].status,
        SiteStatus::Unreachable
    );
}
