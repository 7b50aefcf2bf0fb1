//! Client Query Integration Tests
//!
//! Runs package, major-version and distribution queries through the public
//! `DiscoClient` API, both before the first snapshot (remote path) and after
//! it (snapshot path), against the shared fixture catalog.

#[path = "../support/mod.rs"]
mod support;

use disco_core::{
    Architecture, Comparison, DiscoClient, Distribution, Latest, OperatingSystem, Package,
    PackageQuery, ReleaseStatus, VersionNumber,
};
use std::sync::Arc;
use support::{manual_config, MockFetcher};
use tokio_test::assert_ok;

fn ids(packages: &[Arc<Package>]) -> Vec<&str> {
    packages.iter().map(|p| p.id.as_str()).collect()
}

fn cold_client() -> (DiscoClient, Arc<MockFetcher>) {
    let fetcher = MockFetcher::with_fixtures();
    let client = DiscoClient::with_fetcher(manual_config(), fetcher.clone()).unwrap();
    (client, fetcher)
}

async fn warm_client() -> DiscoClient {
    let (client, _) = cold_client();
    assert_ok!(client.refresh_now_async().await);
    client
}

fn ga() -> PackageQuery {
    PackageQuery::new().release_status(ReleaseStatus::Ga)
}

#[tokio::test]
async fn test_partial_version_match() {
    let client = warm_client().await;

    let found = client
        .packages_async(&PackageQuery::new().version(VersionNumber::new(17)))
        .await;
    assert_eq!(ids(&found), vec!["zulu-17.0.9", "zulu-17.0.8", "temurin-17.0.9"]);

    let found = client
        .packages_async(&PackageQuery::new().version(VersionNumber::parse("17.0.9").unwrap()))
        .await;
    assert_eq!(ids(&found), vec!["zulu-17.0.9", "temurin-17.0.9"]);
}

#[tokio::test]
async fn test_cold_and_warm_answers_agree() {
    let queries = vec![
        PackageQuery::new().version(VersionNumber::new(17)),
        ga().latest(Latest::Overall),
        ga().latest(Latest::PerDistribution),
        PackageQuery::new().version(VersionNumber::new(17)).latest(Latest::PerVersion),
        ga().version(VersionNumber::new(21)).comparison(Comparison::GreaterThanOrEqual),
        PackageQuery::new().operating_system(OperatingSystem::Windows),
    ];

    let (cold, _) = cold_client();
    let warm = warm_client().await;
    assert!(!cold.is_ready());
    assert!(warm.is_ready());

    for query in &queries {
        let cold_ids: Vec<String> = cold.packages_async(query).await.iter().map(|p| p.id.clone()).collect();
        let warm_ids: Vec<String> = warm.packages_async(query).await.iter().map(|p| p.id.clone()).collect();
        assert_eq!(cold_ids, warm_ids, "answers differ for {:?}", query);
        assert!(!warm_ids.is_empty(), "no answer for {:?}", query);
    }
}

#[tokio::test]
async fn test_overall_latest_leaves_out_native_image_builds() {
    let client = warm_client().await;

    let found = client.packages_async(&ga().latest(Latest::Overall)).await;
    assert_eq!(ids(&found), vec!["zulu-21.0.1", "temurin-21.0.1-win"]);

    let found = client
        .packages_async(&ga().latest(Latest::Overall).distribution(Distribution::Mandrel))
        .await;
    assert_eq!(ids(&found), vec!["mandrel-23.0.1"]);
}

#[tokio::test]
async fn test_latest_per_distribution() {
    let client = warm_client().await;

    let found = client.packages_async(&ga().latest(Latest::PerDistribution)).await;
    assert_eq!(
        ids(&found),
        vec!["zulu-21.0.1", "temurin-21.0.1-win", "mandrel-23.0.1"]
    );

    let found = client
        .packages_async(
            &ga()
                .latest(Latest::PerDistribution)
                .distribution(Distribution::Temurin)
                .operating_system(OperatingSystem::Linux),
        )
        .await;
    assert_eq!(ids(&found), vec!["temurin-17.0.9"]);
}

#[tokio::test]
async fn test_latest_per_version() {
    let client = warm_client().await;

    let found = client
        .packages_async(&PackageQuery::new().version(VersionNumber::new(17)).latest(Latest::PerVersion))
        .await;
    assert_eq!(ids(&found), vec!["zulu-17.0.9", "temurin-17.0.9"]);
}

#[tokio::test]
async fn test_range_comparisons_use_known_feature_lines() {
    let client = warm_client().await;

    let found = client
        .packages_async(&ga().version(VersionNumber::new(21)).comparison(Comparison::GreaterThanOrEqual))
        .await;
    assert_eq!(
        ids(&found),
        vec!["zulu-21.0.1", "temurin-21.0.1-win", "mandrel-23.0.1"]
    );

    let found = client
        .packages_async(&ga().version(VersionNumber::new(17)).comparison(Comparison::LessThan))
        .await;
    assert_eq!(ids(&found), vec!["temurin-11.0.21"]);
}

#[tokio::test]
async fn test_axis_filters() {
    let client = warm_client().await;

    let found = client
        .packages_async(&PackageQuery::new().architecture(Architecture::Aarch64))
        .await;
    assert_eq!(ids(&found), vec!["temurin-11.0.21"]);

    let found = client
        .packages_async(&PackageQuery::new().operating_system(OperatingSystem::Windows))
        .await;
    assert_eq!(ids(&found), vec!["temurin-21.0.1-win"]);

    let found = client
        .packages_async(&PackageQuery::new().release_status(ReleaseStatus::Ea))
        .await;
    assert_eq!(ids(&found), vec!["temurin-22-ea"]);
}

#[tokio::test]
async fn test_cold_query_sends_axis_parameters_only() {
    let (client, fetcher) = cold_client();
    client
        .packages_async(
            &PackageQuery::new()
                .version(VersionNumber::new(21))
                .operating_system(OperatingSystem::Windows)
                .latest(Latest::PerDistribution),
        )
        .await;

    let url = fetcher
        .requested()
        .into_iter()
        .find(|u| u.contains("/packages?"))
        .unwrap();
    assert!(url.contains("os=windows"));
    assert!(url.contains("discovery_scope_id=public"));
    assert!(!url.contains("version="));
    assert!(!url.contains("latest="));
}

#[tokio::test]
async fn test_transport_failure_yields_empty_results() {
    let (client, fetcher) = cold_client();
    fetcher.fail("packages", 502);
    fetcher.fail("distributions", 502);

    assert!(client.packages_async(&PackageQuery::new()).await.is_empty());
    assert!(client.all_packages_async().await.is_empty());
    assert!(client.package_async("zulu-17.0.9").await.is_none());
    assert!(client.distributions_async().await.is_empty());
}

#[tokio::test]
async fn test_all_packages_and_lookup() {
    let client = warm_client().await;

    let all = client.all_packages_async().await;
    assert_eq!(all.len(), 8);
    assert_eq!(all[0].id, "zulu-21.0.1");
    assert_eq!(all[7].id, "mandrel-23.0.1");

    let pkg = client.package_async("temurin-11.0.21").await.unwrap();
    assert_eq!(pkg.architecture, Architecture::Aarch64);
    assert!(client.package_async("does-not-exist").await.is_none());
}

#[tokio::test]
async fn test_packages_as_json() {
    let client = warm_client().await;

    let json = client
        .packages_as_json_async(&PackageQuery::new().version(VersionNumber::new(11)))
        .await;
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let records = value.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["id"], "temurin-11.0.21");
    assert_eq!(records[0]["distribution"], "temurin");

    let json = client
        .packages_as_json_async(&PackageQuery::new().version(VersionNumber::new(8)))
        .await;
    assert_eq!(json, "[]");
}

#[tokio::test]
async fn test_major_version_accessors() {
    let client = warm_client().await;

    assert_eq!(client.major_versions_async(true).await.len(), 6);
    assert_eq!(client.major_versions_async(false).await.len(), 4);

    let maintained: Vec<u32> = client
        .maintained_major_versions_async(false)
        .await
        .iter()
        .map(|mv| mv.feature)
        .collect();
    assert_eq!(maintained, vec![21, 17, 11]);

    assert_eq!(client.latest_lts_async(false).await.unwrap().feature, 21);
    assert_eq!(client.latest_lts_async(true).await.unwrap().feature, 21);
    assert_eq!(client.latest_mts_async(false).await.unwrap().feature, 13);
    assert_eq!(client.latest_sts_async(false).await.unwrap().feature, 13);
    assert_eq!(client.latest_sts_async(true).await.unwrap().feature, 23);

    let seventeen = client.major_version_async(17, false).await.unwrap();
    assert_eq!(seventeen.latest_version(), Some(VersionNumber::parse("17.0.9").unwrap()));
    assert!(client.major_version_async(23, false).await.is_none());
    assert!(client.major_version_async(23, true).await.is_some());

    assert_eq!(client.useful_major_versions_async().await.len(), 6);
}

#[tokio::test]
async fn test_latest_lts_skips_lines_with_a_single_version_without_ea() {
    let fetcher = MockFetcher::with_fixtures();
    fetcher.route(
        "major_versions",
        r#"[
            {"major_version": 25, "term_of_support": "lts", "maintained": true, "versions": ["25+36"]},
            {"major_version": 21, "term_of_support": "lts", "maintained": true, "versions": ["21.0.1+12", "21+35"]}
        ]"#,
    );
    let client = DiscoClient::with_fetcher(manual_config(), fetcher).unwrap();
    assert_ok!(client.refresh_now_async().await);

    assert_eq!(client.latest_lts_async(false).await.unwrap().feature, 21);
    assert_eq!(client.latest_lts_async(true).await.unwrap().feature, 25);
}

#[tokio::test]
async fn test_distribution_listings() {
    let client = warm_client().await;

    assert_eq!(
        client.distributions_async().await,
        vec![Distribution::Zulu, Distribution::Temurin]
    );

    let per_distribution = client.versions_per_distribution_async().await;
    assert_eq!(per_distribution.len(), 2);
    assert_eq!(per_distribution[1].versions.len(), 3);

    let for_version = client
        .distributions_for_version_async(&VersionNumber::parse("17.0.9").unwrap())
        .await;
    assert!(for_version.contains(&Distribution::Zulu));

    let supporting = client
        .distributions_supporting_async(&PackageQuery::new().version(VersionNumber::new(11)))
        .await;
    assert_eq!(supporting, vec![Distribution::Temurin]);

    assert!(client.distributions_based_on_graalvm().contains(&Distribution::Mandrel));
    assert!(client.distributions_based_on_openjdk().contains(&Distribution::Zulu));
    assert!(!client.distributions_based_on_openjdk().contains(&Distribution::Mandrel));
}

#[test]
fn test_blocking_api() {
    let fetcher = MockFetcher::with_fixtures();
    let client = DiscoClient::with_fetcher(manual_config(), fetcher).unwrap();

    let found = client.packages(&PackageQuery::new().version(VersionNumber::new(17)));
    assert_eq!(found.len(), 3);

    client.refresh_now().unwrap();
    assert!(client.is_ready());
    assert_eq!(client.latest_lts(false).unwrap().feature, 21);
    assert!(client.package("zulu-21.0.1").is_some());
    assert_eq!(client.distributions().len(), 2);
}

#[tokio::test]
async fn test_malformed_bodies_yield_empty_results() {
    let fetcher = Arc::new(MockFetcher::new());
    for pattern in ["packages", "major_versions", "distributions", "ephemeral_ids"] {
        fetcher.route(pattern, "<html>maintenance</html>");
    }
    let client = DiscoClient::with_fetcher(manual_config(), fetcher).unwrap();

    assert!(client.packages_async(&PackageQuery::new()).await.is_empty());
    assert!(client
        .packages_async(&ga().version(VersionNumber::new(17)).comparison(Comparison::LessThan))
        .await
        .is_empty());
    assert_eq!(client.packages_as_json_async(&PackageQuery::new()).await, "[]");
    assert!(client.all_packages_async().await.is_empty());
    assert!(client.package_async("zulu-17.0.9").await.is_none());
    assert!(client.major_versions_async(true).await.is_empty());
    assert!(client.useful_major_versions_async().await.is_empty());
    assert!(client.major_version_named_async("latest_lts").await.is_none());
    assert!(client.latest_lts_async(true).await.is_none());
    assert!(client.distributions_async().await.is_empty());
    assert!(client.pkg_info_async("eph-zulu-17", "17.0.9").await.is_none());
    assert!(client.refresh_now_async().await.is_err());
}
