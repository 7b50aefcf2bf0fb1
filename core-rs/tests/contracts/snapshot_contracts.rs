//! Snapshot Publication Contract Tests
//!
//! These tests verify the invariants readers rely on: a snapshot is published
//! whole or not at all, a published snapshot never changes, and a failed
//! refresh never takes the previous one away.

#[path = "../support/mod.rs"]
mod support;

use disco_core::cache::{CacheManager, CacheState, CatalogSnapshot, RefreshOutcome};
use disco_core::{Distribution, Endpoints, EventBus, Package};
use std::sync::Arc;
use support::{manual_config, MockFetcher, CATALOG};
use tokio::sync::Notify;

const FULL_CATALOG: &str = "packages?release_status=ea&release_status=ga";

fn manager(fetcher: Arc<MockFetcher>) -> Arc<CacheManager> {
    Arc::new(CacheManager::new(
        fetcher,
        Endpoints::new(&manual_config()),
        EventBus::new(),
    ))
}

/// RULE: One id, one record. Identical duplicates collapse silently
#[test]
fn identical_duplicates_collapse() {
    let a = Package::new("a", Distribution::Zulu, "17.0.9").unwrap();
    let snapshot = CatalogSnapshot::build(vec![a.clone(), a.clone(), a], Vec::new());
    assert_eq!(snapshot.len(), 1);
}

/// RULE: A conflicting duplicate id keeps the record that came last
#[test]
fn conflicting_duplicate_keeps_last() {
    let first = Package::new("a", Distribution::Zulu, "17.0.8").unwrap();
    let second = Package::new("a", Distribution::Zulu, "17.0.9").unwrap();
    let snapshot = CatalogSnapshot::build(vec![first, second], Vec::new());
    assert_eq!(snapshot.get("a").unwrap().java_version, "17.0.9");
}

/// RULE: Malformed catalog entries are skipped, the rest is published
#[tokio::test]
async fn malformed_entries_do_not_block_publication() {
    let fetcher = Arc::new(MockFetcher::new());
    fetcher.route("major_versions", support::MAJOR_VERSIONS);
    fetcher.route(
        FULL_CATALOG,
        r#"[
            {"id": "ok", "distribution": "zulu", "java_version": "21.0.1", "package_type": "jdk"},
            {"id": "", "distribution": "zulu", "java_version": "21.0.1"},
            {"id": "bad-version", "distribution": "zulu", "java_version": "not-a-version"},
            {"id": 42},
            "junk"
        ]"#,
    );
    let cache = manager(fetcher);

    let outcome = cache.refresh().await.unwrap();
    assert_eq!(outcome, RefreshOutcome::Published(1));
    assert!(cache.snapshot().unwrap().contains("ok"));
}

/// RULE: Nothing is published until the whole catalog is built
/// BREAKS: Readers seeing half a catalog while a refresh is in flight. Clearing
/// the live set and refilling it in place would show readers an empty catalog.
#[tokio::test]
async fn in_flight_refresh_publishes_nothing() {
    let fetcher = MockFetcher::with_fixtures();
    let gate = Arc::new(Notify::new());
    fetcher.gate_catalog(gate.clone());
    let cache = manager(fetcher.clone());

    let refresh = {
        let cache = cache.clone();
        tokio::spawn(async move { cache.refresh().await })
    };
    while fetcher.catalog_calls() == 0 {
        tokio::task::yield_now().await;
    }

    assert_eq!(cache.state(), CacheState::Warming);
    assert!(!cache.is_ready());
    assert!(cache.snapshot().is_none());

    gate.notify_one();
    refresh.await.unwrap().unwrap();
    assert_eq!(cache.snapshot().unwrap().len(), 8);
}

/// RULE: A failed refresh never replaces or clears the published snapshot
#[tokio::test]
async fn failed_refresh_keeps_published_snapshot() {
    let fetcher = MockFetcher::with_fixtures();
    let cache = manager(fetcher.clone());
    cache.refresh().await.unwrap();
    let published = cache.snapshot().unwrap();

    for body in ["", "{}", "[]", "<html>maintenance</html>"] {
        fetcher.route(FULL_CATALOG, body);
        assert!(cache.refresh().await.is_err(), "body {:?} should fail", body);
        assert!(Arc::ptr_eq(&published, &cache.snapshot().unwrap()));
    }

    fetcher.fail(FULL_CATALOG, 500);
    assert!(cache.refresh().await.is_err());
    assert!(Arc::ptr_eq(&published, &cache.snapshot().unwrap()));
    assert_eq!(cache.state(), CacheState::Failed);
}

/// RULE: A published snapshot is never mutated by later refreshes
#[tokio::test]
async fn held_snapshot_is_immutable() {
    let fetcher = MockFetcher::with_fixtures();
    let cache = manager(fetcher.clone());
    cache.refresh().await.unwrap();
    let held = cache.snapshot().unwrap();
    let held_ids: Vec<String> = {
        let mut ids: Vec<String> = held.packages().map(|p| p.id.clone()).collect();
        ids.sort();
        ids
    };

    fetcher.route(FULL_CATALOG, &CATALOG.replace("zulu-17.0.8", "zulu-17.0.7"));
    cache.refresh().await.unwrap();

    let mut ids_after: Vec<String> = held.packages().map(|p| p.id.clone()).collect();
    ids_after.sort();
    assert_eq!(held_ids, ids_after);
    assert!(cache.snapshot().unwrap().contains("zulu-17.0.7"));
    assert!(!held.contains("zulu-17.0.7"));
}
