//! Download Integration Tests
//!
//! Resolves packages to download links through ephemeral ids and runs the
//! transfers through the bounded download pool.
//!
//! Uses tempfile for destinations - NO /tmp pollution

#[path = "../support/mod.rs"]
mod support;

use disco_core::{DiscoClient, DiscoConfig, DiscoError, Event, EventFilter, EventKind, PkgInfo};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use support::{manual_config, MockFetcher, PAYLOAD};
use tempfile::TempDir;
use tokio::sync::Notify;
use tokio_test::{assert_err, assert_ok};

async fn warm_client(config: DiscoConfig) -> DiscoClient {
    let client = DiscoClient::with_fetcher(config, MockFetcher::with_fixtures()).unwrap();
    assert_ok!(client.refresh_now_async().await);
    client
}

fn info(uri: &str) -> PkgInfo {
    PkgInfo {
        filename: "archive.tar.gz".to_string(),
        java_version: "17.0.9".to_string(),
        direct_download_uri: uri.to_string(),
        download_site_uri: String::new(),
    }
}

#[tokio::test]
async fn test_pkg_info_resolution() {
    let client = warm_client(manual_config()).await;

    let resolved = client.pkg_info_async("eph-zulu-17", "17.0.9+8").await.unwrap();
    assert_eq!(resolved.filename, "zulu17.tar.gz");
    assert_eq!(resolved.java_version, "17.0.9+8");
    assert_eq!(
        client.direct_download_uri_async("eph-zulu-17", "17.0.9+8").await.as_deref(),
        Some("https://cdn.example.com/zulu17.tar.gz")
    );

    assert!(client.pkg_info_async("eph-unknown", "1").await.is_none());
}

#[tokio::test]
async fn test_download_package_by_id() {
    let client = warm_client(manual_config()).await;
    let temp_dir = TempDir::new().unwrap();
    let dest = temp_dir.path().join("jdks/zulu17.tar.gz");

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    client.subscribe(EventFilter::Any, move |e| {
        if !matches!(e.kind(), EventKind::CacheUpdating | EventKind::CacheReady) {
            sink.lock().unwrap().push(e.clone());
        }
    });

    let download = assert_ok!(client.download_package_async("zulu-17.0.9", &dest).await);
    let id = download.id();
    assert_eq!(download.destination(), dest.as_path());

    let bytes = assert_ok!(download.wait().await);
    assert_eq!(bytes, PAYLOAD.len() as u64);
    assert_eq!(std::fs::read(&dest).unwrap(), PAYLOAD);

    let events = seen.lock().unwrap().clone();
    assert_eq!(
        events.first(),
        Some(&Event::DownloadStarted {
            id,
            url: "https://cdn.example.com/zulu17.tar.gz".to_string(),
            size: Some(PAYLOAD.len() as u64),
        })
    );
    assert_eq!(
        events.last(),
        Some(&Event::DownloadFinished {
            id,
            path: dest.clone(),
            bytes: PAYLOAD.len() as u64,
        })
    );
    let progress: Vec<u64> = events
        .iter()
        .filter_map(|e| match e {
            Event::DownloadProgress { bytes_read, .. } => Some(*bytes_read),
            _ => None,
        })
        .collect();
    assert_eq!(progress, vec![4, 8, 11]);
}

#[tokio::test]
async fn test_unknown_package_is_not_found() {
    let client = warm_client(manual_config()).await;
    let temp_dir = TempDir::new().unwrap();

    let result = client
        .download_package_async("no-such-package", temp_dir.path().join("x"))
        .await;
    assert!(matches!(result, Err(DiscoError::PackageNotFound(id)) if id == "no-such-package"));
}

#[tokio::test]
async fn test_unresolvable_ephemeral_id_fails_before_transfer() {
    let client = warm_client(manual_config()).await;
    let temp_dir = TempDir::new().unwrap();

    let result = client
        .download_package_async("zulu-21.0.1", temp_dir.path().join("x"))
        .await;
    assert!(matches!(result, Err(DiscoError::Download(_))));
}

#[tokio::test]
async fn test_failed_transfer_reports_failure() {
    let client = warm_client(manual_config()).await;
    let temp_dir = TempDir::new().unwrap();
    let dest = temp_dir.path().join("archive.tar.gz");

    let failed = Arc::new(Mutex::new(Vec::new()));
    let sink = failed.clone();
    client.subscribe(EventKind::DownloadFailed, move |e| sink.lock().unwrap().push(e.clone()));

    assert_err!(client.download_pkg_info(&info(""), &dest));

    let download = assert_ok!(client.download_pkg_info(&info("https://cdn.example.com/missing"), &dest));
    let result = download.wait().await;
    assert!(matches!(result, Err(DiscoError::HttpStatus { status: 404, .. })));
    assert!(!dest.exists());
    assert_eq!(failed.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_cancelled_download_reports_failure_and_cleans_up() {
    let fetcher = MockFetcher::with_fixtures();
    let gate = Arc::new(Notify::new());
    fetcher.gate_streams(gate.clone());
    let client = DiscoClient::with_fetcher(manual_config(), fetcher).unwrap();
    let temp_dir = TempDir::new().unwrap();
    let dest = temp_dir.path().join("archive.tar.gz");
    let part = temp_dir.path().join("archive.tar.gz.part");

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    client.subscribe(EventFilter::Any, move |e| sink.lock().unwrap().push(e.clone()));

    let download = assert_ok!(client.download_pkg_info(&info("https://cdn.example.com/slow.tar.gz"), &dest));
    let id = download.id();
    for _ in 0..300 {
        if part.exists() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(part.exists());

    download.cancel();
    let result = download.wait().await;
    assert!(matches!(result, Err(DiscoError::Cancelled(_))));
    assert!(!part.exists());
    assert!(!dest.exists());

    let events = seen.lock().unwrap().clone();
    assert_eq!(events.first().map(Event::kind), Some(EventKind::DownloadStarted));
    assert!(matches!(
        events.last(),
        Some(Event::DownloadFailed { id: failed, .. }) if *failed == id
    ));
    assert!(!events.iter().any(|e| e.kind() == EventKind::DownloadFinished));
}

#[tokio::test]
async fn test_pool_runs_every_submitted_download() {
    let config = DiscoConfig {
        max_concurrent_downloads: 2,
        ..manual_config()
    };
    let client = warm_client(config).await;
    let temp_dir = TempDir::new().unwrap();

    let downloads: Vec<_> = (0..5)
        .map(|i| {
            client
                .download_pkg_info(
                    &info(&format!("https://cdn.example.com/archive-{}.tar.gz", i)),
                    temp_dir.path().join(format!("archive-{}.tar.gz", i)),
                )
                .unwrap()
        })
        .collect();

    for download in downloads {
        let path = download.destination().to_path_buf();
        assert_eq!(download.wait().await.unwrap(), PAYLOAD.len() as u64);
        assert!(path.exists());
    }
    assert_eq!(client.downloads().available_slots(), 2);
}

#[test]
fn test_blocking_download() {
    let client = DiscoClient::with_fetcher(manual_config(), MockFetcher::with_fixtures()).unwrap();
    client.refresh_now().unwrap();
    let temp_dir = TempDir::new().unwrap();
    let dest = temp_dir.path().join("zulu17.tar.gz");

    let download = client.download_package("zulu-17.0.9", &dest).unwrap();
    assert_eq!(client.wait_download(download).unwrap(), PAYLOAD.len() as u64);
    assert_eq!(std::fs::read(&dest).unwrap(), PAYLOAD);
}
