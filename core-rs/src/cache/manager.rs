//! Cache manager: the single writer of the catalog snapshot
//!
//! Lifecycle:
//!
//! ```text
//!   Cold ──tick──► Warming ──ok──► Ready ──tick──► Warming ...
//!                     │
//!                     └──err──► Failed ──tick──► Warming ...
//! ```
//!
//! A refresh builds the new snapshot off to the side and publishes it with one
//! atomic swap. The previous snapshot stays readable until then, and after a
//! failed refresh it stays readable indefinitely.

use arc_swap::{ArcSwap, ArcSwapOption};
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::snapshot::CatalogSnapshot;
use crate::drivers::{Endpoints, Fetcher};
use crate::errors::{DiscoError, Result};
use crate::events::{Event, EventBus};
use crate::pkg::decode;
use crate::pkg::MajorVersion;

/// Catalog refreshes between two fetches of the major-version list
const MAJOR_VERSIONS_EVERY: usize = 12;

/// Lifecycle state of the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    /// Nothing published yet
    Cold = 0,
    /// A refresh is in flight
    Warming = 1,
    /// The last refresh published a snapshot
    Ready = 2,
    /// The last refresh failed
    Failed = 3,
}

impl CacheState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => CacheState::Warming,
            2 => CacheState::Ready,
            3 => CacheState::Failed,
            _ => CacheState::Cold,
        }
    }
}

/// Result of one refresh attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A snapshot with this many records was published
    Published(usize),
    /// Another refresh was already in flight
    Skipped,
}

/// Clears the in-flight flag when the refresh ends, however it ends
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Owner of the published catalog snapshot
pub struct CacheManager {
    fetcher: Arc<dyn Fetcher>,
    endpoints: Endpoints,
    events: EventBus,
    snapshot: ArcSwapOption<CatalogSnapshot>,
    major_versions: ArcSwap<Vec<MajorVersion>>,
    state: AtomicU8,
    refreshing: AtomicBool,
    refreshes: AtomicUsize,
    refresh_task: Mutex<Option<JoinHandle<()>>>,
}

impl std::fmt::Debug for CacheManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheManager")
            .field("state", &self.state())
            .field("endpoints", &self.endpoints)
            .finish()
    }
}

impl CacheManager {
    pub fn new(fetcher: Arc<dyn Fetcher>, endpoints: Endpoints, events: EventBus) -> Self {
        Self {
            fetcher,
            endpoints,
            events,
            snapshot: ArcSwapOption::empty(),
            major_versions: ArcSwap::from_pointee(Vec::new()),
            state: AtomicU8::new(CacheState::Cold as u8),
            refreshing: AtomicBool::new(false),
            refreshes: AtomicUsize::new(0),
            refresh_task: Mutex::new(None),
        }
    }

    pub fn state(&self) -> CacheState {
        CacheState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn set_state(&self, state: CacheState) {
        self.state.store(state as u8, Ordering::Release);
    }

    /// True when the last refresh published a snapshot and none is in flight
    pub fn is_ready(&self) -> bool {
        self.state() == CacheState::Ready
    }

    /// Latest published snapshot, `None` while cold
    ///
    /// Stays available while a refresh is in flight and after a failed one.
    pub fn snapshot(&self) -> Option<Arc<CatalogSnapshot>> {
        self.snapshot.load_full()
    }

    /// Cached major versions in API order (early access included)
    pub fn major_versions(&self) -> Arc<Vec<MajorVersion>> {
        self.major_versions.load_full()
    }

    /// Fetch the major-version list (early access included) and cache it
    ///
    /// An empty answer leaves the cached list untouched.
    pub async fn refresh_major_versions(&self) -> Result<usize> {
        let url = self.endpoints.major_versions(&[("ea", "true".to_string())])?;
        let body = self.fetcher.fetch(&url).await?;
        let versions = decode::decode_major_versions(&body);
        if versions.is_empty() {
            debug!("Major version list was empty, keeping {} cached entries", self.major_versions.load().len());
            return Ok(0);
        }
        let count = versions.len();
        self.major_versions.store(Arc::new(versions));
        info!("Cached {} major versions", count);
        Ok(count)
    }

    /// Run one full-catalog refresh
    ///
    /// Skipped (not queued) when another refresh is already in flight.
    pub async fn refresh(&self) -> Result<RefreshOutcome> {
        if self
            .refreshing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("Catalog refresh already in flight, skipping");
            return Ok(RefreshOutcome::Skipped);
        }
        let _in_flight = InFlight(&self.refreshing);

        self.set_state(CacheState::Warming);
        self.events.announce(&Event::CacheUpdating);

        match self.build_snapshot().await {
            Ok(snapshot) => {
                let count = snapshot.len();
                self.snapshot.store(Some(Arc::new(snapshot)));
                self.set_state(CacheState::Ready);
                info!("Catalog snapshot published with {} packages", count);
                self.events.announce(&Event::CacheReady { packages: count });
                Ok(RefreshOutcome::Published(count))
            }
            Err(e) => {
                self.set_state(CacheState::Failed);
                warn!("Catalog refresh failed: {}", e);
                self.events.announce(&Event::CacheRefreshFailed {
                    reason: e.to_string(),
                });
                Err(e)
            }
        }
    }

    async fn build_snapshot(&self) -> Result<CatalogSnapshot> {
        let url = self.endpoints.all_packages()?;
        let body = self.fetcher.fetch(&url).await?;
        let packages = decode::decode_packages(&body);
        if packages.is_empty() {
            return Err(DiscoError::Decode(format!(
                "catalog at {} decoded to no packages",
                url
            )));
        }

        let attempt = self.refreshes.fetch_add(1, Ordering::Relaxed);
        let stale = attempt > 0 && attempt % MAJOR_VERSIONS_EVERY == 0;
        if stale || self.major_versions.load().is_empty() {
            if let Err(e) = self.refresh_major_versions().await {
                warn!("Major versions unavailable for snapshot: {}", e);
            }
        }

        Ok(CatalogSnapshot::build(
            packages,
            self.major_versions.load_full().as_ref().clone(),
        ))
    }

    /// Start the scheduled refresh on the given runtime
    ///
    /// Fetches the major versions immediately, then refreshes the catalog after
    /// `initial_delay` and every `period` thereafter. Missed ticks are skipped.
    /// Calling `start` again replaces the previous schedule.
    pub fn start(self: &Arc<Self>, handle: &Handle, initial_delay: Duration, period: Duration) {
        let manager = Arc::clone(self);
        let task = handle.spawn(async move {
            if let Err(e) = manager.refresh_major_versions().await {
                warn!("Initial major version fetch failed: {}", e);
            }

            let mut ticker = interval_at(Instant::now() + initial_delay, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                if let Err(e) = manager.refresh().await {
                    debug!("Scheduled refresh failed, retrying in {:?}: {}", period, e);
                }
            }
        });

        let mut slot = self.refresh_task.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = slot.replace(task) {
            previous.abort();
        }
        debug!(
            "Catalog refresh scheduled: first in {:?}, then every {:?}",
            initial_delay, period
        );
    }

    /// Stop the scheduled refresh; the published snapshot stays readable
    pub fn shutdown(&self) {
        let mut slot = self.refresh_task.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(task) = slot.take() {
            task.abort();
            debug!("Catalog refresh schedule stopped");
        }
    }

    /// True while a refresh schedule is installed
    pub fn is_scheduled(&self) -> bool {
        let slot = self.refresh_task.lock().unwrap_or_else(PoisonError::into_inner);
        slot.as_ref().map_or(false, |task| !task.is_finished())
    }
}
