//! Event fan-out for cache and download notifications
//!
//! Observers register for one event kind or for `EventFilter::Any`. An
//! announced event reaches the observers of its kind first, then the `Any`
//! group. Observers run on the announcing task and must not block.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;
use uuid::Uuid;

/// Kind of an event, the key observers register under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    CacheUpdating,
    CacheReady,
    CacheRefreshFailed,
    DownloadStarted,
    DownloadProgress,
    DownloadFinished,
    DownloadFailed,
}

/// Notification emitted by the cache manager or a download
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A refresh started
    CacheUpdating,

    /// A new snapshot was published
    CacheReady { packages: usize },

    /// A refresh failed; the previous snapshot is still served
    CacheRefreshFailed { reason: String },

    DownloadStarted {
        id: Uuid,
        url: String,
        size: Option<u64>,
    },

    DownloadProgress {
        id: Uuid,
        bytes_read: u64,
        size: Option<u64>,
    },

    DownloadFinished {
        id: Uuid,
        path: PathBuf,
        bytes: u64,
    },

    DownloadFailed { id: Uuid, reason: String },
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::CacheUpdating => EventKind::CacheUpdating,
            Event::CacheReady { .. } => EventKind::CacheReady,
            Event::CacheRefreshFailed { .. } => EventKind::CacheRefreshFailed,
            Event::DownloadStarted { .. } => EventKind::DownloadStarted,
            Event::DownloadProgress { .. } => EventKind::DownloadProgress,
            Event::DownloadFinished { .. } => EventKind::DownloadFinished,
            Event::DownloadFailed { .. } => EventKind::DownloadFailed,
        }
    }
}

/// Which events an observer receives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventFilter {
    Any,
    Kind(EventKind),
}

impl From<EventKind> for EventFilter {
    fn from(kind: EventKind) -> Self {
        EventFilter::Kind(kind)
    }
}

/// Handle returned by `subscribe`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

pub type Observer = Arc<dyn Fn(&Event) + Send + Sync>;

#[derive(Default)]
struct Registry {
    observers: HashMap<EventFilter, Vec<(ObserverId, Observer)>>,
}

/// Shared event bus
///
/// Cloning yields another handle to the same observer registry.
#[derive(Clone, Default)]
pub struct EventBus {
    registry: Arc<RwLock<Registry>>,
    next_id: Arc<AtomicU64>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("observers", &self.observer_count())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer
    ///
    /// # Example
    ///
    /// ```
    /// use disco_core::{Event, EventBus, EventFilter, EventKind};
    /// use std::sync::atomic::{AtomicUsize, Ordering};
    /// use std::sync::Arc;
    ///
    /// let bus = EventBus::new();
    /// let seen = Arc::new(AtomicUsize::new(0));
    /// let counter = seen.clone();
    /// bus.subscribe(EventKind::CacheReady, move |_| {
    ///     counter.fetch_add(1, Ordering::SeqCst);
    /// });
    ///
    /// bus.announce(&Event::CacheReady { packages: 3 });
    /// assert_eq!(seen.load(Ordering::SeqCst), 1);
    /// ```
    pub fn subscribe<F>(&self, filter: impl Into<EventFilter>, observer: F) -> ObserverId
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        let id = ObserverId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut registry = self.registry.write().unwrap_or_else(PoisonError::into_inner);
        registry
            .observers
            .entry(filter.into())
            .or_default()
            .push((id, Arc::new(observer)));
        id
    }

    /// Remove one observer; returns false when it was not registered
    pub fn unsubscribe(&self, id: ObserverId) -> bool {
        let mut registry = self.registry.write().unwrap_or_else(PoisonError::into_inner);
        let mut removed = false;
        for observers in registry.observers.values_mut() {
            let before = observers.len();
            observers.retain(|(existing, _)| *existing != id);
            removed |= observers.len() != before;
        }
        removed
    }

    /// Remove every observer
    pub fn clear(&self) {
        let mut registry = self.registry.write().unwrap_or_else(PoisonError::into_inner);
        registry.observers.clear();
    }

    pub fn observer_count(&self) -> usize {
        let registry = self.registry.read().unwrap_or_else(PoisonError::into_inner);
        registry.observers.values().map(Vec::len).sum()
    }

    /// Deliver an event to the observers of its kind, then to the `Any` group
    pub fn announce(&self, event: &Event) {
        let targets: Vec<Observer> = {
            let registry = self.registry.read().unwrap_or_else(PoisonError::into_inner);
            [EventFilter::Kind(event.kind()), EventFilter::Any]
                .iter()
                .filter_map(|filter| registry.observers.get(filter))
                .flat_map(|observers| observers.iter().map(|(_, o)| o.clone()))
                .collect()
        };

        if !targets.is_empty() {
            debug!("Announcing {:?} to {} observers", event.kind(), targets.len());
        }
        for observer in targets {
            observer(event);
        }
    }
}
