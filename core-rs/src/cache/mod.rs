//! Cache module for the discovery catalog
//!
//! Keeps the latest catalog snapshot in memory and refreshes it on a schedule.
//! Nothing is persisted; every process starts cold.

mod snapshot;
mod manager;

pub use snapshot::CatalogSnapshot;
pub use manager::{CacheManager, CacheState, RefreshOutcome};
