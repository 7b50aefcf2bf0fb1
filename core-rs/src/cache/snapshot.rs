//! Immutable catalog snapshot
//!
//! A snapshot is built off to the side from one full-catalog fetch and then
//! published whole. Readers holding an `Arc<CatalogSnapshot>` keep a
//! consistent view no matter how many refreshes happen afterwards.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::pkg::{MajorVersion, Package};
use crate::query::FeatureRange;

/// Packages keyed by id plus the major-version list, frozen at build time
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    packages: HashMap<String, Arc<Package>>,
    major_versions: Vec<MajorVersion>,
    built_at: DateTime<Utc>,
}

impl CatalogSnapshot {
    /// Build a snapshot from decoded records
    ///
    /// Identical records collapse into one. When two different records share
    /// an id, the later one wins and the conflict is logged.
    pub fn build(packages: Vec<Package>, major_versions: Vec<MajorVersion>) -> Self {
        let total = packages.len();
        let mut by_id: HashMap<String, Arc<Package>> = HashMap::with_capacity(total);
        let mut duplicates = 0usize;

        for pkg in packages {
            let identical = by_id.get(&pkg.id).map(|existing| **existing == pkg);
            match identical {
                Some(true) => {
                    duplicates += 1;
                }
                Some(false) => {
                    warn!("Package id {} reported with conflicting content", pkg.id);
                    by_id.insert(pkg.id.clone(), Arc::new(pkg));
                }
                None => {
                    by_id.insert(pkg.id.clone(), Arc::new(pkg));
                }
            }
        }

        debug!(
            "Built snapshot: {} records, {} duplicates dropped, {} major versions",
            by_id.len(),
            duplicates,
            major_versions.len()
        );

        Self {
            packages: by_id,
            major_versions,
            built_at: Utc::now(),
        }
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Package by id
    pub fn get(&self, id: &str) -> Option<Arc<Package>> {
        self.packages.get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.packages.contains_key(id)
    }

    /// All packages, in no particular order
    pub fn packages(&self) -> impl Iterator<Item = &Arc<Package>> {
        self.packages.values()
    }

    /// Major versions in API order
    pub fn major_versions(&self) -> &[MajorVersion] {
        &self.major_versions
    }

    /// Known feature lines, bounds for range queries
    pub fn feature_range(&self) -> FeatureRange {
        FeatureRange::from_major_versions(&self.major_versions)
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }
}
