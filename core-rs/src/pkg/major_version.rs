//! Major version (feature line) records

use serde::Serialize;

use super::types::{ReleaseStatus, TermOfSupport};
use crate::version::VersionNumber;

/// One Java feature line, e.g. `17`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MajorVersion {
    /// Feature number, the identity of the record
    pub feature: u32,
    pub term_of_support: TermOfSupport,
    pub maintained: bool,
    pub early_access_only: bool,
    pub release_status: ReleaseStatus,

    /// Versions published on this line, in the order the API lists them
    pub versions: Vec<VersionNumber>,
}

impl MajorVersion {
    pub fn new(feature: u32, term_of_support: TermOfSupport) -> Self {
        Self {
            feature,
            term_of_support,
            maintained: false,
            early_access_only: false,
            release_status: ReleaseStatus::Ga,
            versions: Vec::new(),
        }
    }

    /// Highest published version on this line
    pub fn latest_version(&self) -> Option<VersionNumber> {
        self.versions.iter().max().copied()
    }

    /// True when the line has something to offer under the given EA policy
    ///
    /// With early access included any listed version counts. Without it the
    /// line needs more than one version, so a freshly branched line that only
    /// lists its first build is passed over.
    pub fn has_builds(&self, include_ea: bool) -> bool {
        if include_ea {
            !self.versions.is_empty()
        } else {
            self.versions.len() > 1
        }
    }
}
