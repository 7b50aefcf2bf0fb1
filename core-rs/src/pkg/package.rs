//! Package records
//!
//! A `Package` describes one downloadable JDK/JRE artifact as reported by the
//! discovery API. Records are created by decoding, never mutated afterwards, and
//! shared between snapshots and query results behind `Arc`.

use serde::{Deserialize, Serialize};

use super::types::{
    Architecture, ArchiveType, Bitness, Distribution, LibCType, OperatingSystem, PackageType,
    ReleaseStatus, TermOfSupport,
};
use crate::version::VersionNumber;

/// One installable artifact
///
/// Equality and hashing cover the whole record, so two byte-identical
/// entries from the remote catalog collapse into one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Package {
    /// Catalog-unique identifier
    pub id: String,

    pub distribution: Distribution,

    /// Version string as published (e.g. `17.0.2+8`)
    pub java_version: String,

    /// Parsed form of `java_version`
    pub version_number: VersionNumber,

    pub distribution_version: String,
    pub operating_system: OperatingSystem,
    pub architecture: Architecture,
    pub lib_c_type: LibCType,

    /// Derived from `architecture`
    pub bitness: Bitness,

    pub archive_type: ArchiveType,
    pub package_type: PackageType,
    pub term_of_support: TermOfSupport,
    pub release_status: ReleaseStatus,
    pub javafx_bundled: bool,
    pub directly_downloadable: bool,
    pub latest_build_available: bool,
    pub free_use_in_production: bool,
    pub filename: String,
    pub size: u64,

    /// Short-lived id used to resolve the download link
    pub ephemeral_id: String,
}

impl Package {
    /// Create a record with the given identity and every other field defaulted
    ///
    /// Release status is derived from the version string.
    ///
    /// # Example
    ///
    /// ```
    /// use disco_core::{Distribution, Package};
    ///
    /// let pkg = Package::new("abc", Distribution::Zulu, "17.0.2+8").unwrap();
    /// assert_eq!(pkg.version_number.feature(), Some(17));
    /// ```
    pub fn new(
        id: impl Into<String>,
        distribution: Distribution,
        java_version: impl Into<String>,
    ) -> crate::errors::Result<Self> {
        let java_version = java_version.into();
        let version_number = VersionNumber::parse(&java_version)?;
        let release_status = ReleaseStatus::from_java_version(&java_version);

        Ok(Self {
            id: id.into(),
            distribution,
            java_version,
            version_number,
            distribution_version: String::new(),
            operating_system: OperatingSystem::None,
            architecture: Architecture::None,
            lib_c_type: LibCType::None,
            bitness: Bitness::None,
            archive_type: ArchiveType::None,
            package_type: PackageType::None,
            term_of_support: TermOfSupport::None,
            release_status,
            javafx_bundled: false,
            directly_downloadable: false,
            latest_build_available: false,
            free_use_in_production: false,
            filename: String::new(),
            size: 0,
            ephemeral_id: String::new(),
        })
    }

    /// Set the architecture together with the bitness it implies
    pub fn with_architecture(mut self, architecture: Architecture) -> Self {
        self.architecture = architecture;
        self.bitness = architecture.bitness();
        self
    }

    /// API name of the distribution, used as the primary sort key
    pub fn distribution_name(&self) -> &'static str {
        self.distribution.api_str()
    }

    /// Feature number of the version (absent reads as 0)
    pub fn feature(&self) -> u32 {
        self.version_number.components()[0]
    }
}

/// Download details resolved from an ephemeral id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PkgInfo {
    pub filename: String,

    /// Version string the caller resolved this for
    #[serde(default)]
    pub java_version: String,

    pub direct_download_uri: String,

    #[serde(default)]
    pub download_site_uri: String,
}

/// Versions published by one distribution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistributionVersions {
    pub distribution: Distribution,
    pub versions: Vec<VersionNumber>,
}
