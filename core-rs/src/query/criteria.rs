//! Package query parameters
//!
//! A `PackageQuery` names a version, a comparison mode, a latest-selection
//! policy and a constraint per filter axis. Empty lists and sentinel values
//! leave an axis unconstrained.

use serde::Serialize;

use crate::pkg::{
    Architecture, ArchiveType, Bitness, Comparison, Distribution, LibCType, Latest,
    OperatingSystem, PackageType, ReleaseStatus, Scope, TermOfSupport,
};
use crate::version::VersionNumber;

/// Multi-axis package query
///
/// # Example
///
/// ```
/// use disco_core::{Architecture, Distribution, Latest, OperatingSystem, PackageQuery, VersionNumber};
///
/// let query = PackageQuery::new()
///     .version(VersionNumber::new(17))
///     .latest(Latest::Overall)
///     .distribution(Distribution::Temurin)
///     .operating_system(OperatingSystem::Linux)
///     .architecture(Architecture::Amd64);
/// assert_eq!(query.distributions, vec![Distribution::Temurin]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageQuery {
    pub version: Option<VersionNumber>,
    pub comparison: Comparison,
    pub latest: Latest,
    pub distributions: Vec<Distribution>,
    pub architectures: Vec<Architecture>,
    pub archive_types: Vec<ArchiveType>,
    pub operating_systems: Vec<OperatingSystem>,
    pub lib_c_types: Vec<LibCType>,
    pub terms_of_support: Vec<TermOfSupport>,
    pub release_statuses: Vec<ReleaseStatus>,

    /// `PackageType::None` excludes records without a package type
    pub package_type: PackageType,

    /// `Bitness::None` excludes records without a bitness
    pub bitness: Bitness,

    pub javafx_bundled: Option<bool>,
    pub directly_downloadable: Option<bool>,

    /// Empty means `[Scope::Public]`
    pub scopes: Vec<Scope>,
}

impl Default for PackageQuery {
    fn default() -> Self {
        Self {
            version: None,
            comparison: Comparison::Equal,
            latest: Latest::None,
            distributions: Vec::new(),
            architectures: Vec::new(),
            archive_types: Vec::new(),
            operating_systems: Vec::new(),
            lib_c_types: Vec::new(),
            terms_of_support: Vec::new(),
            release_statuses: Vec::new(),
            package_type: PackageType::None,
            bitness: Bitness::None,
            javafx_bundled: None,
            directly_downloadable: None,
            scopes: vec![Scope::Public],
        }
    }
}

impl PackageQuery {
    /// Unconstrained query over public distributions
    pub fn new() -> Self {
        Self::default()
    }

    pub fn version(mut self, version: VersionNumber) -> Self {
        self.version = Some(version);
        self
    }

    pub fn comparison(mut self, comparison: Comparison) -> Self {
        self.comparison = comparison;
        self
    }

    pub fn latest(mut self, latest: Latest) -> Self {
        self.latest = latest;
        self
    }

    pub fn distribution(mut self, distribution: Distribution) -> Self {
        self.distributions.push(distribution);
        self
    }

    pub fn architecture(mut self, architecture: Architecture) -> Self {
        self.architectures.push(architecture);
        self
    }

    pub fn archive_type(mut self, archive_type: ArchiveType) -> Self {
        self.archive_types.push(archive_type);
        self
    }

    pub fn operating_system(mut self, operating_system: OperatingSystem) -> Self {
        self.operating_systems.push(operating_system);
        self
    }

    pub fn lib_c_type(mut self, lib_c_type: LibCType) -> Self {
        self.lib_c_types.push(lib_c_type);
        self
    }

    pub fn term_of_support(mut self, term: TermOfSupport) -> Self {
        self.terms_of_support.push(term);
        self
    }

    pub fn release_status(mut self, status: ReleaseStatus) -> Self {
        self.release_statuses.push(status);
        self
    }

    pub fn package_type(mut self, package_type: PackageType) -> Self {
        self.package_type = package_type;
        self
    }

    pub fn bitness(mut self, bitness: Bitness) -> Self {
        self.bitness = bitness;
        self
    }

    pub fn javafx_bundled(mut self, bundled: bool) -> Self {
        self.javafx_bundled = Some(bundled);
        self
    }

    pub fn directly_downloadable(mut self, downloadable: bool) -> Self {
        self.directly_downloadable = Some(downloadable);
        self
    }

    /// Replace the scope list
    pub fn scopes(mut self, scopes: Vec<Scope>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Requested feature number, if a version with a feature was given
    pub fn feature(&self) -> Option<u32> {
        self.version.and_then(|v| v.feature())
    }

    /// Scopes in effect (sentinels dropped, empty replaced by `Public`)
    pub fn effective_scopes(&self) -> Vec<Scope> {
        let scopes: Vec<Scope> = self
            .scopes
            .iter()
            .copied()
            .filter(|s| !s.is_sentinel())
            .collect();
        if scopes.is_empty() {
            vec![Scope::Public]
        } else {
            scopes
        }
    }

    /// Distributions in effect (sentinels dropped)
    pub fn effective_distributions(&self) -> Vec<Distribution> {
        self.distributions
            .iter()
            .copied()
            .filter(|d| !d.is_sentinel())
            .collect()
    }

    /// Query parameters for a server-side pre-filter
    ///
    /// Only the axis filters are sent. Version, comparison and latest policy
    /// are applied locally so that cold and warm answers agree.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        fn push_all<T: Copy>(
            params: &mut Vec<(&'static str, String)>,
            key: &'static str,
            values: &[T],
            api: impl Fn(T) -> Option<&'static str>,
        ) {
            for value in values {
                if let Some(text) = api(*value) {
                    params.push((key, text.to_string()));
                }
            }
        }

        let mut params = Vec::new();
        push_all(&mut params, "distro", &self.distributions, |d: Distribution| {
            (!d.is_sentinel()).then(|| d.api_str())
        });
        push_all(&mut params, "os", &self.operating_systems, |o: OperatingSystem| {
            (!o.is_sentinel()).then(|| o.api_str())
        });
        push_all(&mut params, "libc_type", &self.lib_c_types, |l: LibCType| {
            (!l.is_sentinel()).then(|| l.api_str())
        });
        push_all(&mut params, "architecture", &self.architectures, |a: Architecture| {
            (!a.is_sentinel()).then(|| a.api_str())
        });
        push_all(&mut params, "archive_type", &self.archive_types, |a: ArchiveType| {
            (!a.is_sentinel()).then(|| a.api_str())
        });
        push_all(&mut params, "term_of_support", &self.terms_of_support, |t: TermOfSupport| {
            (!t.is_sentinel()).then(|| t.api_str())
        });

        let statuses: Vec<ReleaseStatus> = self
            .release_statuses
            .iter()
            .copied()
            .filter(|s| !s.is_sentinel())
            .collect();
        if statuses.is_empty() {
            params.push(("release_status", ReleaseStatus::Ea.api_str().to_string()));
            params.push(("release_status", ReleaseStatus::Ga.api_str().to_string()));
        } else {
            push_all(&mut params, "release_status", &statuses, |s: ReleaseStatus| {
                Some(s.api_str())
            });
        }

        if !self.package_type.is_sentinel() {
            params.push(("package_type", self.package_type.api_str().to_string()));
        }
        if !self.bitness.is_sentinel() {
            params.push(("bitness", self.bitness.api_str().to_string()));
        }
        if let Some(bundled) = self.javafx_bundled {
            params.push(("javafx_bundled", bundled.to_string()));
        }
        if let Some(downloadable) = self.directly_downloadable {
            params.push(("directly_downloadable", downloadable.to_string()));
        }
        for scope in self.effective_scopes() {
            params.push(("discovery_scope_id", scope.api_str().to_string()));
        }
        params
    }
}
