//! Axis predicates shared by every selection policy
//!
//! A `FilterSet` is built once per query and applied to each candidate.
//! Axes left unconstrained contribute no predicate at all.

use crate::pkg::scope;
use crate::pkg::{
    Architecture, ArchiveType, Bitness, Distribution, LibCType, OperatingSystem, Package,
    PackageType, ReleaseStatus, Scope, TermOfSupport,
};

use super::criteria::PackageQuery;

/// One predicate over a single record attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AxisFilter {
    Distributions(Vec<Distribution>),
    Scopes(Vec<Scope>),
    Architectures(Vec<Architecture>),
    ArchiveTypes(Vec<ArchiveType>),
    OperatingSystems(Vec<OperatingSystem>),
    LibCTypes(Vec<LibCType>),
    TermsOfSupport(Vec<TermOfSupport>),
    ReleaseStatuses(Vec<ReleaseStatus>),

    /// A sentinel here excludes records whose package type is `None`
    PackageType(PackageType),

    /// A sentinel here excludes records whose bitness is `None`
    Bitness(Bitness),

    JavaFxBundled(bool),
    DirectlyDownloadable(bool),
}

impl AxisFilter {
    pub fn matches(&self, pkg: &Package) -> bool {
        match self {
            AxisFilter::Distributions(set) => set.contains(&pkg.distribution),
            AxisFilter::Scopes(scopes) => scope::in_any_scope(pkg.distribution, scopes),
            AxisFilter::Architectures(set) => set.contains(&pkg.architecture),
            AxisFilter::ArchiveTypes(set) => set.contains(&pkg.archive_type),
            AxisFilter::OperatingSystems(set) => set.contains(&pkg.operating_system),
            AxisFilter::LibCTypes(set) => set.contains(&pkg.lib_c_type),
            AxisFilter::TermsOfSupport(set) => set.contains(&pkg.term_of_support),
            AxisFilter::ReleaseStatuses(set) => set.contains(&pkg.release_status),
            AxisFilter::PackageType(wanted) => {
                if wanted.is_sentinel() {
                    pkg.package_type != PackageType::None
                } else {
                    pkg.package_type == *wanted
                }
            }
            AxisFilter::Bitness(wanted) => {
                if wanted.is_sentinel() {
                    pkg.bitness != Bitness::None
                } else {
                    pkg.bitness == *wanted
                }
            }
            AxisFilter::JavaFxBundled(wanted) => pkg.javafx_bundled == *wanted,
            AxisFilter::DirectlyDownloadable(wanted) => pkg.directly_downloadable == *wanted,
        }
    }
}

fn known<T: Copy>(values: &[T], is_sentinel: impl Fn(&T) -> bool) -> Vec<T> {
    values.iter().copied().filter(|v| !is_sentinel(v)).collect()
}

/// Conjunction of axis predicates derived from a query
#[derive(Debug, Clone, Default)]
pub struct FilterSet {
    filters: Vec<AxisFilter>,
    distributions_constrained: bool,
}

impl FilterSet {
    pub fn from_query(query: &PackageQuery) -> Self {
        let mut filters = Vec::new();

        let distributions = query.effective_distributions();
        let distributions_constrained = !distributions.is_empty();
        if distributions_constrained {
            filters.push(AxisFilter::Distributions(distributions));
        }

        filters.push(AxisFilter::Scopes(query.effective_scopes()));

        let architectures = known(&query.architectures, Architecture::is_sentinel);
        if !architectures.is_empty() {
            filters.push(AxisFilter::Architectures(architectures));
        }
        let archive_types = known(&query.archive_types, ArchiveType::is_sentinel);
        if !archive_types.is_empty() {
            filters.push(AxisFilter::ArchiveTypes(archive_types));
        }
        let operating_systems = known(&query.operating_systems, OperatingSystem::is_sentinel);
        if !operating_systems.is_empty() {
            filters.push(AxisFilter::OperatingSystems(operating_systems));
        }
        let lib_c_types = known(&query.lib_c_types, LibCType::is_sentinel);
        if !lib_c_types.is_empty() {
            filters.push(AxisFilter::LibCTypes(lib_c_types));
        }
        let terms = known(&query.terms_of_support, TermOfSupport::is_sentinel);
        if !terms.is_empty() {
            filters.push(AxisFilter::TermsOfSupport(terms));
        }
        let statuses = known(&query.release_statuses, ReleaseStatus::is_sentinel);
        if !statuses.is_empty() {
            filters.push(AxisFilter::ReleaseStatuses(statuses));
        }

        filters.push(AxisFilter::PackageType(query.package_type));
        filters.push(AxisFilter::Bitness(query.bitness));

        if let Some(bundled) = query.javafx_bundled {
            filters.push(AxisFilter::JavaFxBundled(bundled));
        }
        if let Some(downloadable) = query.directly_downloadable {
            filters.push(AxisFilter::DirectlyDownloadable(downloadable));
        }

        Self {
            filters,
            distributions_constrained,
        }
    }

    /// True when the record passes every predicate
    pub fn matches(&self, pkg: &Package) -> bool {
        self.filters.iter().all(|f| f.matches(pkg))
    }

    /// True when the query named at least one known distribution
    pub fn distributions_constrained(&self) -> bool {
        self.distributions_constrained
    }
}
