//! Selection and ordering of packages
//!
//! `select` is a pure function of a record set, the known feature-line range
//! and a query. The cache and the cold path feed it different record sets and
//! get identical semantics.
//!
//! ```text
//! records ──► FilterSet ──► Equal:  latest policy (Overall / PerDistribution / PerVersion / partial match)
//!                      └──► range:  lower/upper bound check
//!                                  └──► sort (distribution desc, version desc, id asc)
//! ```

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use crate::pkg::scope;
use crate::pkg::{Comparison, Distribution, Latest, MajorVersion, Package};
use crate::version::VersionNumber;

use super::criteria::PackageQuery;
use super::filter::FilterSet;

/// Lower feature bound used when no major versions are known
pub const FALLBACK_LOWEST_FEATURE: u32 = 6;

/// Feature lines known to the catalog, used by range comparisons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureRange {
    pub lowest: u32,

    /// `None` leaves ranges open at the top
    pub highest: Option<u32>,
}

impl Default for FeatureRange {
    fn default() -> Self {
        Self {
            lowest: FALLBACK_LOWEST_FEATURE,
            highest: None,
        }
    }
}

impl FeatureRange {
    pub fn from_major_versions(major_versions: &[MajorVersion]) -> Self {
        let lowest = major_versions.iter().map(|mv| mv.feature).min();
        let highest = major_versions.iter().map(|mv| mv.feature).max();
        Self {
            lowest: lowest.unwrap_or(FALLBACK_LOWEST_FEATURE),
            highest,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Bound {
    /// Whole feature line, inclusive
    FeatureLine(u32),
    Version { version: VersionNumber, inclusive: bool },
    Open,
}

impl Bound {
    fn admits_from_below(&self, v: &VersionNumber) -> bool {
        match self {
            Bound::FeatureLine(feature) => v.components()[0] >= *feature,
            Bound::Version { version, inclusive } => match v.cmp(version) {
                Ordering::Greater => true,
                Ordering::Equal => *inclusive,
                Ordering::Less => false,
            },
            Bound::Open => true,
        }
    }

    fn admits_from_above(&self, v: &VersionNumber) -> bool {
        match self {
            Bound::FeatureLine(feature) => v.components()[0] <= *feature,
            Bound::Version { version, inclusive } => match v.cmp(version) {
                Ordering::Less => true,
                Ordering::Equal => *inclusive,
                Ordering::Greater => false,
            },
            Bound::Open => true,
        }
    }
}

fn range_bounds(query: &PackageQuery, range: FeatureRange) -> (Bound, Bound) {
    let lowest = Bound::FeatureLine(range.lowest);
    let highest = range.highest.map(Bound::FeatureLine).unwrap_or(Bound::Open);
    let at = |inclusive: bool, fallback: Bound| {
        query
            .version
            .map(|version| Bound::Version { version, inclusive })
            .unwrap_or(fallback)
    };

    match query.comparison {
        Comparison::LessThan => (lowest, at(false, highest)),
        Comparison::LessThanOrEqual => (lowest, at(true, highest)),
        Comparison::GreaterThan => (at(false, lowest), highest),
        Comparison::GreaterThanOrEqual => (at(true, lowest), highest),
        Comparison::Equal => (at(true, lowest), at(true, highest)),
        Comparison::None | Comparison::NotFound => (lowest, highest),
    }
}

/// Ordering of every result list
///
/// Distribution api name descending, then version descending; the id breaks
/// remaining ties so results are reproducible.
pub fn compare_packages(a: &Package, b: &Package) -> Ordering {
    b.distribution_name()
        .cmp(a.distribution_name())
        .then_with(|| b.version_number.cmp(&a.version_number))
        .then_with(|| a.id.cmp(&b.id))
}

pub fn sort_packages(packages: &mut [Arc<Package>]) {
    packages.sort_by(|a, b| compare_packages(a, b));
}

fn max_version<'a, I>(candidates: I) -> Option<VersionNumber>
where
    I: Iterator<Item = &'a Arc<Package>>,
{
    candidates.map(|p| p.version_number).max()
}

fn select_overall(
    candidates: Vec<Arc<Package>>,
    query: &PackageQuery,
    filters: &FilterSet,
) -> Vec<Arc<Package>> {
    let max = match query.feature() {
        Some(feature) => max_version(candidates.iter().filter(|p| p.feature() == feature)),
        None => max_version(candidates.iter().filter(|p| {
            filters.distributions_constrained() || !p.distribution.is_excluded_from_overall_latest()
        })),
    };

    let Some(target) = max.or(query.version) else {
        return Vec::new();
    };
    debug!("Overall latest resolved to {}", target);

    candidates
        .into_iter()
        .filter(|p| p.version_number == target)
        .collect()
}

fn select_per_distribution(candidates: Vec<Arc<Package>>, query: &PackageQuery) -> Vec<Arc<Package>> {
    let requested = query.effective_distributions();
    let wanted: Vec<Distribution> = if requested.is_empty() {
        scope::distributions_in_scopes(&query.effective_scopes())
    } else {
        requested
    };

    let mut by_distribution: BTreeMap<Distribution, Vec<Arc<Package>>> = BTreeMap::new();
    for pkg in candidates {
        if wanted.contains(&pkg.distribution) {
            by_distribution.entry(pkg.distribution).or_default().push(pkg);
        }
    }

    let mut selected = Vec::new();
    for (distribution, pkgs) in by_distribution {
        let Some(max) = max_version(pkgs.iter()) else {
            continue;
        };
        debug!("Latest {} is {}", distribution, max);
        selected.extend(pkgs.into_iter().filter(|p| p.version_number == max));
    }
    selected
}

fn select_per_version(candidates: Vec<Arc<Package>>, query: &PackageQuery) -> Vec<Arc<Package>> {
    let feature = query.feature();
    candidates
        .into_iter()
        .filter(|p| p.latest_build_available)
        .filter(|p| feature.map_or(true, |f| p.feature() == f))
        .collect()
}

fn select_partial(candidates: Vec<Arc<Package>>, query: &PackageQuery) -> Vec<Arc<Package>> {
    match query.version {
        Some(requested) => candidates
            .into_iter()
            .filter(|p| p.version_number.matches_partial(&requested))
            .collect(),
        None => candidates,
    }
}

fn select_range(
    candidates: Vec<Arc<Package>>,
    query: &PackageQuery,
    range: FeatureRange,
) -> Vec<Arc<Package>> {
    let (lower, upper) = range_bounds(query, range);
    candidates
        .into_iter()
        .filter(|p| lower.admits_from_below(&p.version_number))
        .filter(|p| upper.admits_from_above(&p.version_number))
        .collect()
}

/// Select and order the packages matching a query
///
/// # Arguments
///
/// * `packages` - Record set to select from (snapshot or cold fetch)
/// * `range` - Known feature lines, bounds for range comparisons
/// * `query` - Axis filters, version, comparison and latest policy
pub fn select<'a, I>(packages: I, range: FeatureRange, query: &PackageQuery) -> Vec<Arc<Package>>
where
    I: IntoIterator<Item = &'a Arc<Package>>,
{
    let filters = FilterSet::from_query(query);
    let candidates: Vec<Arc<Package>> = packages
        .into_iter()
        .filter(|p| filters.matches(p))
        .cloned()
        .collect();

    let mut selected = match query.comparison {
        Comparison::Equal => match query.latest {
            Latest::Overall => select_overall(candidates, query, &filters),
            Latest::PerDistribution => select_per_distribution(candidates, query),
            Latest::PerVersion => select_per_version(candidates, query),
            Latest::None | Latest::NotFound => select_partial(candidates, query),
        },
        _ => select_range(candidates, query, range),
    };

    sort_packages(&mut selected);
    debug!(
        "Query {:?}/{:?} selected {} packages",
        query.comparison,
        query.latest,
        selected.len()
    );
    selected
}
