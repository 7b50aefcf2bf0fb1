//! Query and ranking engine
//!
//! Provides:
//! - PackageQuery: multi-axis query builder
//! - FilterSet / AxisFilter: predicates built once per query
//! - engine::select: latest-selection policies, range comparisons and ordering

mod criteria;
mod filter;
pub mod engine;

pub use criteria::PackageQuery;
pub use filter::{AxisFilter, FilterSet};
pub use engine::{compare_packages, select, FeatureRange, FALLBACK_LOWEST_FEATURE};
