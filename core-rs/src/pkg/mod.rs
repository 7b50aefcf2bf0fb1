//! Catalog records
//!
//! Provides the typed records of the discovery catalog:
//! - Package: one downloadable artifact
//! - MajorVersion: one feature line with its support term
//! - PkgInfo: resolved download links for an ephemeral id
//! - Enumerations for every filter axis, plus the scope table
//! - Fail-closed JSON decoding

mod types;
mod package;
mod major_version;
pub mod scope;
pub mod decode;

pub use types::{
    Architecture, ArchiveType, Bitness, Comparison, Distribution, LibCType, Latest,
    OperatingSystem, PackageType, ReleaseStatus, Scope, TermOfSupport,
};
pub use package::{DistributionVersions, Package, PkgInfo};
pub use major_version::MajorVersion;
