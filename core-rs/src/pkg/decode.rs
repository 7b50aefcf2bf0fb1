//! Decoding of discovery API bodies into typed records
//!
//! Decoding fails closed: invalid JSON or a root of the wrong shape gives an
//! empty list (or `None`), and malformed array elements are skipped. Nothing
//! here returns an error to the caller.

use serde::Deserialize;
use serde_json::Value as JsonValue;
use tracing::debug;

use super::major_version::MajorVersion;
use super::package::{DistributionVersions, Package, PkgInfo};
use super::types::{
    Architecture, ArchiveType, Distribution, LibCType, OperatingSystem, PackageType,
    ReleaseStatus, TermOfSupport,
};
use crate::version::VersionNumber;

/// Treats an explicit `null` like a missing key
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PackageJson {
    #[serde(deserialize_with = "null_as_default")]
    id: String,
    distribution: Distribution,
    #[serde(deserialize_with = "null_as_default")]
    java_version: String,
    #[serde(deserialize_with = "null_as_default")]
    distribution_version: String,
    operating_system: OperatingSystem,
    architecture: Architecture,
    lib_c_type: LibCType,
    archive_type: ArchiveType,
    package_type: PackageType,
    term_of_support: TermOfSupport,
    release_status: ReleaseStatus,
    #[serde(deserialize_with = "null_as_default")]
    javafx_bundled: bool,
    #[serde(deserialize_with = "null_as_default")]
    directly_downloadable: bool,
    #[serde(deserialize_with = "null_as_default")]
    latest_build_available: bool,
    #[serde(deserialize_with = "null_as_default")]
    free_use_in_production: bool,
    #[serde(deserialize_with = "null_as_default")]
    filename: String,
    #[serde(deserialize_with = "null_as_default")]
    size: u64,
    #[serde(deserialize_with = "null_as_default")]
    ephemeral_id: String,
}

impl PackageJson {
    fn into_package(self) -> Option<Package> {
        if self.id.is_empty() {
            return None;
        }
        let version_number = VersionNumber::parse(&self.java_version).ok()?;
        let release_status = if self.release_status.is_sentinel() {
            ReleaseStatus::from_java_version(&self.java_version)
        } else {
            self.release_status
        };

        Some(Package {
            id: self.id,
            distribution: self.distribution,
            java_version: self.java_version,
            version_number,
            distribution_version: self.distribution_version,
            operating_system: self.operating_system,
            architecture: self.architecture,
            lib_c_type: self.lib_c_type,
            bitness: self.architecture.bitness(),
            archive_type: self.archive_type,
            package_type: self.package_type,
            term_of_support: self.term_of_support,
            release_status,
            javafx_bundled: self.javafx_bundled,
            directly_downloadable: self.directly_downloadable,
            latest_build_available: self.latest_build_available,
            free_use_in_production: self.free_use_in_production,
            filename: self.filename,
            size: self.size,
            ephemeral_id: self.ephemeral_id,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MajorVersionJson {
    major_version: Option<u32>,
    term_of_support: TermOfSupport,
    #[serde(deserialize_with = "null_as_default")]
    maintained: bool,
    #[serde(deserialize_with = "null_as_default")]
    early_access_only: bool,
    release_status: ReleaseStatus,
    #[serde(deserialize_with = "null_as_default")]
    versions: Vec<String>,
}

impl MajorVersionJson {
    fn into_major_version(self) -> Option<MajorVersion> {
        let feature = self.major_version?;
        let versions = self
            .versions
            .iter()
            .filter_map(|v| VersionNumber::parse(v).ok())
            .collect();

        Some(MajorVersion {
            feature,
            term_of_support: self.term_of_support,
            maintained: self.maintained,
            early_access_only: self.early_access_only,
            release_status: self.release_status,
            versions,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DistributionJson {
    #[serde(deserialize_with = "null_as_default")]
    api_parameter: String,
    #[serde(deserialize_with = "null_as_default")]
    versions: Vec<String>,
}

fn parse_root(body: &str) -> Option<JsonValue> {
    match serde_json::from_str::<JsonValue>(body) {
        Ok(value) => Some(value),
        Err(e) => {
            debug!("Discarding body that is not valid JSON: {}", e);
            None
        }
    }
}

fn array_elements(body: &str) -> Vec<JsonValue> {
    match parse_root(body) {
        Some(JsonValue::Array(items)) => items,
        Some(_) => {
            debug!("Discarding body whose root is not an array");
            Vec::new()
        }
        None => Vec::new(),
    }
}

fn object_root(body: &str) -> Option<JsonValue> {
    match parse_root(body)? {
        value @ JsonValue::Object(_) => Some(value),
        _ => {
            debug!("Discarding body whose root is not an object");
            None
        }
    }
}

fn package_from_value(value: JsonValue) -> Option<Package> {
    match serde_json::from_value::<PackageJson>(value) {
        Ok(raw) => raw.into_package(),
        Err(e) => {
            debug!("Skipping malformed package entry: {}", e);
            None
        }
    }
}

fn major_version_from_value(value: JsonValue) -> Option<MajorVersion> {
    match serde_json::from_value::<MajorVersionJson>(value) {
        Ok(raw) => raw.into_major_version(),
        Err(e) => {
            debug!("Skipping malformed major version entry: {}", e);
            None
        }
    }
}

/// Decode a JSON array of packages
pub fn decode_packages(body: &str) -> Vec<Package> {
    array_elements(body)
        .into_iter()
        .filter_map(package_from_value)
        .collect()
}

/// Decode a single package object
pub fn decode_package(body: &str) -> Option<Package> {
    object_root(body).and_then(package_from_value)
}

/// Decode a JSON array of major versions, keeping the API order
pub fn decode_major_versions(body: &str) -> Vec<MajorVersion> {
    array_elements(body)
        .into_iter()
        .filter_map(major_version_from_value)
        .collect()
}

/// Decode a single major version object
pub fn decode_major_version(body: &str) -> Option<MajorVersion> {
    object_root(body).and_then(major_version_from_value)
}

/// Decode the body of an ephemeral id lookup
///
/// `java_version` is not part of the response and is carried over from the caller.
pub fn decode_pkg_info(body: &str, java_version: &str) -> Option<PkgInfo> {
    let value = object_root(body)?;
    match serde_json::from_value::<PkgInfo>(value) {
        Ok(mut info) => {
            info.java_version = java_version.to_string();
            Some(info)
        }
        Err(e) => {
            debug!("Discarding malformed package info: {}", e);
            None
        }
    }
}

/// Decode a distribution listing into distributions with their versions
pub fn decode_distributions(body: &str) -> Vec<DistributionVersions> {
    array_elements(body)
        .into_iter()
        .filter_map(|value| serde_json::from_value::<DistributionJson>(value).ok())
        .filter(|raw| !raw.api_parameter.is_empty())
        .map(|raw| DistributionVersions {
            distribution: Distribution::from_text(&raw.api_parameter),
            versions: raw
                .versions
                .iter()
                .filter_map(|v| VersionNumber::parse(v).ok())
                .collect(),
        })
        .collect()
}
