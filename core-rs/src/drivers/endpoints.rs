//! URL construction for the discovery API

use reqwest::Url;

use crate::config::DiscoConfig;
use crate::errors::{DiscoError, Result};
use crate::version::VersionNumber;

/// Resolved endpoint paths of one discovery API instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    base_url: String,
    packages_path: String,
    major_versions_path: String,
    ephemeral_ids_path: String,
    distributions_path: String,
}

impl Endpoints {
    pub fn new(config: &DiscoConfig) -> Self {
        Self {
            base_url: config.api_url.trim_end_matches('/').to_string(),
            packages_path: config.packages_path.clone(),
            major_versions_path: config.major_versions_path.clone(),
            ephemeral_ids_path: config.ephemeral_ids_path.clone(),
            distributions_path: config.distributions_path.clone(),
        }
    }

    fn build_url(&self, path: &str, params: &[(&str, String)]) -> Result<String> {
        let raw = format!("{}{}", self.base_url, path);
        let url = if params.is_empty() {
            Url::parse(&raw)
        } else {
            Url::parse_with_params(&raw, params.iter().map(|(k, v)| (*k, v.as_str())))
        };
        url.map(|u| u.to_string())
            .map_err(|e| DiscoError::InvalidUrl(format!("{}: {}", raw, e)))
    }

    /// Package search URL with the given query parameters
    pub fn packages(&self, params: &[(&str, String)]) -> Result<String> {
        self.build_url(&self.packages_path, params)
    }

    /// Full catalog URL (early access and general availability)
    pub fn all_packages(&self) -> Result<String> {
        self.packages(&[
            ("release_status", "ea".to_string()),
            ("release_status", "ga".to_string()),
        ])
    }

    pub fn package(&self, id: &str) -> Result<String> {
        self.build_url(&format!("{}/{}", self.packages_path, id), &[])
    }

    pub fn major_versions(&self, params: &[(&str, String)]) -> Result<String> {
        self.build_url(&self.major_versions_path, params)
    }

    /// Server-curated list of major versions worth offering
    pub fn useful_major_versions(&self) -> Result<String> {
        self.build_url(&format!("{}/useful", self.major_versions_path), &[])
    }

    /// Single major version by API parameter (`latest`, `last_lts`, `17`, ...)
    pub fn major_version_named(&self, parameter: &str) -> Result<String> {
        self.build_url(&format!("{}/{}", self.major_versions_path, parameter), &[])
    }

    pub fn ephemeral_id(&self, ephemeral_id: &str) -> Result<String> {
        self.build_url(&format!("{}/{}", self.ephemeral_ids_path, ephemeral_id), &[])
    }

    pub fn distributions(&self) -> Result<String> {
        self.build_url(&self.distributions_path, &[])
    }

    pub fn distributions_for_version(&self, version: &VersionNumber) -> Result<String> {
        self.build_url(
            &format!("{}/versions/{}", self.distributions_path, version),
            &[],
        )
    }
}
