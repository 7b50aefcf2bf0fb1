/**
 * config.rs
 * Client configuration (YAML format)
 *
 * Format:
 * ```yaml
 * api_url: https://api.foojay.io
 * packages_path: /disco/v2.0/packages
 * refresh_initial_delay_secs: 1
 * refresh_period_secs: 3600
 * max_concurrent_downloads: 2
 * ```
 *
 * Every key is optional. `DISCO_API_URL` in the environment overrides `api_url`.
 */

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::DiscoError;

/// Environment variable overriding the API base URL
pub const API_URL_ENV: &str = "DISCO_API_URL";

/// Public foojay discovery API
pub const DEFAULT_API_URL: &str = "https://api.foojay.io";

/// Discovery client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoConfig {
    /// Scheme and host of the discovery API
    pub api_url: String,

    pub packages_path: String,
    pub major_versions_path: String,
    pub ephemeral_ids_path: String,
    pub distributions_path: String,

    /// Delay before the first full-catalog refresh
    pub refresh_initial_delay_secs: u64,

    /// Period between full-catalog refreshes
    pub refresh_period_secs: u64,

    /// Per-request timeout, none by default
    pub request_timeout_secs: Option<u64>,

    /// Worker slots shared by all downloads
    pub max_concurrent_downloads: usize,

    pub user_agent: String,
}

impl Default for DiscoConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            packages_path: "/disco/v2.0/packages".to_string(),
            major_versions_path: "/disco/v2.0/major_versions".to_string(),
            ephemeral_ids_path: "/disco/v2.0/ephemeral_ids".to_string(),
            distributions_path: "/disco/v2.0/distributions".to_string(),
            refresh_initial_delay_secs: 1,
            refresh_period_secs: 3600,
            request_timeout_secs: None,
            max_concurrent_downloads: 2,
            user_agent: concat!("disco-core/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl DiscoConfig {
    /// Load config from a YAML file
    ///
    /// # Arguments
    /// * `path` - Path to the YAML file
    ///
    /// # Example
    /// ```no_run
    /// use disco_core::DiscoConfig;
    ///
    /// let config = DiscoConfig::load("/etc/discoclient/config.yaml").unwrap();
    /// assert!(config.refresh_period_secs > 0);
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DiscoError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(DiscoError::FileNotFound(
                path.to_string_lossy().to_string(),
            ));
        }

        let content = fs::read_to_string(path)?;

        let mut config: DiscoConfig = if content.trim().is_empty() {
            DiscoConfig::default()
        } else {
            serde_yaml::from_str(&content)?
        };

        config.apply_env();
        config.validate()?;

        Ok(config)
    }

    /// Load config from the per-user location, falling back to defaults
    ///
    /// Looks at `$HOME/.config/discoclient/config.yaml`. A missing file is not an error.
    pub fn load_default() -> Result<Self, DiscoError> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(path),
            _ => {
                let mut config = DiscoConfig::default();
                config.apply_env();
                config.validate()?;
                Ok(config)
            }
        }
    }

    /// Per-user config location, if `HOME` is set
    pub fn default_path() -> Option<PathBuf> {
        std::env::var("HOME")
            .ok()
            .map(|home| PathBuf::from(home).join(".config/discoclient/config.yaml"))
    }

    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                self.api_url = url.trim().to_string();
            }
        }
    }

    /// Validate config values
    ///
    /// Ensures:
    /// - api_url is an http(s) URL
    /// - every path starts with '/'
    /// - refresh period and download slots are non-zero
    pub fn validate(&self) -> Result<(), DiscoError> {
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(DiscoError::ValidationError(format!(
                "api_url must be an http(s) URL, got '{}'",
                self.api_url
            )));
        }

        for (name, path) in [
            ("packages_path", &self.packages_path),
            ("major_versions_path", &self.major_versions_path),
            ("ephemeral_ids_path", &self.ephemeral_ids_path),
            ("distributions_path", &self.distributions_path),
        ] {
            if !path.starts_with('/') {
                return Err(DiscoError::ValidationError(format!(
                    "{} must start with '/', got '{}'",
                    name, path
                )));
            }
        }

        if self.refresh_period_secs == 0 {
            return Err(DiscoError::ValidationError(
                "refresh_period_secs cannot be 0".to_string(),
            ));
        }

        if self.max_concurrent_downloads == 0 {
            return Err(DiscoError::ValidationError(
                "max_concurrent_downloads cannot be 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Save config to a YAML file
    ///
    /// # Arguments
    /// * `path` - Path where to save the config
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), DiscoError> {
        let yaml = serde_yaml::to_string(self)?;
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path.as_ref(), yaml)?;
        Ok(())
    }

    pub fn refresh_initial_delay(&self) -> Duration {
        Duration::from_secs(self.refresh_initial_delay_secs)
    }

    pub fn refresh_period(&self) -> Duration {
        Duration::from_secs(self.refresh_period_secs)
    }
}
