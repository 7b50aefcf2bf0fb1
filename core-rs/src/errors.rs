//! Error types for the discovery client

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DiscoError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Invalid version: {0}")]
    InvalidVersion(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Runtime error: {0}")]
    Runtime(String),

    #[error("Package not found: {0}")]
    PackageNotFound(String),

    #[error("Download failed: {0}")]
    Download(String),

    #[error("Download cancelled: {0}")]
    Cancelled(String),
}

impl From<reqwest::Error> for DiscoError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => DiscoError::HttpStatus {
                status: status.as_u16(),
                url: err.url().map(|u| u.to_string()).unwrap_or_default(),
            },
            None => DiscoError::Transport(err.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, DiscoError>;
