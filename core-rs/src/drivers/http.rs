//! HttpFetcher for the discovery API
//!
//! Thin wrapper over a shared `reqwest::Client`:
//! - one client per fetcher (connection pooling)
//! - user agent and optional timeout taken from config
//! - non-2xx statuses mapped to `DiscoError::HttpStatus`

use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use super::traits::{ByteStream, Fetcher};
use crate::config::DiscoConfig;
use crate::errors::{DiscoError, Result};

/// HTTP transport backed by reqwest
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Create an HttpFetcher from client config
    ///
    /// # Example
    ///
    /// ```
    /// use disco_core::{DiscoConfig, HttpFetcher};
    ///
    /// let fetcher = HttpFetcher::new(&DiscoConfig::default()).unwrap();
    /// ```
    pub fn new(config: &DiscoConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| DiscoError::Transport(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response> {
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DiscoError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let body = self.get(url).await?.text().await?;
        debug!("Fetched {} bytes from {}", body.len(), url);
        Ok(body)
    }

    async fn open(&self, url: &str) -> Result<Box<dyn ByteStream>> {
        let response = self.get(url).await?;
        Ok(Box::new(HttpByteStream { response }))
    }
}

struct HttpByteStream {
    response: reqwest::Response,
}

#[async_trait]
impl ByteStream for HttpByteStream {
    fn content_length(&self) -> Option<u64> {
        self.response.content_length()
    }

    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>> {
        let chunk = self.response.chunk().await?;
        Ok(chunk.map(|bytes| bytes.to_vec()))
    }
}
