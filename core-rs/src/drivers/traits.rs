//! Transport trait for the discovery client
//!
//! Defines the abstract interface used to reach the discovery API.
//! Implementations include:
//! - HttpFetcher (remote HTTP via reqwest)
//! - In-memory fetchers used by tests

use async_trait::async_trait;

use crate::errors::Result;

/// Body source for downloads
///
/// Yields the response body chunk by chunk so callers can report progress.
#[async_trait]
pub trait ByteStream: Send {
    /// Total size announced by the server, if any
    fn content_length(&self) -> Option<u64>;

    /// Next chunk of the body, `None` once the body is exhausted
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>>;
}

/// Fetcher trait
///
/// All transports must implement this interface. A fetcher knows nothing
/// about the catalog: it turns a URL into a body.
///
/// # Semantics
///
/// - Non-2xx responses are errors at this boundary
/// - No retries; callers decide what a failure means
/// - Must be shareable across tasks (`Send + Sync`)
///
/// # Example Implementation
///
/// ```rust,ignore
/// pub struct StaticFetcher { body: String }
///
/// #[async_trait]
/// impl Fetcher for StaticFetcher {
///     async fn fetch(&self, _url: &str) -> Result<String> {
///         Ok(self.body.clone())
///     }
///
///     async fn open(&self, url: &str) -> Result<Box<dyn ByteStream>> {
///         Err(DiscoError::Transport(format!("no downloads for {}", url)))
///     }
/// }
/// ```
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch a URL and return the body as text
    ///
    /// # Arguments
    ///
    /// * `url` - Absolute URL, query string included
    async fn fetch(&self, url: &str) -> Result<String>;

    /// Open a URL for streaming download
    ///
    /// # Arguments
    ///
    /// * `url` - Direct download URL of an artifact
    async fn open(&self, url: &str) -> Result<Box<dyn ByteStream>>;
}
