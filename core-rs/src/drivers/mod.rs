//! Drivers module for reaching the discovery API
//!
//! Provides the abstract transport interface (Fetcher trait) and implementations:
//! - HttpFetcher: remote HTTP via reqwest
//! - Endpoints: URL construction for every API path

mod traits;
mod http;
mod endpoints;

pub use traits::{ByteStream, Fetcher};
pub use http::HttpFetcher;
pub use endpoints::Endpoints;
