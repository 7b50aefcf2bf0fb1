//! # Disco Core - JDK Discovery Client
//!
//! Client for the foojay discovery API: a catalog of downloadable JDK and JRE
//! packages from many vendors. The client keeps a local snapshot of the whole
//! catalog, refreshed on a schedule, and answers package queries from it.
//!
//! ## Key Features
//!
//! - Typed catalog records and filter axes (distribution, OS, architecture, ...)
//! - Partial and range version matching with latest-per-line policies
//! - Lock-free snapshot reads while a refresh is in flight
//! - Cache and download notifications through an event bus
//! - Bounded concurrent downloads resolved through ephemeral ids
//!
//! ## Architecture
//!
//! ```text
//!             ┌──────────────────────┐
//!             │      DiscoClient     │
//!             └──────────┬───────────┘
//!        ┌───────────────┼────────────────┐
//!        ▼               ▼                ▼
//! ┌─────────────┐ ┌─────────────┐ ┌──────────────┐
//! │ CacheManager│ │ query engine│ │ DownloadPool │
//! │  (snapshot) │ │  (select)   │ │  (semaphore) │
//! └──────┬──────┘ └─────────────┘ └──────┬───────┘
//!        │                               │
//!        └──────────► Fetcher ◄──────────┘
//!                  (HTTP / test double)
//! ```

pub mod errors;
pub mod config;
pub mod version;
pub mod pkg;
pub mod drivers;
pub mod cache;
pub mod query;
pub mod events;
pub mod download;
pub mod client;
pub mod telemetry;

pub use errors::{DiscoError, Result};
pub use config::DiscoConfig;
pub use version::VersionNumber;
pub use pkg::{
    Architecture, ArchiveType, Bitness, Comparison, Distribution, DistributionVersions, LibCType,
    Latest, MajorVersion, OperatingSystem, Package, PackageType, PkgInfo, ReleaseStatus, Scope,
    TermOfSupport,
};
pub use drivers::{ByteStream, Endpoints, Fetcher, HttpFetcher};
pub use cache::{CacheManager, CacheState, CatalogSnapshot, RefreshOutcome};
pub use query::{FeatureRange, PackageQuery};
pub use events::{Event, EventBus, EventFilter, EventKind, ObserverId};
pub use download::{DownloadHandle, DownloadPool};
pub use client::DiscoClient;
pub use telemetry::init_logging;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Version of the discovery API the default endpoints target
pub const API_VERSION: &str = "2.0";
