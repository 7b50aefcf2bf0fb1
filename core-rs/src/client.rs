//! Discovery client façade
//!
//! `DiscoClient` ties the pieces together: a fetcher for the remote API, the
//! cache manager with its refresh schedule, the query engine, the event bus
//! and the download pool.
//!
//! Every query exists in two forms. The `_async` variant is awaited on any
//! tokio runtime. The plain variant blocks the calling thread on the client
//! runtime and must not be called from inside an async context.
//!
//! Queries answer from the published snapshot when there is one. Before the
//! first snapshot they go to the remote API with the axis filters as
//! parameters and run the same local selection over the answer, so cold and
//! warm results agree. Transport failures are logged and yield empty results.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::runtime::{Handle, Runtime};
use tracing::{debug, info, warn};

use crate::cache::{CacheManager, CacheState, CatalogSnapshot, RefreshOutcome};
use crate::config::DiscoConfig;
use crate::download::{DownloadHandle, DownloadPool};
use crate::drivers::{Endpoints, Fetcher, HttpFetcher};
use crate::errors::{DiscoError, Result};
use crate::events::{Event, EventBus, EventFilter, ObserverId};
use crate::pkg::{decode, Comparison, Distribution, DistributionVersions, MajorVersion, Package, PkgInfo, TermOfSupport};
use crate::query::{engine, select, FeatureRange, PackageQuery};
use crate::version::VersionNumber;

/// Client for the JDK discovery API with a local catalog cache
pub struct DiscoClient {
    config: DiscoConfig,
    endpoints: Endpoints,
    fetcher: Arc<dyn Fetcher>,
    cache: Arc<CacheManager>,
    events: EventBus,
    downloads: DownloadPool,
    handle: Handle,
    runtime: Option<Runtime>,
}

impl std::fmt::Debug for DiscoClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscoClient")
            .field("api_url", &self.config.api_url)
            .field("cache", &self.cache)
            .field("downloads", &self.downloads)
            .field("owns_runtime", &self.runtime.is_some())
            .finish()
    }
}

impl DiscoClient {
    /// Create a client talking to the configured API over HTTP
    ///
    /// Uses the current tokio runtime when there is one, otherwise starts a
    /// private multi-threaded runtime owned by the client. The refresh
    /// schedule starts immediately.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use disco_core::{DiscoClient, DiscoConfig, PackageQuery, Latest, VersionNumber};
    ///
    /// let client = DiscoClient::new(DiscoConfig::default()).unwrap();
    /// let query = PackageQuery::new()
    ///     .version(VersionNumber::new(17))
    ///     .latest(Latest::PerDistribution);
    /// for pkg in client.packages(&query) {
    ///     println!("{} {}", pkg.distribution, pkg.java_version);
    /// }
    /// ```
    pub fn new(config: DiscoConfig) -> Result<Self> {
        config.validate()?;
        let fetcher = Arc::new(HttpFetcher::new(&config)?);
        Self::with_fetcher(config, fetcher)
    }

    /// Create a client over any fetcher implementation
    pub fn with_fetcher(config: DiscoConfig, fetcher: Arc<dyn Fetcher>) -> Result<Self> {
        config.validate()?;

        let (handle, runtime) = match Handle::try_current() {
            Ok(handle) => (handle, None),
            Err(_) => {
                let runtime = tokio::runtime::Builder::new_multi_thread()
                    .enable_all()
                    .thread_name("disco-client")
                    .build()
                    .map_err(|e| DiscoError::Runtime(format!("Failed to start tokio runtime: {}", e)))?;
                (runtime.handle().clone(), Some(runtime))
            }
        };

        let endpoints = Endpoints::new(&config);
        let events = EventBus::new();
        let cache = Arc::new(CacheManager::new(
            Arc::clone(&fetcher),
            endpoints.clone(),
            events.clone(),
        ));
        cache.start(&handle, config.refresh_initial_delay(), config.refresh_period());

        let downloads = DownloadPool::new(
            Arc::clone(&fetcher),
            events.clone(),
            config.max_concurrent_downloads,
            handle.clone(),
        );

        info!("Discovery client created for {}", config.api_url);
        Ok(Self {
            config,
            endpoints,
            fetcher,
            cache,
            events,
            downloads,
            handle,
            runtime,
        })
    }

    fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.handle.block_on(future)
    }

    /// Fetch a URL, logging and swallowing transport failures
    async fn fetch_body(&self, url: Result<String>) -> Option<String> {
        let url = match url {
            Ok(url) => url,
            Err(e) => {
                warn!("Could not build request URL: {}", e);
                return None;
            }
        };
        match self.fetcher.fetch(&url).await {
            Ok(body) => Some(body),
            Err(e) => {
                warn!("Request to {} failed: {}", url, e);
                None
            }
        }
    }

    /// Known feature lines for range bounds, fetched on first need
    async fn feature_range(&self, snapshot: Option<&CatalogSnapshot>) -> FeatureRange {
        if let Some(snapshot) = snapshot {
            if !snapshot.major_versions().is_empty() {
                return snapshot.feature_range();
            }
        }
        if self.cache.major_versions().is_empty() {
            if let Err(e) = self.cache.refresh_major_versions().await {
                warn!("Major versions unavailable, using default range: {}", e);
            }
        }
        FeatureRange::from_major_versions(&self.cache.major_versions())
    }

    // ---- cache ----

    pub fn config(&self) -> &DiscoConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<CacheManager> {
        &self.cache
    }

    /// True once a snapshot is published and the last refresh succeeded
    pub fn is_ready(&self) -> bool {
        self.cache.is_ready()
    }

    pub fn cache_state(&self) -> CacheState {
        self.cache.state()
    }

    /// Refresh the catalog now instead of waiting for the next tick
    pub async fn refresh_now_async(&self) -> Result<RefreshOutcome> {
        self.cache.refresh().await
    }

    pub fn refresh_now(&self) -> Result<RefreshOutcome> {
        self.block_on(self.refresh_now_async())
    }

    /// Stop the refresh schedule; queries keep working
    pub fn shutdown(&self) {
        self.cache.shutdown();
    }

    // ---- events ----

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Register an observer for one event kind or for all events
    pub fn subscribe<F>(&self, filter: impl Into<EventFilter>, observer: F) -> ObserverId
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.events.subscribe(filter, observer)
    }

    pub fn unsubscribe(&self, id: ObserverId) -> bool {
        self.events.unsubscribe(id)
    }

    // ---- packages ----

    /// Packages matching a query, ordered by distribution then version
    pub async fn packages_async(&self, query: &PackageQuery) -> Vec<Arc<Package>> {
        let needs_range = query.comparison != Comparison::Equal;

        if let Some(snapshot) = self.cache.snapshot() {
            let range = if needs_range {
                self.feature_range(Some(&snapshot)).await
            } else {
                FeatureRange::default()
            };
            return select(snapshot.packages(), range, query);
        }

        debug!("Cache cold, querying remote catalog");
        let Some(body) = self.fetch_body(self.endpoints.packages(&query.to_params())).await else {
            return Vec::new();
        };
        let fetched = CatalogSnapshot::build(decode::decode_packages(&body), Vec::new());
        let range = if needs_range {
            self.feature_range(None).await
        } else {
            FeatureRange::default()
        };
        select(fetched.packages(), range, query)
    }

    pub fn packages(&self, query: &PackageQuery) -> Vec<Arc<Package>> {
        self.block_on(self.packages_async(query))
    }

    /// Query result serialized as a JSON array
    pub async fn packages_as_json_async(&self, query: &PackageQuery) -> String {
        let packages = self.packages_async(query).await;
        let records: Vec<&Package> = packages.iter().map(|p| p.as_ref()).collect();
        serde_json::to_string_pretty(&records).unwrap_or_else(|e| {
            warn!("Could not serialize packages: {}", e);
            "[]".to_string()
        })
    }

    pub fn packages_as_json(&self, query: &PackageQuery) -> String {
        self.block_on(self.packages_as_json_async(query))
    }

    /// The whole catalog, GA and early access, in result order
    pub async fn all_packages_async(&self) -> Vec<Arc<Package>> {
        let mut packages: Vec<Arc<Package>> = match self.cache.snapshot() {
            Some(snapshot) => snapshot.packages().cloned().collect(),
            None => {
                let Some(body) = self.fetch_body(self.endpoints.all_packages()).await else {
                    return Vec::new();
                };
                let fetched = CatalogSnapshot::build(decode::decode_packages(&body), Vec::new());
                fetched.packages().cloned().collect()
            }
        };
        engine::sort_packages(&mut packages);
        packages
    }

    pub fn all_packages(&self) -> Vec<Arc<Package>> {
        self.block_on(self.all_packages_async())
    }

    /// Package by id
    ///
    /// Looked up in the snapshot first, then asked of the remote API so that
    /// packages published since the last refresh are found too.
    pub async fn package_async(&self, id: &str) -> Option<Arc<Package>> {
        if let Some(pkg) = self.cache.snapshot().and_then(|s| s.get(id)) {
            return Some(pkg);
        }
        let body = self.fetch_body(self.endpoints.package(id)).await?;
        decode::decode_package(&body).map(Arc::new)
    }

    pub fn package(&self, id: &str) -> Option<Arc<Package>> {
        self.block_on(self.package_async(id))
    }

    // ---- major versions ----

    /// Major versions in API order
    ///
    /// Served from the cached list when there is one. Without `include_ea`,
    /// lines that only carry early-access builds are left out.
    pub async fn major_versions_async(&self, include_ea: bool) -> Vec<MajorVersion> {
        let cached = self.cache.major_versions();
        if !cached.is_empty() {
            return cached
                .iter()
                .filter(|mv| include_ea || !mv.early_access_only)
                .cloned()
                .collect();
        }

        let params = [("ea", include_ea.to_string())];
        match self.fetch_body(self.endpoints.major_versions(&params)).await {
            Some(body) => decode::decode_major_versions(&body),
            None => Vec::new(),
        }
    }

    pub fn major_versions(&self, include_ea: bool) -> Vec<MajorVersion> {
        self.block_on(self.major_versions_async(include_ea))
    }

    /// Major versions still receiving updates
    pub async fn maintained_major_versions_async(&self, include_ea: bool) -> Vec<MajorVersion> {
        self.major_versions_async(include_ea)
            .await
            .into_iter()
            .filter(|mv| mv.maintained)
            .collect()
    }

    pub fn maintained_major_versions(&self, include_ea: bool) -> Vec<MajorVersion> {
        self.block_on(self.maintained_major_versions_async(include_ea))
    }

    /// The API's selection of lines worth offering to users
    pub async fn useful_major_versions_async(&self) -> Vec<MajorVersion> {
        match self.fetch_body(self.endpoints.useful_major_versions()).await {
            Some(body) => decode::decode_major_versions(&body),
            None => Vec::new(),
        }
    }

    pub fn useful_major_versions(&self) -> Vec<MajorVersion> {
        self.block_on(self.useful_major_versions_async())
    }

    /// One feature line, if known
    pub async fn major_version_async(&self, feature: u32, include_ea: bool) -> Option<MajorVersion> {
        self.major_versions_async(include_ea)
            .await
            .into_iter()
            .find(|mv| mv.feature == feature)
    }

    pub fn major_version(&self, feature: u32, include_ea: bool) -> Option<MajorVersion> {
        self.block_on(self.major_version_async(feature, include_ea))
    }

    /// Major version resolved by the API from a name such as `latest_lts` or `17`
    pub async fn major_version_named_async(&self, parameter: &str) -> Option<MajorVersion> {
        let body = self.fetch_body(self.endpoints.major_version_named(parameter)).await?;
        decode::decode_major_version(&body)
    }

    pub fn major_version_named(&self, parameter: &str) -> Option<MajorVersion> {
        self.block_on(self.major_version_named_async(parameter))
    }

    async fn latest_matching<F>(&self, include_ea: bool, term: F) -> Option<MajorVersion>
    where
        F: Fn(TermOfSupport) -> bool,
    {
        self.major_versions_async(include_ea)
            .await
            .into_iter()
            .find(|mv| term(mv.term_of_support) && mv.has_builds(include_ea))
    }

    /// Newest long-term-support line
    pub async fn latest_lts_async(&self, include_ea: bool) -> Option<MajorVersion> {
        self.latest_matching(include_ea, |t| t == TermOfSupport::Lts).await
    }

    pub fn latest_lts(&self, include_ea: bool) -> Option<MajorVersion> {
        self.block_on(self.latest_lts_async(include_ea))
    }

    /// Newest medium-term-support line
    pub async fn latest_mts_async(&self, include_ea: bool) -> Option<MajorVersion> {
        self.latest_matching(include_ea, |t| t == TermOfSupport::Mts).await
    }

    pub fn latest_mts(&self, include_ea: bool) -> Option<MajorVersion> {
        self.block_on(self.latest_mts_async(include_ea))
    }

    /// Newest line without long-term support
    pub async fn latest_sts_async(&self, include_ea: bool) -> Option<MajorVersion> {
        self.latest_matching(include_ea, |t| t != TermOfSupport::Lts).await
    }

    pub fn latest_sts(&self, include_ea: bool) -> Option<MajorVersion> {
        self.block_on(self.latest_sts_async(include_ea))
    }

    // ---- distributions ----

    /// Distributions the API knows about
    pub async fn distributions_async(&self) -> Vec<Distribution> {
        self.versions_per_distribution_async()
            .await
            .into_iter()
            .map(|dv| dv.distribution)
            .filter(|d| !d.is_sentinel())
            .collect()
    }

    pub fn distributions(&self) -> Vec<Distribution> {
        self.block_on(self.distributions_async())
    }

    /// Every distribution with the versions it publishes
    pub async fn versions_per_distribution_async(&self) -> Vec<DistributionVersions> {
        match self.fetch_body(self.endpoints.distributions()).await {
            Some(body) => decode::decode_distributions(&body),
            None => Vec::new(),
        }
    }

    pub fn versions_per_distribution(&self) -> Vec<DistributionVersions> {
        self.block_on(self.versions_per_distribution_async())
    }

    /// Distributions that publish the given version
    pub async fn distributions_for_version_async(&self, version: &VersionNumber) -> Vec<Distribution> {
        match self.fetch_body(self.endpoints.distributions_for_version(version)).await {
            Some(body) => decode::decode_distributions(&body)
                .into_iter()
                .map(|dv| dv.distribution)
                .filter(|d| !d.is_sentinel())
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn distributions_for_version(&self, version: &VersionNumber) -> Vec<Distribution> {
        self.block_on(self.distributions_for_version_async(version))
    }

    /// Distinct distributions among the packages matching a query, in result order
    pub async fn distributions_supporting_async(&self, query: &PackageQuery) -> Vec<Distribution> {
        let mut distributions: Vec<Distribution> = Vec::new();
        for pkg in self.packages_async(query).await {
            if !distributions.contains(&pkg.distribution) {
                distributions.push(pkg.distribution);
            }
        }
        distributions
    }

    pub fn distributions_supporting(&self, query: &PackageQuery) -> Vec<Distribution> {
        self.block_on(self.distributions_supporting_async(query))
    }

    pub fn distributions_based_on_openjdk(&self) -> Vec<Distribution> {
        Distribution::based_on_openjdk()
    }

    pub fn distributions_based_on_graalvm(&self) -> Vec<Distribution> {
        Distribution::based_on_graalvm()
    }

    // ---- downloads ----

    /// Resolve an ephemeral id into download links
    pub async fn pkg_info_async(&self, ephemeral_id: &str, java_version: &str) -> Option<PkgInfo> {
        let body = self.fetch_body(self.endpoints.ephemeral_id(ephemeral_id)).await?;
        decode::decode_pkg_info(&body, java_version)
    }

    pub fn pkg_info(&self, ephemeral_id: &str, java_version: &str) -> Option<PkgInfo> {
        self.block_on(self.pkg_info_async(ephemeral_id, java_version))
    }

    /// Direct download URI for an ephemeral id
    pub async fn direct_download_uri_async(&self, ephemeral_id: &str, java_version: &str) -> Option<String> {
        self.pkg_info_async(ephemeral_id, java_version)
            .await
            .map(|info| info.direct_download_uri)
            .filter(|uri| !uri.is_empty())
    }

    pub fn direct_download_uri(&self, ephemeral_id: &str, java_version: &str) -> Option<String> {
        self.block_on(self.direct_download_uri_async(ephemeral_id, java_version))
    }

    /// Start downloading already resolved package info into `destination`
    pub fn download_pkg_info(&self, info: &PkgInfo, destination: impl Into<PathBuf>) -> Result<DownloadHandle> {
        if info.direct_download_uri.is_empty() {
            return Err(DiscoError::Download(format!(
                "no direct download link for {}",
                info.filename
            )));
        }
        Ok(self.downloads.submit(info.direct_download_uri.clone(), destination))
    }

    /// Resolve a package id and start downloading it into `destination`
    pub async fn download_package_async(&self, pkg_id: &str, destination: impl Into<PathBuf>) -> Result<DownloadHandle> {
        let pkg = self
            .package_async(pkg_id)
            .await
            .ok_or_else(|| DiscoError::PackageNotFound(pkg_id.to_string()))?;
        if pkg.ephemeral_id.is_empty() {
            return Err(DiscoError::Download(format!("package {} has no ephemeral id", pkg_id)));
        }
        let info = self
            .pkg_info_async(&pkg.ephemeral_id, &pkg.java_version)
            .await
            .ok_or_else(|| DiscoError::Download(format!("no download info for package {}", pkg_id)))?;
        self.download_pkg_info(&info, destination)
    }

    pub fn download_package(&self, pkg_id: &str, destination: impl Into<PathBuf>) -> Result<DownloadHandle> {
        self.block_on(self.download_package_async(pkg_id, destination))
    }

    /// Wait for a download from a blocking context
    pub fn wait_download(&self, download: DownloadHandle) -> Result<u64> {
        self.block_on(download.wait())
    }

    pub fn downloads(&self) -> &DownloadPool {
        &self.downloads
    }
}

impl Drop for DiscoClient {
    fn drop(&mut self) {
        self.cache.shutdown();
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}
