//! Offline cache worker.
//!
//! Handles the three lifecycle events of an offline-capable app:
//!
//! - `install`: pre-cache the app shell
//! - `activate`: drop every cache store except the current version
//! - `fetch`: network-first for data, cache-first for everything else

use anyhow::{bail, Context, Result};
use futures::future::try_join_all;
use reqwest::Url;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::network::{Network, NetworkError, Request, Response};
use super::storage::CacheStorage;

/// Prefix of the versioned cache store name.
pub const CACHE_NAME_PREFIX: &str = "macro-terminal";

/// Assets needed to render the app without a network, relative to the base URL.
pub const DEFAULT_SHELL_ASSETS: &[&str] = &[
    "./",
    "./index.html",
    "./manifest.webmanifest",
    "./icons/icon-192.png",
    "./icons/icon-512.png",
];

/// Requests whose path contains this segment are data, not shell.
pub const DEFAULT_DATA_SEGMENT: &str = "/data/";

/// Build the versioned cache store name for a version string.
pub fn cache_name(version: &str) -> String {
    format!("{}-{}", CACHE_NAME_PREFIX, version)
}

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Current cache store. Bumping it is the only way to discard stale caches.
    pub cache_name: String,
    /// Origin and path prefix the worker controls.
    pub base_url: Url,
    pub shell_assets: Vec<String>,
    pub data_segment: String,
}

impl WorkerConfig {
    pub fn new(base_url: Url, version: &str) -> Self {
        Self {
            cache_name: cache_name(version),
            base_url,
            shell_assets: DEFAULT_SHELL_ASSETS.iter().map(|s| s.to_string()).collect(),
            data_segment: DEFAULT_DATA_SEGMENT.to_string(),
        }
    }

    /// Shell asset URLs resolved against the base URL.
    pub fn shell_urls(&self) -> Result<Vec<Url>> {
        self.shell_assets
            .iter()
            .map(|asset| {
                self.base_url
                    .join(asset)
                    .with_context(|| format!("Invalid shell asset path: {}", asset))
            })
            .collect()
    }
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error("{url} is not cached and the network failed: {source}")]
    Unavailable {
        url: String,
        #[source]
        source: NetworkError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallOutcome {
    pub cache_name: String,
    pub cached: usize,
    /// The new version takes over without waiting for old clients to close.
    pub skip_waiting: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivateOutcome {
    pub deleted: Vec<String>,
    /// Already-running clients are controlled immediately.
    pub claimed: bool,
}

/// Which strategy a request is served with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    NetworkFirst,
    CacheFirst,
    /// Outside the worker's base URL: straight to the network.
    Bypass,
}

pub struct OfflineWorker<N> {
    config: WorkerConfig,
    storage: CacheStorage,
    network: N,
}

impl<N: Network> OfflineWorker<N> {
    pub fn new(config: WorkerConfig, storage: CacheStorage, network: N) -> Self {
        Self {
            config,
            storage,
            network,
        }
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    pub fn storage(&self) -> &CacheStorage {
        &self.storage
    }

    #[cfg(test)]
    pub(crate) fn network(&self) -> &N {
        &self.network
    }

    pub fn strategy(&self, request: &Request) -> Strategy {
        if !request.url.as_str().starts_with(self.config.base_url.as_str()) {
            Strategy::Bypass
        } else if request.url.path().contains(&self.config.data_segment) {
            Strategy::NetworkFirst
        } else {
            Strategy::CacheFirst
        }
    }

    /// Pre-cache the app shell. Either every asset is stored or none is.
    pub async fn install(&self) -> Result<InstallOutcome> {
        let requests: Vec<Request> = self
            .config
            .shell_urls()?
            .into_iter()
            .map(Request::get)
            .collect();

        let responses = try_join_all(requests.iter().map(|r| self.network.fetch(r)))
            .await
            .context("Failed to fetch app shell")?;

        for (request, response) in requests.iter().zip(&responses) {
            if !response.is_success() {
                bail!("App shell asset {} returned HTTP {}", request.url, response.status);
            }
        }

        let pairs: Vec<(Request, Response)> = requests.into_iter().zip(responses).collect();
        let cache = self.storage.open(&self.config.cache_name)?;
        cache.put_all(&pairs)?;

        info!(cache = %self.config.cache_name, assets = pairs.len(), "App shell cached");

        Ok(InstallOutcome {
            cache_name: self.config.cache_name.clone(),
            cached: pairs.len(),
            skip_waiting: true,
        })
    }

    /// Delete every cache store that is not the current version.
    pub fn activate(&self) -> Result<ActivateOutcome> {
        let mut deleted = Vec::new();
        for name in self.storage.keys()? {
            if name != self.config.cache_name {
                self.storage.delete(&name)?;
                info!(cache = %name, "Deleted stale cache store");
                deleted.push(name);
            }
        }

        Ok(ActivateOutcome {
            deleted,
            claimed: true,
        })
    }

    /// Serve a request according to its strategy.
    pub async fn fetch(&self, request: Request) -> Result<Response, FetchError> {
        match self.strategy(&request) {
            Strategy::NetworkFirst => self.network_first(request).await,
            Strategy::CacheFirst => self.cache_first(request).await,
            Strategy::Bypass => Ok(self.network.fetch(&request).await?),
        }
    }

    async fn network_first(&self, request: Request) -> Result<Response, FetchError> {
        match self.network.fetch(&request).await {
            Ok(response) => {
                if response.is_success() {
                    self.store_in_background(request, response.clone());
                }
                Ok(response)
            }
            Err(e) => {
                warn!(url = %request.url, error = %e, "Network failed, falling back to offline cache");
                match self.storage.match_request(&request) {
                    Ok(Some(cached)) => Ok(cached.into_response()),
                    Ok(None) => Err(FetchError::Unavailable {
                        url: request.url.to_string(),
                        source: e,
                    }),
                    Err(lookup) => {
                        debug!(url = %request.url, error = %lookup, "Cache lookup failed");
                        Err(FetchError::Unavailable {
                            url: request.url.to_string(),
                            source: e,
                        })
                    }
                }
            }
        }
    }

    async fn cache_first(&self, request: Request) -> Result<Response, FetchError> {
        match self.storage.match_request(&request) {
            Ok(Some(cached)) => return Ok(cached.into_response()),
            Ok(None) => {}
            Err(e) => debug!(url = %request.url, error = %e, "Cache lookup failed"),
        }
        // Shell assets are only cached at install time, never written back here
        Ok(self.network.fetch(&request).await?)
    }

    /// Write a response to the current store without waiting for it.
    /// Callers pass only 2xx responses, so an error page never replaces a
    /// cached entry. Failures are logged and otherwise ignored.
    fn store_in_background(&self, request: Request, response: Response) {
        let storage = self.storage.clone();
        let cache_name = self.config.cache_name.clone();
        tokio::task::spawn_blocking(move || {
            let result = storage
                .open(&cache_name)
                .and_then(|cache| cache.put(&request, &response));
            if let Err(e) = result {
                debug!(url = %request.url, error = %e, "Background cache write failed");
            }
        });
    }
}

// ============================================================================
// Tests
// ============================================================================
