//! Client for the dashboard snapshot resource.

use std::sync::Arc;

use futures::future::{AbortHandle, AbortRegistration, Abortable};
use reqwest::Url;
use tracing::{debug, warn};

use crate::cache::{CacheMode, Network, OfflineWorker, Request, ResponseSource};
use crate::models::Dashboard;

use super::LoadError;

/// Snapshot location relative to the base URL
pub const DASHBOARD_PATH: &str = "./data/dashboard.json";

/// A freshly loaded snapshot and where it came from.
#[derive(Debug, Clone)]
pub struct Loaded {
    pub dashboard: Dashboard,
    pub source: ResponseSource,
}

/// Create a linked abort handle and registration for one load.
pub fn abort_pair() -> (AbortHandle, AbortRegistration) {
    AbortHandle::new_pair()
}

/// Loads the dashboard snapshot through the offline worker.
/// Clone is cheap - the worker is shared.
pub struct DashboardClient<N> {
    worker: Arc<OfflineWorker<N>>,
    url: Url,
}

impl<N> Clone for DashboardClient<N> {
    fn clone(&self) -> Self {
        Self {
            worker: Arc::clone(&self.worker),
            url: self.url.clone(),
        }
    }
}

impl<N: Network> DashboardClient<N> {
    pub fn new(worker: Arc<OfflineWorker<N>>) -> Result<Self, LoadError> {
        let url = worker
            .config()
            .base_url
            .join(DASHBOARD_PATH)
            .map_err(|e| LoadError::InvalidUrl(e.to_string()))?;
        Ok(Self { worker, url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn worker(&self) -> &Arc<OfflineWorker<N>> {
        &self.worker
    }

    /// Fetch and parse the snapshot once.
    ///
    /// Aborting the paired `AbortHandle` resolves this with
    /// `LoadError::Aborted`.
    pub async fn fetch_dashboard(&self, abort: AbortRegistration) -> Result<Loaded, LoadError> {
        match Abortable::new(self.fetch_once(), abort).await {
            Ok(result) => result,
            Err(_aborted) => {
                debug!(url = %self.url, "Dashboard load aborted");
                Err(LoadError::Aborted)
            }
        }
    }

    async fn fetch_once(&self) -> Result<Loaded, LoadError> {
        // Bypass HTTP caches; the offline worker still applies its own strategy
        let request = Request::get(self.url.clone()).with_cache(CacheMode::NoStore);
        let response = self.worker.fetch(request).await?;

        if !response.is_success() {
            return Err(LoadError::from_status(response.status, &response.body_text()));
        }

        let dashboard = Dashboard::from_slice(&response.body)?;
        for id in dashboard.duplicate_region_ids() {
            warn!(region = id, "Duplicate region id in snapshot");
        }

        debug!(
            regions = dashboard.regions.len(),
            from_cache = response.source.is_cache(),
            "Dashboard loaded"
        );

        Ok(Loaded {
            dashboard,
            source: response.source,
        })
    }
}
