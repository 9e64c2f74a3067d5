//! Offline caching for the dashboard.
//!
//! This module provides the `OfflineWorker`, which sits between the loader
//! and the network and lets the dashboard come up without a connection.
//! Cache stores live as JSON files under the user's cache directory.
//!
//! Strategies:
//! - Data (`/data/` paths): network first, cached copy as fallback
//! - App shell and everything else: cache first, network on a miss

pub mod network;
pub mod storage;
pub mod worker;

#[cfg(test)]
pub(crate) mod testing;

pub use network::{CacheMode, HttpNetwork, Network, NetworkError, Request, Response, ResponseSource};
pub use storage::{age_display, Cache, CacheStorage, CachedResponse};
pub use worker::{
    cache_name, ActivateOutcome, FetchError, InstallOutcome, OfflineWorker, Strategy,
    WorkerConfig, DEFAULT_SHELL_ASSETS,
};
