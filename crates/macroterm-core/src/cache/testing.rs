//! In-memory origin for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use reqwest::Url;

use super::network::{CacheMode, Network, NetworkError, Request, Response, ResponseSource};
use super::worker::DEFAULT_SHELL_ASSETS;

pub const BASE: &str = "http://localhost:8080/app/";

pub fn base() -> Url {
    Url::parse(BASE).expect("Failed to parse base URL")
}

pub fn request(path: &str) -> Request {
    Request::get(base().join(path).expect("Failed to join test path"))
}

/// Serves canned responses keyed by URL and can be taken offline.
pub struct FakeNetwork {
    routes: Mutex<HashMap<String, (u16, Vec<u8>)>>,
    online: AtomicBool,
    pub hits: AtomicUsize,
    /// Cache mode of every request seen, keyed by URL.
    seen: Mutex<Vec<(String, CacheMode)>>,
}

impl FakeNetwork {
    pub fn new() -> Self {
        Self {
            routes: Mutex::new(HashMap::new()),
            online: AtomicBool::new(true),
            hits: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn route(self, path: &str, status: u16, body: &str) -> Self {
        self.set(path, status, body);
        self
    }

    pub fn with_shell(self) -> Self {
        DEFAULT_SHELL_ASSETS
            .iter()
            .fold(self, |net, asset| net.route(asset, 200, asset))
    }

    pub fn set(&self, path: &str, status: u16, body: &str) {
        let url = base().join(path).expect("Failed to join test path");
        self.routes
            .lock()
            .expect("routes lock")
            .insert(url.to_string(), (status, body.as_bytes().to_vec()));
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    /// Cache modes the requests for `path` were sent with, in order.
    pub fn modes_for(&self, path: &str) -> Vec<CacheMode> {
        let url = base().join(path).expect("Failed to join test path").to_string();
        self.seen
            .lock()
            .expect("seen lock")
            .iter()
            .filter(|(seen, _)| *seen == url)
            .map(|(_, mode)| *mode)
            .collect()
    }
}

impl Network for FakeNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response, NetworkError> {
        self.hits.fetch_add(1, Ordering::SeqCst);
        self.seen
            .lock()
            .expect("seen lock")
            .push((request.cache_key(), request.cache));
        if !self.online.load(Ordering::SeqCst) {
            return Err(NetworkError::Unreachable("offline".to_string()));
        }
        let routes = self.routes.lock().expect("routes lock");
        let (status, body) = routes
            .get(&request.cache_key())
            .cloned()
            .unwrap_or((404, b"not found".to_vec()));
        Ok(Response {
            status,
            content_type: Some("application/json".to_string()),
            body,
            source: ResponseSource::Network,
        })
    }
}
