use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::network::{Request, Response, ResponseSource};

/// Subdirectory of the cache directory holding the named stores
const STORES_DIR: &str = "stores";

/// Extension of a store file
const STORE_EXT: &str = "json";

/// A response as persisted in a cache store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
    pub cached_at: DateTime<Utc>,
}

impl CachedResponse {
    pub fn from_response(response: &Response) -> Self {
        Self {
            status: response.status,
            content_type: response.content_type.clone(),
            body: response.body.clone(),
            cached_at: Utc::now(),
        }
    }

    pub fn into_response(self) -> Response {
        Response {
            status: self.status,
            content_type: self.content_type,
            body: self.body,
            source: ResponseSource::Cache {
                cached_at: self.cached_at,
            },
        }
    }

}

/// Human-readable age of a cache entry ("just now", "5m ago", "2h ago", "3d ago").
pub fn age_display(cached_at: DateTime<Utc>) -> String {
    let minutes = (Utc::now() - cached_at).num_minutes();
    if minutes < 1 {
        // Also covers clock skew
        "just now".to_string()
    } else if minutes < 60 {
        format!("{}m ago", minutes)
    } else if minutes < 1440 {
        let hours = minutes / 60;
        let remaining_mins = minutes % 60;
        if remaining_mins >= 30 {
            // Round up: 1h 30m+ becomes 2h
            format!("{}h ago", hours + 1)
        } else {
            format!("{}h ago", hours)
        }
    } else {
        let days = minutes / 1440;
        let remaining_hours = (minutes % 1440) / 60;
        if remaining_hours >= 12 {
            format!("{}d ago", days + 1)
        } else {
            format!("{}d ago", days)
        }
    }
}

type Entries = BTreeMap<String, CachedResponse>;

/// The set of named cache stores on disk.
///
/// Each store is one JSON file mapping request keys to responses. All
/// read-modify-write cycles on any store go through one lock, so concurrent
/// background writes cannot drop each other's entries.
/// Clone is cheap and clones share the lock.
#[derive(Clone)]
pub struct CacheStorage {
    root: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl CacheStorage {
    pub fn new(cache_dir: &Path) -> Result<Self> {
        let root = cache_dir.join(STORES_DIR);
        std::fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create cache store directory: {}", root.display()))?;
        Ok(Self {
            root,
            lock: Arc::new(Mutex::new(())),
        })
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        // The guarded value is (), so a poisoned lock carries no broken state
        self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn store_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}.{}", encode_name(name), STORE_EXT))
    }

    /// Names of all existing stores, sorted.
    pub fn keys(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.root)
            .with_context(|| format!("Failed to list cache stores in {}", self.root.display()))?
        {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(STORE_EXT) {
                continue;
            }
            if let Some(name) = path.file_stem().and_then(|s| s.to_str()).and_then(decode_name) {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    /// Open a store, creating it empty if it does not exist yet.
    pub fn open(&self, name: &str) -> Result<Cache> {
        let path = self.store_path(name);
        {
            let _guard = self.guard();
            if !path.exists() {
                write_entries(&path, &Entries::new())?;
                debug!(cache = name, "Created cache store");
            }
        }
        Ok(Cache {
            name: name.to_string(),
            path,
            lock: Arc::clone(&self.lock),
        })
    }

    /// Delete a store. Returns false if it did not exist.
    pub fn delete(&self, name: &str) -> Result<bool> {
        let path = self.store_path(name);
        let _guard = self.guard();
        if !path.exists() {
            return Ok(false);
        }
        std::fs::remove_file(&path)
            .with_context(|| format!("Failed to delete cache store: {}", name))?;
        Ok(true)
    }

    /// Look a request up across every store, in name order.
    pub fn match_request(&self, request: &Request) -> Result<Option<CachedResponse>> {
        let key = request.cache_key();
        for name in self.keys()? {
            let path = self.store_path(&name);
            let entries = {
                let _guard = self.guard();
                read_entries(&path)?
            };
            if let Some(hit) = entries.get(&key) {
                return Ok(Some(hit.clone()));
            }
        }
        Ok(None)
    }
}

/// One named store.
pub struct Cache {
    name: String,
    path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl Cache {
    fn guard(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn match_request(&self, request: &Request) -> Result<Option<CachedResponse>> {
        let _guard = self.guard();
        let mut entries = read_entries(&self.path)?;
        Ok(entries.remove(&request.cache_key()))
    }

    /// Request keys stored in this cache.
    pub fn keys(&self) -> Result<Vec<String>> {
        let _guard = self.guard();
        Ok(read_entries(&self.path)?.into_keys().collect())
    }

    /// Store a response, replacing any previous entry for the same request.
    pub fn put(&self, request: &Request, response: &Response) -> Result<()> {
        self.put_all(std::slice::from_ref(&(request.clone(), response.clone())))
    }

    /// Store several responses in one write.
    pub fn put_all(&self, pairs: &[(Request, Response)]) -> Result<()> {
        let _guard = self.guard();
        let mut entries = read_entries(&self.path)?;
        for (request, response) in pairs {
            entries.insert(request.cache_key(), CachedResponse::from_response(response));
        }
        write_entries(&self.path, &entries)
            .with_context(|| format!("Failed to write cache store: {}", self.name))
    }
}

fn read_entries(path: &Path) -> Result<Entries> {
    if !path.exists() {
        return Ok(Entries::new());
    }
    let contents = std::fs::read(path)
        .with_context(|| format!("Failed to read cache store: {}", path.display()))?;
    let entries = serde_json::from_slice(&contents)
        .with_context(|| format!("Failed to parse cache store: {}", path.display()))?;
    Ok(entries)
}

/// Write through a temp file so a crash never leaves a half-written store.
fn write_entries(path: &Path, entries: &Entries) -> Result<()> {
    let tmp = path.with_extension(format!("{}.tmp", STORE_EXT));
    let contents = serde_json::to_vec(entries)?;
    std::fs::write(&tmp, contents)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

/// Encode a store name as a file stem: unsafe bytes become `%XX`.
fn encode_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for byte in name.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_') {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{:02X}", byte));
        }
    }
    out
}

fn decode_name(stem: &str) -> Option<String> {
    let bytes = stem.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = stem.get(i + 1..i + 3)?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}

// ============================================================================
// Tests
// ============================================================================
