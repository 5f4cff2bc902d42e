//! Ping table sources: local files, HTTP, and a fingerprinted cache.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::{debug, info};

use crate::error::Result;
use crate::traits::PingSource;

/// Reads the table from a local file.
#[derive(Debug, Clone)]
pub struct FileSource {
    pub path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PingSource for FileSource {
    fn fetch(&self) -> Result<Vec<u8>> {
        let bytes = std::fs::read(&self.path)?;
        debug!(path = %self.path.display(), bytes = bytes.len(), "Read ping table");
        Ok(bytes)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[derive(Debug, Clone)]
pub struct HttpSourceConfig {
    pub url: String,
    pub timeout_secs: u64,
}

impl Default for HttpSourceConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            timeout_secs: 30,
        }
    }
}

/// Downloads the table over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpSource {
    config: HttpSourceConfig,
    client: reqwest::blocking::Client,
}

impl HttpSource {
    pub fn new(config: HttpSourceConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }
}

impl PingSource for HttpSource {
    fn fetch(&self) -> Result<Vec<u8>> {
        let bytes = self
            .client
            .get(&self.config.url)
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.bytes())?;

        info!(url = %self.config.url, bytes = bytes.len(), "Downloaded ping table");
        Ok(bytes.to_vec())
    }

    fn describe(&self) -> String {
        self.config.url.clone()
    }
}

#[derive(Debug, Clone)]
struct CachedPayload {
    fingerprint: u64,
    bytes: Vec<u8>,
}

/// Memoizes another source's payload until explicitly invalidated.
#[derive(Debug)]
pub struct CachedSource<S> {
    inner: S,
    cached: Mutex<Option<CachedPayload>>,
}

impl<S: PingSource> CachedSource<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            cached: Mutex::new(None),
        }
    }

    /// Fingerprint of the cached payload, if one is held.
    pub fn fingerprint(&self) -> Option<u64> {
        self.lock().as_ref().map(|payload| payload.fingerprint)
    }

    /// Drop the cached payload so the next fetch goes to the inner source.
    pub fn invalidate(&self) {
        *self.lock() = None;
    }

    /// Re-fetch from the inner source. Returns `true` if the content changed.
    pub fn refresh(&self) -> Result<bool> {
        self.load().map(|(changed, _)| changed)
    }

    /// Fetch from the inner source and store the result. The returned bytes
    /// are the ones stored, so a concurrent `invalidate` cannot empty them.
    fn load(&self) -> Result<(bool, Vec<u8>)> {
        let bytes = self.inner.fetch()?;
        let fingerprint = fingerprint(&bytes);
        let mut cached = self.lock();
        let changed = cached.as_ref().map(|payload| payload.fingerprint) != Some(fingerprint);
        *cached = Some(CachedPayload {
            fingerprint,
            bytes: bytes.clone(),
        });
        Ok((changed, bytes))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<CachedPayload>> {
        self.cached.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<S: PingSource> PingSource for CachedSource<S> {
    fn fetch(&self) -> Result<Vec<u8>> {
        if let Some(payload) = self.lock().as_ref() {
            debug!(source = %self.inner.describe(), fingerprint = payload.fingerprint, "Cache hit");
            return Ok(payload.bytes.clone());
        }

        self.load().map(|(_, bytes)| bytes)
    }

    fn describe(&self) -> String {
        format!("cached {}", self.inner.describe())
    }
}

/// 64-bit content fingerprint.
pub fn fingerprint(bytes: &[u8]) -> u64 {
    let mut hasher = DefaultHasher::new();
    bytes.hash(&mut hasher);
    hasher.finish()
}
