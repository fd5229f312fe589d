//! Offline resource cache.
//!
//! Every request is classified, then served by one of two policies:
//!
//! - **dynamic** (API and third-party content): network first. A received
//!   response is copied into the store in the background and returned without
//!   waiting for the write. On transport failure the stored copy is served;
//!   without one the transport error is returned unchanged.
//! - **static** (everything else): store first. A hit is returned without
//!   touching the network; a miss is fetched and returned as is.
//!
//! The store is bulk-populated from the static asset manifest by
//! [`OfflineCache::install`], which either stores every asset or none.
//! Store write failures are logged and dropped; store read failures count
//! as misses.

pub mod classify;
pub mod manifest;

pub use classify::{RequestClass, classify};
pub use manifest::{Manifest, ManifestEntry};

use std::collections::HashMap;
use std::sync::Arc;

use noor_core::{AppConfig, CapturedResponse, Error, RequestKey, ResponseStore};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use url::Url;

use crate::fetch::{Transport, resolve};

/// Where a served response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseSource {
    Network,
    Cache,
}

impl ResponseSource {
    pub fn as_str(self) -> &'static str {
        match self {
            ResponseSource::Network => "network",
            ResponseSource::Cache => "cache",
        }
    }
}

/// A response handed back to the requester.
#[derive(Debug, Clone)]
pub struct Served {
    pub url: Url,
    pub class: RequestClass,
    pub source: ResponseSource,
    pub response: CapturedResponse,
}

/// Policy knobs, taken from [`AppConfig`].
#[derive(Debug, Clone)]
pub struct OfflineConfig {
    pub origin: Url,
    pub static_assets: Vec<String>,
    pub dynamic_markers: Vec<String>,
    pub store_static_misses: bool,
}

impl TryFrom<&AppConfig> for OfflineConfig {
    type Error = Error;

    fn try_from(config: &AppConfig) -> Result<Self, Error> {
        let origin = Url::parse(&config.origin).map_err(|e| Error::InvalidUrl(format!("origin: {e}")))?;
        Ok(Self {
            origin,
            static_assets: config.static_assets.clone(),
            dynamic_markers: config.dynamic_markers.clone(),
            store_static_misses: config.store_static_misses,
        })
    }
}

/// Intercepts requests and serves them from the network or the store.
pub struct OfflineCache<T> {
    transport: Arc<T>,
    store: ResponseStore,
    origin: Url,
    manifest: Manifest,
    markers: Vec<String>,
    store_static_misses: bool,
    pending_writes: Mutex<JoinSet<()>>,
}

impl<T: Transport + 'static> OfflineCache<T> {
    pub fn new(transport: T, store: ResponseStore, config: OfflineConfig) -> Result<Self, Error> {
        let manifest = Manifest::resolve(&config.origin, &config.static_assets)?;
        Ok(Self {
            transport: Arc::new(transport),
            store,
            origin: config.origin,
            manifest,
            markers: config.dynamic_markers,
            store_static_misses: config.store_static_misses,
            pending_writes: Mutex::new(JoinSet::new()),
        })
    }

    pub fn store(&self) -> &ResponseStore {
        &self.store
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Resolve a request target (absolute URL or origin-relative path).
    pub fn resolve(&self, target: &str) -> Result<Url, Error> {
        resolve(&self.origin, target).map_err(|e| Error::InvalidUrl(e.to_string()))
    }

    pub fn classify(&self, url: &Url) -> RequestClass {
        classify(url.as_str(), &self.markers)
    }

    /// Fetch every manifest asset and store them together.
    ///
    /// Fails as a unit: a transport error or non-2xx status on any asset
    /// leaves the store untouched. Returns the number of stored assets.
    pub async fn install(&self) -> Result<usize, Error> {
        let mut join_set = JoinSet::new();
        let mut in_flight = HashMap::new();

        for (index, entry) in self.manifest.entries().iter().enumerate() {
            let transport = Arc::clone(&self.transport);
            let url = entry.url.clone();
            let handle = join_set.spawn(async move { (index, transport.fetch(&url).await) });
            in_flight.insert(handle.id(), index);
        }

        let mut fetched: Vec<Option<(RequestKey, CapturedResponse)>> = vec![None; self.manifest.len()];

        while let Some(joined) = join_set.join_next().await {
            let (index, failure) = match joined {
                Ok((index, Ok(response))) if response.status.is_success() => {
                    let url = &self.manifest.entries()[index].url;
                    fetched[index] = Some((RequestKey::get(url.as_str()), response.capture()));
                    continue;
                }
                Ok((index, Ok(response))) => (index, format!("status {}", response.status.as_u16())),
                Ok((index, Err(e))) => (index, e.to_string()),
                Err(e) => match in_flight.get(&e.id()) {
                    Some(&index) => (index, format!("fetch task failed: {e}")),
                    None => return Err(Error::ManifestFailed { path: "<unknown>".into(), reason: e.to_string() }),
                },
            };

            join_set.shutdown().await;
            let path = self.manifest.entries()[index].path.clone();
            tracing::warn!(store = self.store.name(), path = %path, "install failed: {failure}");
            return Err(Error::ManifestFailed { path, reason: failure });
        }

        let entries: Vec<_> = fetched.into_iter().flatten().collect();
        let written = self.store.add_all(&entries).await?;
        tracing::info!(store = self.store.name(), assets = written, "offline cache installed");
        Ok(written)
    }

    /// Serve one request according to its class.
    pub async fn handle(&self, target: &str) -> Result<Served, Error> {
        let url = self.resolve(target)?;
        let class = self.classify(&url);
        let key = RequestKey::get(url.as_str());

        match class {
            RequestClass::Dynamic => self.network_first(url, key).await,
            RequestClass::Static => self.cache_first(url, key).await,
        }
    }

    /// Store lookup without touching the network.
    pub async fn lookup(&self, target: &str) -> Result<Option<CapturedResponse>, Error> {
        let url = self.resolve(target)?;
        self.store.match_request(&RequestKey::get(url.as_str())).await
    }

    /// Wait for background store writes issued so far.
    pub async fn flush(&self) {
        let mut tasks = std::mem::take(&mut *self.pending_writes.lock().await);
        while let Some(result) = tasks.join_next().await {
            if let Err(e) = result {
                tracing::warn!("cache write task failed: {e}");
            }
        }
    }

    async fn network_first(&self, url: Url, key: RequestKey) -> Result<Served, Error> {
        match self.transport.fetch(&url).await {
            Ok(response) => {
                let captured = response.capture();
                self.spawn_put(key, captured.clone()).await;
                Ok(Served { url, class: RequestClass::Dynamic, source: ResponseSource::Network, response: captured })
            }
            Err(err) if err.is_transport() => match self.store.match_request(&key).await {
                Ok(Some(cached)) => {
                    tracing::info!(%url, "network unavailable, serving stored response");
                    Ok(Served { url, class: RequestClass::Dynamic, source: ResponseSource::Cache, response: cached })
                }
                Ok(None) => Err(err),
                Err(read_err) => {
                    tracing::debug!(%url, "store read failed during fallback: {read_err}");
                    Err(err)
                }
            },
            Err(err) => Err(err),
        }
    }

    async fn cache_first(&self, url: Url, key: RequestKey) -> Result<Served, Error> {
        match self.store.match_request(&key).await {
            Ok(Some(cached)) => {
                return Ok(Served { url, class: RequestClass::Static, source: ResponseSource::Cache, response: cached });
            }
            Ok(None) => {}
            Err(e) => tracing::debug!(%url, "store read failed, treating as miss: {e}"),
        }

        let response = self.transport.fetch(&url).await?;
        let captured = response.capture();

        if self.store_static_misses && captured.is_ok() {
            self.spawn_put(key, captured.clone()).await;
        }

        Ok(Served { url, class: RequestClass::Static, source: ResponseSource::Network, response: captured })
    }

    /// Write to the store without making the caller wait for it.
    async fn spawn_put(&self, key: RequestKey, response: CapturedResponse) {
        let store = self.store.clone();
        let mut pending = self.pending_writes.lock().await;

        // Reap finished writes so the set stays small.
        while pending.try_join_next().is_some() {}

        pending.spawn(async move {
            if let Err(e) = store.put(&key, &response).await {
                tracing::debug!(url = %key.url, "cache write dropped: {e}");
            }
        });
    }
}
