//! Remote-first configuration resolver with a persistent fallback
//!
//! Every lookup goes to the remote source first. A successful answer is
//! written through to the record store and returned; a failed one is
//! replaced by the last cached answer for the same key when there is one.
//! When both paths fail the caller gets the remote error, and the cache
//! error only shows up in the logs.
//!
//! Store calls are blocking SQLite I/O and run on the blocking thread pool.

use crate::{
    Error, Result,
    source::{ConfigSource, CouchConfigSource},
    store::RecordStore,
    types::{Device, Stream},
};
use serde::{Serialize, de::DeserializeOwned};
use std::future::Future;
use std::path::Path;
use std::sync::Arc;

/// Store namespaces used by the resolver, one per entity kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespaces {
    pub streams: String,
    pub devices: String,
}

impl Namespaces {
    pub fn new(streams: impl Into<String>, devices: impl Into<String>) -> Self {
        Self {
            streams: streams.into(),
            devices: devices.into(),
        }
    }
}

impl Default for Namespaces {
    fn default() -> Self {
        Self::new("streams", "devices")
    }
}

impl From<(&str, &str)> for Namespaces {
    fn from((streams, devices): (&str, &str)) -> Self {
        Self::new(streams, devices)
    }
}

/// Resolver over the CouchDB source, as wired by the server
pub type CachingResolver = CachingConfigSource<CouchConfigSource>;

/// Caching wrapper around any [`ConfigSource`]
#[derive(Debug)]
pub struct CachingConfigSource<S: ConfigSource> {
    remote: S,
    store: Arc<RecordStore>,
    namespaces: Namespaces,
}

impl<S: ConfigSource> CachingConfigSource<S> {
    /// Wrap `remote`, creating both namespaces in `store` if needed
    pub fn new(remote: S, store: Arc<RecordStore>, namespaces: Namespaces) -> Result<Self> {
        store.ensure_namespaces([namespaces.streams.as_str(), namespaces.devices.as_str()])?;

        tracing::info!(
            "Configuration cache ready at {} (namespaces: {}, {})",
            store.path().display(),
            namespaces.streams,
            namespaces.devices
        );

        Ok(Self {
            remote,
            store,
            namespaces,
        })
    }

    /// Open the store file at `path` and wrap `remote`
    pub fn open<P: AsRef<Path>>(remote: S, path: P, namespaces: Namespaces) -> Result<Self> {
        let store = Arc::new(RecordStore::open(path)?);
        Self::new(remote, store, namespaces)
    }

    /// The backing store
    pub fn store(&self) -> &Arc<RecordStore> {
        &self.store
    }

    /// The namespaces records are filed under
    pub fn namespaces(&self) -> &Namespaces {
        &self.namespaces
    }

    /// The wrapped remote source
    pub fn remote(&self) -> &S {
        &self.remote
    }

    /// Run `op` against the store on the blocking thread pool
    async fn with_store<R, F>(&self, op: F) -> Result<R>
    where
        F: FnOnce(&RecordStore) -> Result<R> + Send + 'static,
        R: Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || op(&store))
            .await
            .map_err(|e| Error::internal(format!("record store task failed: {}", e)))?
    }

    async fn resolve<T, F>(&self, namespace: &str, key: &str, fetch: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned + Clone + Send + 'static,
        F: Future<Output = Result<T>>,
    {
        let (ns, owned_key) = (namespace.to_string(), key.to_string());
        match fetch.await {
            Ok(value) => {
                let record = value.clone();
                let written = self
                    .with_store(move |store| store.put_record(&ns, &owned_key, &record))
                    .await;
                if let Err(e) = written {
                    tracing::warn!(
                        "Failed to cache '{}' in namespace '{}': {}",
                        key,
                        namespace,
                        e
                    );
                } else {
                    tracing::debug!("Cached '{}' in namespace '{}'", key, namespace);
                }
                Ok(value)
            }
            Err(remote_err) => match self
                .with_store(move |store| store.get_record::<T>(&ns, &owned_key))
                .await
            {
                Ok(cached) => {
                    tracing::warn!(
                        "Remote lookup of '{}' failed, serving cached record: {}",
                        key,
                        remote_err
                    );
                    Ok(cached)
                }
                Err(cache_err) => {
                    tracing::error!(
                        "Remote lookup of '{}' failed ({}) and no usable cached record exists: {}",
                        key,
                        remote_err,
                        cache_err
                    );
                    Err(remote_err)
                }
            },
        }
    }
}

impl<S: ConfigSource> CachingConfigSource<S> {
    /// Read a cached stream without touching the remote source
    pub fn cached_stream(&self, stream_url: &str) -> Result<Stream> {
        self.store.get_record(&self.namespaces.streams, stream_url)
    }

    /// Read a cached device without touching the remote source
    pub fn cached_device(&self, hostname: &str) -> Result<Device> {
        self.store.get_record(&self.namespaces.devices, hostname)
    }
}

#[async_trait::async_trait]
impl<S: ConfigSource> ConfigSource for CachingConfigSource<S> {
    async fn get_stream_config(&self, stream_url: &str) -> Result<Stream> {
        self.resolve(
            &self.namespaces.streams,
            stream_url,
            self.remote.get_stream_config(stream_url),
        )
        .await
    }

    async fn get_device_config(&self, hostname: &str) -> Result<Device> {
        self.resolve(
            &self.namespaces.devices,
            hostname,
            self.remote.get_device_config(hostname),
        )
        .await
    }
}
