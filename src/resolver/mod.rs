//! Caching configuration resolver
//!
//! [`CachingConfigSource`] composes a remote [`ConfigSource`](crate::source::ConfigSource)
//! with the persistent [`RecordStore`](crate::store::RecordStore) and exposes
//! the same lookup contract.
//!
//! ## Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use stream_config_service::{
//!     CachingConfigSource, ConfigSource, CouchConfigSource, Error, Namespaces, RecordStore,
//!     config::CouchSettings,
//! };
//!
//! # tokio_test::block_on(async {
//! // Nothing listens on the discard port, so every remote lookup fails.
//! let settings = CouchSettings {
//!     address: Some("http://127.0.0.1:9".to_string()),
//!     ..CouchSettings::default()
//! };
//! let remote = CouchConfigSource::new(&settings)?;
//! let store = Arc::new(RecordStore::in_memory()?);
//! let resolver = CachingConfigSource::new(remote, store, Namespaces::default())?;
//!
//! // Nothing cached either: the caller sees the remote error.
//! let err = resolver.get_stream_config("rtsp://cam/live").await.unwrap_err();
//! assert!(matches!(err, Error::RemoteUnavailable { .. }));
//! # Ok::<(), Error>(())
//! # });
//! ```

pub mod caching;

pub use caching::{CachingConfigSource, CachingResolver, Namespaces};
