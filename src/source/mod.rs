//! Configuration sources
//!
//! A [`ConfigSource`] answers stream and device lookups. The CouchDB client
//! is the authoritative implementation; the caching resolver wraps any
//! source behind the same contract.

pub mod couch;

pub use couch::CouchConfigSource;

use crate::{
    Result,
    types::{Device, Stream},
};
use std::sync::Arc;

/// Lookup contract shared by remote sources and the caching resolver
///
/// Cancellation is inherited from the caller: dropping the returned future
/// abandons the lookup.
#[async_trait::async_trait]
pub trait ConfigSource: Send + Sync {
    /// Resolve the configuration of the stream identified by `stream_url`
    async fn get_stream_config(&self, stream_url: &str) -> Result<Stream>;

    /// Resolve the configuration of the device identified by `hostname`
    async fn get_device_config(&self, hostname: &str) -> Result<Device>;
}

#[async_trait::async_trait]
impl<T: ConfigSource + ?Sized> ConfigSource for Arc<T> {
    async fn get_stream_config(&self, stream_url: &str) -> Result<Stream> {
        (**self).get_stream_config(stream_url).await
    }

    async fn get_device_config(&self, hostname: &str) -> Result<Device> {
        (**self).get_device_config(hostname).await
    }
}
