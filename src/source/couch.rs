//! CouchDB configuration source
//!
//! Stream and device configuration live in two documents of one database:
//!
//! ```json
//! { "_id": "streams", "streams": { "<stream url>": { "url": "...", ... } } }
//! { "_id": "devices", "devices": { "<hostname>": { ... } } }
//! ```
//!
//! Every failure (transport, HTTP status, malformed body) is reported as
//! [`Error::RemoteUnavailable`].

use crate::{
    Error, Result,
    config::settings::CouchSettings,
    source::ConfigSource,
    types::{Device, Stream},
};
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

#[derive(Debug, Default, Deserialize)]
struct StreamDocument {
    #[serde(default)]
    streams: HashMap<String, Stream>,
}

#[derive(Debug, Default, Deserialize)]
struct DeviceDocument {
    #[serde(default)]
    devices: HashMap<String, Device>,
}

/// HTTP client for the configuration database
#[derive(Debug, Clone)]
pub struct CouchConfigSource {
    client: Client,
    base_url: Url,
    username: Option<String>,
    password: Option<String>,
    database: String,
    stream_document: String,
    device_document: String,
}

impl CouchConfigSource {
    /// Build a client from settings; fails if no address is configured
    pub fn new(settings: &CouchSettings) -> Result<Self> {
        let address = settings
            .address
            .as_deref()
            .ok_or_else(|| Error::config("couch.address", "no database address configured"))?;

        let base_url = Url::parse(address)?;
        if base_url.cannot_be_a_base() {
            return Err(Error::config(
                "couch.address",
                &format!("'{}' cannot be used as a base URL", address),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout))
            .user_agent(crate::utils::version::user_agent())
            .build()
            .map_err(|e| {
                Error::config("couch", &format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url,
            username: settings.username.clone(),
            password: settings.password.clone(),
            database: settings.database.clone(),
            stream_document: settings.stream_document.clone(),
            device_document: settings.device_document.clone(),
        })
    }

    fn document_url(&self, document: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::internal("database address cannot be a base URL"))?
            .pop_if_empty()
            .push(&self.database)
            .push(document);
        Ok(url)
    }

    async fn fetch_document<T: DeserializeOwned>(
        &self,
        operation: &str,
        document: &str,
    ) -> Result<T> {
        let url = self.document_url(document)?;
        tracing::debug!("Fetching configuration document {}", url);

        let mut request = self.client.get(url);
        if let Some(username) = &self.username {
            request = request.basic_auth(username, self.password.as_ref());
        }

        let response = request.send().await.map_err(|e| {
            tracing::warn!("Configuration database request failed: {}", e);
            Error::remote_unavailable(operation, &format!("request failed: {}", e))
        })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(
                "Configuration database returned {} for document '{}'",
                status,
                document
            );
            return Err(Error::remote_unavailable(
                operation,
                &format!("document '{}' returned status {}", document, status),
            ));
        }

        response.json::<T>().await.map_err(|e| {
            tracing::warn!("Failed to parse configuration document '{}': {}", document, e);
            Error::remote_unavailable(operation, &format!("invalid document '{}': {}", document, e))
        })
    }
}

#[async_trait::async_trait]
impl ConfigSource for CouchConfigSource {
    async fn get_stream_config(&self, stream_url: &str) -> Result<Stream> {
        let document: StreamDocument = self
            .fetch_document("stream_config", &self.stream_document)
            .await?;

        // An unknown key is not an error: the zero value is returned as-is.
        Ok(document
            .streams
            .get(stream_url)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_device_config(&self, hostname: &str) -> Result<Device> {
        let document: DeviceDocument = self
            .fetch_document("device_config", &self.device_document)
            .await?;

        Ok(document
            .devices
            .get(hostname)
            .cloned()
            .unwrap_or_default())
    }
}
