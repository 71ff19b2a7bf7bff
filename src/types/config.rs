//! Configuration records served by the remote source
//!
//! Both records are stored verbatim in the persistent cache. Unknown fields
//! are ignored on read and absent fields take their zero value, so records
//! written by older or newer versions still load.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A playable media source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Stream {
    /// Base media URL
    #[serde(alias = "URL")]
    pub url: String,

    /// Signing secret; non-empty iff playback requires a token
    #[serde(alias = "Secret")]
    pub secret: String,

    /// Prefix for the token query parameter names (e.g. `zbyutoken`)
    #[serde(alias = "QueryPrefix", alias = "query_prefix")]
    pub query_prefix: String,

    /// Token validity window, e.g. `"1h"`
    #[serde(alias = "Duration")]
    pub duration: String,
}

impl Stream {
    /// Create a stream record
    pub fn new(
        url: impl Into<String>,
        secret: impl Into<String>,
        query_prefix: impl Into<String>,
        duration: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            secret: secret.into(),
            query_prefix: query_prefix.into(),
            duration: duration.into(),
        }
    }

    /// Whether playback of this stream must carry a signed token
    pub fn requires_token(&self) -> bool {
        !self.secret.is_empty()
    }
}

/// A controllable endpoint; attributes are passed through untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Device {
    /// Raw device attributes
    pub attributes: Map<String, Value>,
}

impl Device {
    /// Create a device from an attribute map
    pub fn new(attributes: Map<String, Value>) -> Self {
        Self { attributes }
    }

    /// Look up a single attribute
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// True for the zero value
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}
