//! Response type definitions
//!
//! Defines the JSON bodies returned by the HTTP surface.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Stream;

/// Stream configuration as exposed over HTTP; the secret never leaves the service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamConfigResponse {
    /// Base media URL
    pub url: String,

    /// Token query parameter prefix
    #[serde(rename = "queryPrefix")]
    pub query_prefix: String,

    /// Token validity window
    pub duration: String,

    /// Whether playback requires a signed token
    pub secured: bool,
}

impl From<&Stream> for StreamConfigResponse {
    fn from(stream: &Stream) -> Self {
        Self {
            url: stream.url.clone(),
            query_prefix: stream.query_prefix.clone(),
            duration: stream.duration.clone(),
            secured: stream.requires_token(),
        }
    }
}

/// Ping response for health checks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PingResponse {
    /// Server uptime in seconds
    pub server_uptime: u64,

    /// Server version
    pub version: String,
}

impl PingResponse {
    /// Create a new ping response
    pub fn new(server_uptime: u64, version: impl Into<String>) -> Self {
        Self {
            server_uptime,
            version: version.into(),
        }
    }
}

/// Simple status body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub message: String,
}

impl StatusResponse {
    pub fn ok() -> Self {
        Self {
            message: "ok".to_string(),
        }
    }
}

/// Error response for API errors
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,

    /// Optional error context
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,

    /// Error timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,

    /// Service version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            context: None,
            timestamp: Some(Utc::now()),
            version: Some(crate::utils::version::get_version().to_string()),
        }
    }

    /// Create error response with context
    pub fn with_context(error: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            context: Some(context.into()),
            ..Self::new(error)
        }
    }
}
