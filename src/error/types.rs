//! Error classification for configuration resolution
//!
//! Remote, store and signing failures are kept as distinct variants so the
//! resolver can decide which ones to surface and which ones to log.

use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error)]
pub enum Error {
    /// The authoritative configuration source could not answer
    #[error("Remote configuration source unavailable during {operation}: {message}")]
    RemoteUnavailable {
        /// Lookup that was attempted (e.g. `stream_config`)
        operation: String,
        /// Underlying failure description
        message: String,
    },

    /// A store namespace was never created
    #[error("Cache namespace '{namespace}' does not exist")]
    NamespaceMissing {
        /// Name of the missing namespace
        namespace: String,
    },

    /// The store holds no record for this key
    #[error("No cached record for '{key}' in namespace '{namespace}'")]
    NotCached {
        /// Namespace that was searched
        namespace: String,
        /// Key that was not found
        key: String,
    },

    /// A stored record could not be deserialized
    #[error("Failed to decode cached record '{key}' in namespace '{namespace}'")]
    DecodeFailure {
        /// Namespace holding the record
        namespace: String,
        /// Key of the corrupt record
        key: String,
        /// Deserialization error
        #[source]
        source: serde_json::Error,
    },

    /// A record could not be serialized for write-through
    #[error("Failed to encode record '{key}' for namespace '{namespace}'")]
    EncodeFailure {
        /// Target namespace
        namespace: String,
        /// Key of the record
        key: String,
        /// Serialization error
        #[source]
        source: serde_json::Error,
    },

    /// Token validity window could not be parsed
    #[error("Invalid duration '{value}': {reason}")]
    InvalidDuration {
        /// The raw duration string
        value: String,
        /// Why parsing failed
        reason: String,
    },

    /// SQLite errors from the persistent store
    #[error("Store error: {0}")]
    Store(#[from] rusqlite::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML configuration parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing errors
    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error in {field}: {message}")]
    Config {
        /// The configuration field that has an error
        field: String,
        /// Error message describing the issue
        message: String,
    },

    /// Validation errors
    #[error("Validation failed for {field}: {message}")]
    Validation {
        /// The field that failed validation
        field: String,
        /// Error message describing the validation failure
        message: String,
    },

    /// Generic internal errors
    #[error("Internal error: {message}")]
    Internal {
        /// Error message describing the internal issue
        message: String,
    },
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a remote-unavailable error
    pub fn remote_unavailable<S: Into<String>>(operation: S, message: S) -> Self {
        Self::RemoteUnavailable {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create a namespace-missing error
    pub fn namespace_missing(namespace: impl Into<String>) -> Self {
        Self::NamespaceMissing {
            namespace: namespace.into(),
        }
    }

    /// Create a not-cached error
    pub fn not_cached<S: Into<String>>(namespace: S, key: S) -> Self {
        Self::NotCached {
            namespace: namespace.into(),
            key: key.into(),
        }
    }

    /// Create an invalid-duration error
    pub fn invalid_duration<S: Into<String>>(value: S, reason: S) -> Self {
        Self::InvalidDuration {
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(field: S, message: S) -> Self {
        Self::Config {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation<S: Into<String>>(field: S, message: S) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Check if this is a retryable error
    ///
    /// Only remote failures are transient; store and signing failures
    /// reproduce on every attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::RemoteUnavailable { .. })
    }

    /// Whether the error comes from the persistent store path
    pub fn is_cache_error(&self) -> bool {
        matches!(
            self,
            Error::NamespaceMissing { .. }
                | Error::NotCached { .. }
                | Error::DecodeFailure { .. }
                | Error::EncodeFailure { .. }
                | Error::Store(..)
        )
    }

    /// Get error category for logging/metrics
    pub fn category(&self) -> &'static str {
        match self {
            Error::RemoteUnavailable { .. } => "remote_unavailable",
            Error::NamespaceMissing { .. } => "namespace_missing",
            Error::NotCached { .. } => "not_cached",
            Error::DecodeFailure { .. } => "decode_failure",
            Error::EncodeFailure { .. } => "encode_failure",
            Error::InvalidDuration { .. } => "invalid_duration",
            Error::Store(..) => "store",
            Error::Json(..) => "json",
            Error::Toml(..) => "toml",
            Error::Url(..) => "url",
            Error::Io(..) => "io",
            Error::Config { .. } => "config",
            Error::Validation { .. } => "validation",
            Error::Internal { .. } => "internal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = Error::config("port", "test config error");
        assert!(matches!(err, Error::Config { .. }));
        assert_eq!(
            err.to_string(),
            "Configuration error in port: test config error"
        );
    }

    #[test]
    fn test_error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json");
        assert!(json_err.is_err());

        let err: Error = json_err.unwrap_err().into();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_remote_unavailable_is_retryable() {
        let err = Error::remote_unavailable("stream_config", "connection refused");
        assert!(err.is_retryable());
        assert!(!err.is_cache_error());
        assert_eq!(err.category(), "remote_unavailable");
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_cache_errors() {
        let missing = Error::namespace_missing("streams");
        let absent = Error::not_cached("devices", "host-1");

        assert!(missing.is_cache_error());
        assert!(absent.is_cache_error());
        assert!(!absent.is_retryable());
        assert!(absent.to_string().contains("host-1"));
        assert!(missing.to_string().contains("streams"));
    }

    #[test]
    fn test_decode_failure_keeps_source() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = Error::DecodeFailure {
            namespace: "streams".to_string(),
            key: "rtsp://cam".to_string(),
            source,
        };

        assert_eq!(err.category(), "decode_failure");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_invalid_duration_error() {
        let err = Error::invalid_duration("1x", "unknown unit \"x\"");
        assert!(matches!(err, Error::InvalidDuration { .. }));
        assert!(err.to_string().contains("Invalid duration '1x'"));
    }
}
