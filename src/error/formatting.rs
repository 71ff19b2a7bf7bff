//! Error formatting utilities
//!
//! Renders errors for HTTP responses and structured logs with the full
//! chain of causes.

use crate::Error;
use serde_json;
use std::error::Error as StdError;

/// Format error for display, appending nested causes
pub fn format_error(error: &Error) -> String {
    let formatted = match error {
        Error::RemoteUnavailable { operation, message } => {
            format!("Remote source unavailable ({}): {}", operation, message)
        }

        Error::NotCached { namespace, key } => {
            format!("'{}' is not cached in {}", key, namespace)
        }

        Error::InvalidDuration { value, reason } => {
            format!("Invalid token duration '{}': {}", value, reason)
        }

        Error::Config { field, message } => {
            format!("Configuration error in {}: {}", field, message)
        }

        // For other errors, use their Display implementation
        _ => error.to_string(),
    };

    let mut result = formatted;
    let mut source = error.source();

    while let Some(cause) = source {
        if !result.contains(&cause.to_string()) {
            result = format!("{} (caused by {})", result, cause);
        }
        source = cause.source();
    }

    result
}

/// Format error for JSON API responses
pub fn format_error_for_api(error: &Error) -> serde_json::Value {
    serde_json::json!({
        "error": format_error(error),
        "category": error.category(),
        "retryable": error.is_retryable(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    })
}

/// Format error for logging with structured data
pub fn format_error_for_logging(error: &Error) -> serde_json::Value {
    let mut log_data = serde_json::json!({
        "message": format_error(error),
        "category": error.category(),
        "retryable": error.is_retryable(),
    });

    match error {
        Error::NotCached { namespace, key }
        | Error::DecodeFailure { namespace, key, .. }
        | Error::EncodeFailure { namespace, key, .. } => {
            log_data["namespace"] = serde_json::Value::String(namespace.clone());
            log_data["key"] = serde_json::Value::String(key.clone());
        }
        Error::NamespaceMissing { namespace } => {
            log_data["namespace"] = serde_json::Value::String(namespace.clone());
        }
        Error::RemoteUnavailable { operation, .. } => {
            log_data["operation"] = serde_json::Value::String(operation.clone());
        }
        _ => {}
    }

    log_data
}
