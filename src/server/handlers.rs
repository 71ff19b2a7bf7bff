//! HTTP request handlers
//!
//! Implementation of HTTP endpoints for the configuration service.

use crate::{
    Error,
    error::format_error_for_api,
    server::app::AppState,
    source::ConfigSource,
    types::{ErrorResponse, PingResponse, StatusResponse, StreamConfigResponse},
    utils::version,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

/// HTTP status for a lookup or signing failure
pub fn status_for_error(error: &Error) -> StatusCode {
    match error {
        Error::RemoteUnavailable { .. } => StatusCode::BAD_GATEWAY,
        Error::NotCached { .. } => StatusCode::NOT_FOUND,
        Error::InvalidDuration { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(error: &Error) -> Response {
    (status_for_error(error), Json(format_error_for_api(error))).into_response()
}

fn resolver_or_unavailable(state: &AppState) -> Result<&Arc<dyn ConfigSource>, Response> {
    state.resolver.as_ref().ok_or_else(|| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse::with_context(
                "No configuration database configured",
                "resolver",
            )),
        )
            .into_response()
    })
}

/// Stream configuration endpoint
///
/// GET /api/v1/stream/{stream_url}
///
/// The secret is never included in the response.
pub async fn get_stream(State(state): State<AppState>, Path(stream_url): Path<String>) -> Response {
    let resolver = match resolver_or_unavailable(&state) {
        Ok(resolver) => resolver,
        Err(response) => return response,
    };

    match resolver.get_stream_config(&stream_url).await {
        Ok(stream) => Json(StreamConfigResponse::from(&stream)).into_response(),
        Err(e) => {
            tracing::error!("Failed to resolve stream '{}': {}", stream_url, e);
            error_response(&e)
        }
    }
}

/// Device configuration endpoint
///
/// GET /api/v1/device/{hostname}
pub async fn get_device(State(state): State<AppState>, Path(hostname): Path<String>) -> Response {
    let resolver = match resolver_or_unavailable(&state) {
        Ok(resolver) => resolver,
        Err(response) => return response,
    };

    match resolver.get_device_config(&hostname).await {
        Ok(device) => Json(device).into_response(),
        Err(e) => {
            tracing::error!("Failed to resolve device '{}': {}", hostname, e);
            error_response(&e)
        }
    }
}

/// Playback URL endpoint
///
/// GET /api/v1/playback/{stream_url}
///
/// Works without a resolver too; the URL is then never signed.
pub async fn get_playback(
    State(state): State<AppState>,
    Path(stream_url): Path<String>,
) -> Response {
    match state.playback.build(&stream_url, chrono::Utc::now()).await {
        Ok(playback) => Json(playback).into_response(),
        Err(e) => {
            tracing::error!("Failed to build playback URL for '{}': {}", stream_url, e);
            error_response(&e)
        }
    }
}

/// Ping endpoint for health checks
///
/// GET /ping
///
/// Returns server status and uptime information.
pub async fn ping(State(state): State<AppState>) -> Json<PingResponse> {
    let uptime = state.start_time.elapsed().as_secs();
    let response = PingResponse::new(uptime, version::get_version());

    tracing::debug!(
        "Ping response: uptime={}s, version={}",
        uptime,
        version::get_version()
    );
    Json(response)
}

/// Liveness endpoint
///
/// GET /status
pub async fn status() -> Json<StatusResponse> {
    Json(StatusResponse::ok())
}
