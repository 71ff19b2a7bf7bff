//! Axum application setup
//!
//! Creates and configures the Axum application with routes and middleware.

use crate::{
    Result,
    config::Settings,
    playback::PlaybackUrlBuilder,
    resolver::CachingConfigSource,
    source::{ConfigSource, CouchConfigSource},
};
use axum::{Router, routing::get};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Caching resolver; `None` when no database address is configured
    pub resolver: Option<Arc<dyn ConfigSource>>,
    /// Signs playback URLs through the resolver
    pub playback: PlaybackUrlBuilder,
    /// Application settings
    pub settings: Arc<Settings>,
    /// Server start time for uptime calculation
    pub start_time: std::time::Instant,
}

impl AppState {
    pub fn new(settings: Settings, resolver: Option<Arc<dyn ConfigSource>>) -> Self {
        Self {
            playback: PlaybackUrlBuilder::new(resolver.clone()),
            resolver,
            settings: Arc::new(settings),
            start_time: std::time::Instant::now(),
        }
    }
}

/// Build the caching resolver described by `settings`
///
/// Returns `None` when no database address is configured. Opening the cache
/// file happens here, so a bad cache path fails at startup.
pub fn build_resolver(settings: &Settings) -> Result<Option<Arc<dyn ConfigSource>>> {
    if !settings.has_remote_source() {
        return Ok(None);
    }

    let remote = CouchConfigSource::new(&settings.couch)?;
    let resolver: Arc<dyn ConfigSource> = Arc::new(CachingConfigSource::open(
        remote,
        &settings.cache.path,
        settings.cache.namespaces(),
    )?);

    Ok(Some(resolver))
}

/// Create the main Axum application with routes and middleware
pub fn create_app(settings: Settings, resolver: Option<Arc<dyn ConfigSource>>) -> Router {
    let state = AppState::new(settings, resolver);

    Router::new()
        .route("/ping", get(super::handlers::ping))
        .route("/status", get(super::handlers::status))
        .route(
            "/api/v1/stream/{*stream_url}",
            get(super::handlers::get_stream),
        )
        .route(
            "/api/v1/device/{hostname}",
            get(super::handlers::get_device),
        )
        .route(
            "/api/v1/playback/{*stream_url}",
            get(super::handlers::get_playback),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
