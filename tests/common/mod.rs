//! Common test utilities and helpers
//!
//! This module provides shared utilities for integration tests.

#![allow(dead_code)]

use serde_json::{Value, json};
use stream_config_service::{config::Settings, types::Stream};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const STREAM_KEY: &str = "rtsp://cam.local/live";
pub const DEVICE_KEY: &str = "ITB-1101-CP1";

/// A secured stream as stored in the configuration database
pub fn secured_stream() -> Stream {
    Stream::new(STREAM_KEY, "topsecret", "zbyutoken", "1h")
}

/// Body of the stream document
pub fn stream_document() -> Value {
    json!({
        "_id": "streams",
        "_rev": "7-4f1c",
        "streams": {
            STREAM_KEY: {
                "url": STREAM_KEY,
                "secret": "topsecret",
                "queryPrefix": "zbyutoken",
                "duration": "1h"
            },
            "https://cdn/open.m3u8": {
                "url": "https://cdn/open.m3u8"
            }
        }
    })
}

/// Body of the device document
pub fn device_document() -> Value {
    json!({
        "_id": "devices",
        "devices": {
            DEVICE_KEY: {"address": "10.5.34.12", "outputs": 2, "room": "ITB 1101"}
        }
    })
}

/// Mount both configuration documents on `server`
pub async fn mount_documents(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/stream-configs/streams"))
        .respond_with(ResponseTemplate::new(200).set_body_json(stream_document()))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/stream-configs/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(device_document()))
        .mount(server)
        .await;
}

/// Make every request to `server` fail with 503
pub async fn take_down(server: &MockServer) {
    server.reset().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(server)
        .await;
}

/// Settings pointing at `server` with the cache in `cache_dir`
pub fn settings_for(server: &MockServer, cache_dir: &std::path::Path) -> Settings {
    let mut settings = Settings::default();
    settings.couch.address = Some(server.uri());
    settings.couch.request_timeout = 5;
    settings.cache.path = cache_dir.join("cache.db");
    settings
}
