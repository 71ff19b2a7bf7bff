//! Playback URL construction
//!
//! This is where signing is gated: a stream is signed only when a resolver
//! is configured, the lookup succeeds and the resolved record carries a
//! non-empty secret. A failed lookup does not block playback, the plain
//! URL is used instead.

use crate::{Error, Result, source::ConfigSource, token::StreamToken};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

/// URL handed to the player
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaybackUrl {
    /// Decoded URL, including the token suffix when signed
    pub url: String,
    /// Whether a token suffix was appended
    pub signed: bool,
    /// End of the token validity window
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Builds playback URLs, signing them when the stream requires it
#[derive(Clone, Default)]
pub struct PlaybackUrlBuilder {
    source: Option<Arc<dyn ConfigSource>>,
}

impl PlaybackUrlBuilder {
    pub fn new(source: Option<Arc<dyn ConfigSource>>) -> Self {
        Self { source }
    }

    /// Builder that signs through `source`
    pub fn with_source(source: Arc<dyn ConfigSource>) -> Self {
        Self {
            source: Some(source),
        }
    }

    /// Builder that never signs
    pub fn unsigned() -> Self {
        Self { source: None }
    }

    /// Build the playback URL for `stream_url` at `now`
    ///
    /// Token generation failures are returned; lookup failures are not.
    pub async fn build(&self, stream_url: &str, now: DateTime<Utc>) -> Result<PlaybackUrl> {
        let mut url = stream_url.to_string();
        let mut expires_at = None;

        if let Some(source) = &self.source {
            match source.get_stream_config(stream_url).await {
                Ok(stream) if stream.requires_token() => {
                    let token = StreamToken::generate(&stream, now).inspect_err(|e| {
                        tracing::error!("Failed to generate token for '{}': {}", stream_url, e);
                    })?;
                    tracing::info!(
                        "Generated token for '{}' valid until {}",
                        stream_url,
                        token.end_time
                    );
                    url.push_str(&token.to_query_string());
                    expires_at = token.expires_at();
                }
                Ok(_) => {
                    tracing::debug!("Stream '{}' is not secured", stream_url);
                }
                Err(e) => {
                    tracing::warn!(
                        "Stream lookup for '{}' failed, playing unsigned: {}",
                        stream_url,
                        e
                    );
                }
            }
        }

        let url = urlencoding::decode(&url)
            .map_err(|e| {
                Error::validation("stream_url", &format!("failed to unescape stream url: {}", e))
            })?
            .into_owned();

        Ok(PlaybackUrl {
            url,
            signed: expires_at.is_some(),
            expires_at,
        })
    }
}

impl std::fmt::Debug for PlaybackUrlBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackUrlBuilder")
            .field("has_source", &self.source.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Device, Stream};
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StaticSource {
        stream: Option<Stream>,
        lookups: AtomicUsize,
    }

    impl StaticSource {
        fn new(stream: Option<Stream>) -> Arc<Self> {
            Arc::new(Self {
                stream,
                lookups: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait::async_trait]
    impl ConfigSource for StaticSource {
        async fn get_stream_config(&self, _stream_url: &str) -> Result<Stream> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            self.stream
                .clone()
                .ok_or_else(|| Error::remote_unavailable("stream_config", "offline"))
        }

        async fn get_device_config(&self, _hostname: &str) -> Result<Device> {
            Ok(Device::default())
        }
    }

    fn new_year() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_secured_stream_is_signed() {
        let source = StaticSource::new(Some(Stream::new("https://example/a", "sec", "tok", "1h")));
        let builder = PlaybackUrlBuilder::with_source(source);

        let playback = builder.build("https://example/a", new_year()).await.unwrap();

        assert!(playback.signed);
        assert_eq!(
            playback.url,
            "https://example/a?tokstarttime=1672531200&tokendtime=1672534800\
             &tokhash=QIYkBCXDirlJWazYPT1_BUVOPPPQm4hRGTP00pE0jrU="
        );
        assert_eq!(
            playback.expires_at,
            Some(Utc.with_ymd_and_hms(2023, 1, 1, 1, 0, 0).unwrap())
        );
    }

    #[tokio::test]
    async fn test_empty_secret_is_never_signed() {
        // The duration is unparseable, so reaching the generator would fail.
        let source = StaticSource::new(Some(Stream::new("https://example/a", "", "tok", "bogus")));
        let builder = PlaybackUrlBuilder::with_source(source.clone());

        let playback = builder.build("https://example/a", new_year()).await.unwrap();

        assert_eq!(
            playback,
            PlaybackUrl {
                url: "https://example/a".to_string(),
                signed: false,
                expires_at: None,
            }
        );
        assert_eq!(source.lookups.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_lookup_failure_plays_unsigned() {
        let builder = PlaybackUrlBuilder::with_source(StaticSource::new(None));

        let playback = builder.build("https://example/a", new_year()).await.unwrap();

        assert!(!playback.signed);
        assert_eq!(playback.url, "https://example/a");
    }

    #[tokio::test]
    async fn test_without_source_nothing_is_looked_up() {
        let playback = PlaybackUrlBuilder::unsigned()
            .build("https://example/a", new_year())
            .await
            .unwrap();

        assert!(!playback.signed);
    }

    #[tokio::test]
    async fn test_signing_failure_is_surfaced() {
        let source = StaticSource::new(Some(Stream::new("https://example/a", "sec", "tok", "1d")));
        let builder = PlaybackUrlBuilder::with_source(source);

        let err = builder.build("https://example/a", new_year()).await.unwrap_err();
        assert!(matches!(err, Error::InvalidDuration { .. }));
    }

    #[tokio::test]
    async fn test_url_is_unescaped() {
        let playback = PlaybackUrlBuilder::unsigned()
            .build("rtsp%3A%2F%2Fcam.local%2Flive%20feed", new_year())
            .await
            .unwrap();

        assert_eq!(playback.url, "rtsp://cam.local/live feed");
    }

    #[tokio::test]
    async fn test_plus_sign_survives_unescaping() {
        let playback = PlaybackUrlBuilder::unsigned()
            .build("https%3A%2F%2Fcdn%2Fa+b.m3u8?x=1%2B2", new_year())
            .await
            .unwrap();

        assert_eq!(playback.url, "https://cdn/a+b.m3u8?x=1+2");
    }
}
