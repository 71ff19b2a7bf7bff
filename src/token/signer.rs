//! Signed playback tokens for secured streams
//!
//! A token is a query-string suffix carrying a validity window and a
//! SHA-256 hash over the stream URL, the secret and that window:
//!
//! ```text
//! signing input: {url}?{secret}&{prefix}endtime={end}&{prefix}starttime={start}
//! suffix:        ?{prefix}starttime={start}&{prefix}endtime={end}&{prefix}hash={hash}
//! ```
//!
//! The hash is standard base64 (with padding) where `+` becomes `-` and `/`
//! becomes `_`. Streaming servers recompute it byte-for-byte, so the layout
//! above must not change.

use crate::{Error, Result, token::parse_duration, types::Stream};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

/// A generated token for one stream and validity window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamToken {
    /// Query parameter prefix copied from the stream
    pub query_prefix: String,
    /// Window start, unix seconds
    pub start_time: i64,
    /// Window end, unix seconds
    pub end_time: i64,
    /// URL-safe base64 SHA-256 digest
    pub hash: String,
}

impl StreamToken {
    /// Generate a token valid from `now` for the stream's duration
    ///
    /// `now` is truncated to whole seconds. The caller decides whether the
    /// stream needs a token at all; nothing here looks at whether the
    /// secret is empty.
    pub fn generate(stream: &Stream, now: DateTime<Utc>) -> Result<Self> {
        let validity = parse_duration(&stream.duration)?;

        let start_time = now.timestamp();
        let start = DateTime::<Utc>::from_timestamp(start_time, 0)
            .ok_or_else(|| Error::internal("token start time out of range"))?;
        let end = start.checked_add_signed(validity).ok_or_else(|| {
            Error::invalid_duration(stream.duration.as_str(), "validity window out of range")
        })?;
        let end_time = end.timestamp();

        let hash = hash_signing_input(&signing_input(stream, start_time, end_time));

        Ok(Self {
            query_prefix: stream.query_prefix.clone(),
            start_time,
            end_time,
            hash,
        })
    }

    /// Render the suffix appended to the playback URL
    pub fn to_query_string(&self) -> String {
        let prefix = &self.query_prefix;
        format!(
            "?{prefix}starttime={}&{prefix}endtime={}&{prefix}hash={}",
            self.start_time, self.end_time, self.hash
        )
    }

    /// Instant at which the token stops being valid
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.end_time, 0)
    }
}

/// Sign `stream` at `now`, returning the query-string suffix
pub fn sign_stream(stream: &Stream, now: DateTime<Utc>) -> Result<String> {
    StreamToken::generate(stream, now).map(|token| token.to_query_string())
}

fn signing_input(stream: &Stream, start_time: i64, end_time: i64) -> String {
    let prefix = &stream.query_prefix;
    format!(
        "{}?{}&{prefix}endtime={end_time}&{prefix}starttime={start_time}",
        stream.url, stream.secret
    )
}

fn hash_signing_input(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    STANDARD.encode(digest).replace('+', "-").replace('/', "_")
}
