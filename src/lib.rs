//! Stream configuration service
//!
//! Resolves per-stream and per-device configuration from a CouchDB
//! database, keeps serving the last known configuration when the database
//! is unreachable, and derives short-lived signed playback URLs for
//! secured streams.
//!
//! # Architecture
//!
//! - [`source`]: the remote lookup contract and its CouchDB client
//! - [`store`]: a SQLite record store with one namespace per entity kind
//! - [`resolver`]: remote-first lookups with write-through caching and
//!   fallback to the last cached record
//! - [`token`]: duration parsing and SHA-256 stream tokens
//! - [`playback`]: signed playback URL construction
//! - [`server`] and [`cli`]: the HTTP surface and the `stream-config` binary
//!
//! # Usage
//!
//! ```bash
//! DB_ADDRESS=http://couch.local:5984 stream-config server --port 9013
//! ```
//!
//! # Examples
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use stream_config_service::{Stream, token::sign_stream};
//!
//! let stream = Stream::new("https://example/a", "sec", "tok", "1h");
//! let now = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
//!
//! let suffix = sign_stream(&stream, now)?;
//! assert!(suffix.starts_with("?tokstarttime=1672531200&tokendtime=1672534800&tokhash="));
//! # Ok::<(), stream_config_service::Error>(())
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod playback;
pub mod resolver;
pub mod server;
pub mod source;
pub mod store;
pub mod token;
pub mod types;
pub mod utils;

pub use config::{ConfigLoader, Settings};
pub use error::{Error, Result};
pub use playback::{PlaybackUrl, PlaybackUrlBuilder};
pub use resolver::{CachingConfigSource, CachingResolver, Namespaces};
pub use source::{ConfigSource, CouchConfigSource};
pub use store::RecordStore;
pub use token::{StreamToken, sign_stream};
pub use types::{Device, ErrorResponse, PingResponse, Stream};
