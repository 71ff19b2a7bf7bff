//! Persistent cache storage
//!
//! Holds the last successfully resolved configuration records so they can
//! be served while the remote source is unreachable.

pub mod record_store;

pub use record_store::RecordStore;
