//! Type definitions for the configuration service
//!
//! This module contains the configuration records and the HTTP response bodies.

pub mod config;
pub mod response;

pub use config::{Device, Stream};
pub use response::{ErrorResponse, PingResponse, StatusResponse, StreamConfigResponse};
