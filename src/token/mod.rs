//! Stream token generation
//!
//! Pure functions: given a stream record and the current time they derive
//! the signed query suffix for a playback URL. No I/O, no shared state.

pub mod duration;
pub mod signer;

pub use duration::parse_duration;
pub use signer::{StreamToken, sign_stream};
