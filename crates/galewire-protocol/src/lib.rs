#![warn(missing_docs)]

//! galewire-protocol: batch framing with optional compression.
//!
//! An envelope is a single outbound message holding one or more
//! varint-length-prefixed sub-packets, compressed as a whole when it exceeds
//! the session's compression threshold. This crate owns:
//! - [`framer::BatchFramer`] - building and parsing envelopes
//! - [`framer::compression`] - the compression strategy dispatch

/// Batch envelope encoding and decoding.
pub mod framer;

pub use framer::BatchFramer;
