#![warn(missing_docs)]

//! galewire-peer: per-connection fragmentation and reassembly.
//!
//! Each peer connection owns one [`FragmentTransport`]. Outbound payloads are
//! split into bounded, countdown-tagged wire messages; inbound wire messages
//! are reassembled, in arrival order, back into logical packets.

/// Fragmentation transport for a single peer connection.
pub mod fragment;

pub use fragment::FragmentTransport;
