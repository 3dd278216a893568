#![warn(missing_docs)]

//! galewire-core: foundational types shared across all layers.
//!
//! This crate provides the minimal set of core utilities used by the
//! protocol and peer crates:
//! - Configuration types
//! - Error handling
//! - Protocol constants
//! - The message-channel abstraction the transport is built on
//!
//! Protocol-specific logic lives in specialized crates:
//! - `galewire-protocol`: batch framing, sub-packet records, compression
//! - `galewire-peer`: per-connection fragmentation and reassembly

/// Protocol constants shared across layers.
pub mod constants {
    /// Largest payload carried by a single wire message. Anything larger is
    /// split into countdown-tagged fragments.
    pub const MAX_FRAGMENT_PAYLOAD: usize = 10_000;
    /// The countdown header is a single byte, so a logical packet can span at
    /// most 256 fragments.
    pub const MAX_LOGICAL_PACKET: usize = 256 * MAX_FRAGMENT_PAYLOAD;
    /// A wire message carries at least the countdown byte and one payload byte.
    pub const MIN_WIRE_MESSAGE_LEN: usize = 2;
    /// First byte of every batch envelope.
    pub const BATCH_HEADER: u8 = 0xFE;
    /// Marker prepended to single-packet (non-batch) envelopes when the
    /// session embeds compression metadata in headers.
    pub const PACKET_COMPRESSION_MARKER: u8 = 0xFF;
}

/// 64-bit identifier assigned to a peer connection at creation time.
pub type ConnectionId = u64;

/// Message-channel abstraction for pluggable transports.
pub mod channel;
/// Configuration options for the protocol layers.
pub mod config;
/// Error types and results.
pub mod error;
