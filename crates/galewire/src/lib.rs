#![warn(missing_docs)]

//! Galewire: a small public API facade for the workspace.
//!
//! This crate re-exports the types needed to move application packets over
//! an established peer channel:
//!
//! - Fragmentation transport (`FragmentTransport`)
//! - Batch framing (`BatchFramer`)
//! - Core configuration (`Config`, `CompressionAlgorithm`)
//! - The channel abstraction (`MessageChannel`, `MemoryChannel`)
//!
//! Example
//! ```
//! use galewire::{BatchFramer, Config, FragmentTransport, MemoryChannel};
//!
//! let config = Config::default();
//!
//! // Batch two packets into one envelope and send it through a loopback.
//! let mut framer = BatchFramer::new(&config);
//! framer.add_encoded_packet(b"hello");
//! framer.add_encoded_packet(b"world");
//! let envelope = framer.encode().unwrap();
//!
//! let sender = FragmentTransport::new(1);
//! let mut receiver = FragmentTransport::new(2);
//! let mut channel = MemoryChannel::new();
//! sender.write(&mut channel, &envelope).unwrap();
//!
//! while let Some(message) = channel.pop_message() {
//!     receiver.handle_message(&message).unwrap();
//! }
//!
//! let mut buffer = vec![0u8; receiver.next_packet_len().unwrap()];
//! receiver.read(&mut buffer);
//! let packets = BatchFramer::decode(&config, &buffer).unwrap();
//! assert_eq!(packets[0].as_ref(), b"hello");
//! assert_eq!(packets[1].as_ref(), b"world");
//! ```

// Core config, errors, channel abstraction
pub use galewire_core::{
    channel::{MemoryChannel, MessageChannel},
    config::{CompressionAlgorithm, Config},
    constants,
    error::{ErrorKind, Result},
    ConnectionId,
};
// Peer: per-connection fragmentation transport
pub use galewire_peer::FragmentTransport;
// Protocol: batch framing
pub use galewire_protocol::BatchFramer;

/// Convenience prelude with the most commonly used items.
pub mod prelude {
    pub use crate::{
        BatchFramer, CompressionAlgorithm, Config, ConnectionId, ErrorKind, FragmentTransport,
        MemoryChannel, MessageChannel,
    };
}
