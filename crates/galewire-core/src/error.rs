use std::fmt::{self, Display, Formatter};

use crate::config::CompressionAlgorithm;

/// Convenience alias for results produced by the galewire crates.
pub type Result<T> = std::result::Result<T, ErrorKind>;

/// Errors that can occur in the fragmentation and framing layers.
///
/// All of these are synchronous and local. They indicate either a protocol
/// bug or a corrupted/malicious peer; nothing here is retried internally. The
/// caller decides whether to drop a packet, reset state, or tear down the
/// peer connection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// A wire message was shorter than the minimum of one countdown byte
    /// plus one payload byte.
    TruncatedMessage {
        /// Actual length of the offending message.
        len: usize,
    },
    /// A fragment arrived whose countdown byte did not continue the
    /// in-progress reassembly. The stream is desynchronized.
    FragmentSequenceMismatch {
        /// Countdown value the reassembler required.
        expected: u8,
        /// Countdown value the fragment carried.
        actual: u8,
    },
    /// The underlying message channel is not open for sending.
    ChannelClosed,
    /// A payload would need more fragments than the countdown byte can count.
    PayloadTooLarge {
        /// Length of the rejected payload.
        len: usize,
        /// Largest representable logical packet.
        max: usize,
    },
    /// A batch envelope did not start with the batch header byte.
    BadEnvelopeHeader(u8),
    /// A sub-packet declared more bytes than the envelope has left.
    TruncatedSubPacket {
        /// Length the varint prefix declared.
        declared: usize,
        /// Bytes actually remaining in the envelope.
        remaining: usize,
    },
    /// A sub-packet length prefix was not a valid varint.
    InvalidSubPacketLength(String),
    /// The algorithm is part of the negotiated set but has no implementation.
    UnsupportedCompression(CompressionAlgorithm),
    /// An envelope carried a compression tag outside the negotiated set.
    UnknownCompressionAlgorithm(u8),
    /// The compressor failed while producing an envelope.
    CompressionFailed(String),
    /// The decompressor rejected an envelope body.
    DecompressionFailed(String),
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::TruncatedMessage { len } => {
                write!(f, "wire message of {} bytes is below the 2-byte minimum", len)
            }
            ErrorKind::FragmentSequenceMismatch { expected, actual } => {
                write!(f, "fragment countdown desynchronized: expected {}, got {}", expected, actual)
            }
            ErrorKind::ChannelClosed => {
                write!(f, "message channel is not open")
            }
            ErrorKind::PayloadTooLarge { len, max } => {
                write!(f, "payload of {} bytes exceeds the {}-byte fragmentation limit", len, max)
            }
            ErrorKind::BadEnvelopeHeader(byte) => {
                write!(f, "bad batch envelope header byte 0x{:02x}", byte)
            }
            ErrorKind::TruncatedSubPacket { declared, remaining } => {
                write!(f, "sub-packet declares {} bytes but only {} remain", declared, remaining)
            }
            ErrorKind::InvalidSubPacketLength(detail) => {
                write!(f, "invalid sub-packet length prefix: {}", detail)
            }
            ErrorKind::UnsupportedCompression(algorithm) => {
                write!(f, "{:?} compression is not implemented", algorithm)
            }
            ErrorKind::UnknownCompressionAlgorithm(tag) => {
                write!(f, "unknown compression tag {}", tag)
            }
            ErrorKind::CompressionFailed(detail) => {
                write!(f, "compression failed: {}", detail)
            }
            ErrorKind::DecompressionFailed(detail) => {
                write!(f, "decompression failed: {}", detail)
            }
        }
    }
}

impl std::error::Error for ErrorKind {}
