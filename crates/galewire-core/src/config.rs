use std::convert::TryFrom;

use crate::error::ErrorKind;

/// Compression algorithm negotiated for a session.
#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub enum CompressionAlgorithm {
    /// No compression
    None,
    /// Raw deflate (no zlib wrapper)
    Deflate,
    /// Snappy. Part of the negotiated algorithm set but not implemented;
    /// selecting it fails loudly rather than passing data through.
    Snappy,
}

impl CompressionAlgorithm {
    /// Returns the one-byte tag this algorithm is announced with on the wire.
    pub fn wire_tag(&self) -> u8 {
        match self {
            CompressionAlgorithm::Deflate => 0,
            CompressionAlgorithm::Snappy => 1,
            CompressionAlgorithm::None => 255,
        }
    }
}

impl TryFrom<u8> for CompressionAlgorithm {
    type Error = ErrorKind;
    /// Gets the `CompressionAlgorithm` instance from its wire tag.
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(CompressionAlgorithm::Deflate),
            1 => Ok(CompressionAlgorithm::Snappy),
            255 => Ok(CompressionAlgorithm::None),
            other => Err(ErrorKind::UnknownCompressionAlgorithm(other)),
        }
    }
}

#[derive(Clone, Debug)]
/// Session-negotiated options for the framing and compression layers.
pub struct Config {
    /// Compression algorithm for batch envelopes (default: None).
    pub compression: CompressionAlgorithm,
    /// Deflate compression level (0-9).
    pub compression_level: u32,
    /// Envelopes strictly larger than this many bytes are compressed;
    /// anything at or below the threshold is sent raw.
    pub compression_threshold: usize,
    /// Whether this session's envelopes embed a one-byte compression tag.
    /// Older peers compress session-wide with no per-envelope metadata.
    pub compressor_in_header: bool,
    /// Whether compression negotiation has completed. Until it has,
    /// envelopes are written untagged even when `compressor_in_header` is set.
    pub compression_ready: bool,
}

impl Config {
    /// True when envelopes carry the per-envelope compression tag, i.e. the
    /// header feature is negotiated and compression is ready.
    pub fn announces_compressor(&self) -> bool {
        self.compressor_in_header && self.compression_ready
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            compression: CompressionAlgorithm::None,
            compression_level: 6,
            compression_threshold: 256,
            compressor_in_header: true,
            compression_ready: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_tag_round_trip() {
        for algorithm in [
            CompressionAlgorithm::None,
            CompressionAlgorithm::Deflate,
            CompressionAlgorithm::Snappy,
        ] {
            assert_eq!(CompressionAlgorithm::try_from(algorithm.wire_tag()).unwrap(), algorithm);
        }
    }

    #[test]
    fn test_unknown_tag_rejected() {
        assert!(matches!(
            CompressionAlgorithm::try_from(7),
            Err(ErrorKind::UnknownCompressionAlgorithm(7))
        ));
    }

    #[test]
    fn test_announcement_requires_both_flags() {
        let mut config = Config::default();
        assert!(!config.announces_compressor());

        config.compression_ready = true;
        assert!(config.announces_compressor());

        config.compressor_in_header = false;
        assert!(!config.announces_compressor());
    }
}
