//! Data compression and decompression for batch envelopes.

use std::io::{Read, Write};

use flate2::{read::DeflateDecoder, write::DeflateEncoder, Compression};

use galewire_core::{
    config::CompressionAlgorithm,
    error::{ErrorKind, Result},
};

/// Intermediate buffer size for streaming inflate. Decompressed envelopes are
/// read through a bounded chunk rather than trusting the input to be sane.
const INFLATE_CHUNK_SIZE: usize = 512_000;

/// Compresses an envelope payload with the given algorithm.
///
/// `None` is the identity. `Snappy` is part of the negotiated set but has no
/// implementation and always fails.
pub fn compress(algorithm: CompressionAlgorithm, level: u32, data: &[u8]) -> Result<Vec<u8>> {
    match algorithm {
        CompressionAlgorithm::None => Ok(data.to_vec()),
        CompressionAlgorithm::Deflate => {
            let mut encoder = DeflateEncoder::new(Vec::new(), Compression::new(level));
            encoder
                .write_all(data)
                .map_err(|e| ErrorKind::CompressionFailed(e.to_string()))?;
            encoder.finish().map_err(|e| ErrorKind::CompressionFailed(e.to_string()))
        }
        CompressionAlgorithm::Snappy => Err(ErrorKind::UnsupportedCompression(algorithm)),
    }
}

/// Decompresses an envelope payload with the given algorithm.
pub fn decompress(algorithm: CompressionAlgorithm, data: &[u8]) -> Result<Vec<u8>> {
    match algorithm {
        CompressionAlgorithm::None => Ok(data.to_vec()),
        CompressionAlgorithm::Deflate => {
            let mut decoder = DeflateDecoder::new(data);
            let mut output = Vec::new();
            let mut chunk = vec![0u8; INFLATE_CHUNK_SIZE];
            loop {
                let read = decoder
                    .read(&mut chunk)
                    .map_err(|e| ErrorKind::DecompressionFailed(e.to_string()))?;
                if read == 0 {
                    break;
                }
                output.extend_from_slice(&chunk[..read]);
            }
            Ok(output)
        }
        CompressionAlgorithm::Snappy => Err(ErrorKind::UnsupportedCompression(algorithm)),
    }
}
