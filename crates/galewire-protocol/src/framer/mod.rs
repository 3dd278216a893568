//! Batch envelope encoding and decoding.
//!
//! An envelope starts with the batch header byte, optionally followed by a
//! one-byte compression tag, followed by the (possibly compressed)
//! concatenation of varint-length-prefixed sub-packets.

use std::convert::TryFrom;

use bytes::{Buf, BufMut, Bytes, BytesMut};
use bytes_varint::{VarIntSupport, VarIntSupportMut};
use tracing::trace;

use galewire_core::{
    config::{CompressionAlgorithm, Config},
    constants::{BATCH_HEADER, PACKET_COMPRESSION_MARKER},
    error::{ErrorKind, Result},
};

pub mod compression;


/// Number of bytes a value occupies as a varint.
fn varint_len(mut value: u32) -> usize {
    let mut len = 1;
    while value >= 0x80 {
        value >>= 7;
        len += 1;
    }
    len
}

/// Builds and parses batch envelopes.
///
/// Sub-packets accumulate via [`add_encoded_packet`](Self::add_encoded_packet)
/// and are drained into an envelope by [`encode`](Self::encode).
///
/// Note that `encode` does NOT clear the pending list: calling it twice
/// without [`clear`](Self::clear) in between re-sends every sub-packet added
/// so far. Callers either construct one framer per outbound batch or clear
/// explicitly between batches.
#[derive(Debug)]
pub struct BatchFramer {
    /// Pending sub-packets, each already carrying its varint length prefix.
    pending: Vec<Bytes>,
    compression: CompressionAlgorithm,
    compression_level: u32,
    compression_threshold: usize,
    /// Whether outbound envelopes carry compression metadata in-band.
    write_compressor: bool,
}

impl BatchFramer {
    /// Creates a framer with the session's negotiated compression settings.
    pub fn new(config: &Config) -> Self {
        Self {
            pending: Vec::new(),
            compression: config.compression,
            compression_level: config.compression_level,
            compression_threshold: config.compression_threshold,
            write_compressor: config.announces_compressor(),
        }
    }

    /// Appends one sub-packet, length-prefixed, to the pending batch.
    pub fn add_encoded_packet(&mut self, packet: &[u8]) {
        let mut buffer = BytesMut::with_capacity(varint_len(packet.len() as u32) + packet.len());
        buffer.put_u32_varint(packet.len() as u32);
        buffer.put_slice(packet);
        self.pending.push(buffer.freeze());
    }

    /// Appends a run of sub-packets in order, encoded into one allocation.
    pub fn add_encoded_packets<B: AsRef<[u8]>>(&mut self, packets: &[B]) {
        let total: usize = packets
            .iter()
            .map(|packet| {
                let len = packet.as_ref().len();
                varint_len(len as u32) + len
            })
            .sum();
        let mut buffer = BytesMut::with_capacity(total);
        for packet in packets {
            let packet = packet.as_ref();
            buffer.put_u32_varint(packet.len() as u32);
            buffer.put_slice(packet);
        }
        self.pending.push(buffer.freeze());
    }

    /// True when no sub-packets are pending.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drops all pending sub-packets. Never called implicitly.
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    fn concat_pending(&self) -> BytesMut {
        let total: usize = self.pending.iter().map(Bytes::len).sum();
        let mut buffer = BytesMut::with_capacity(total);
        for chunk in &self.pending {
            buffer.put_slice(chunk);
        }
        buffer
    }

    /// Returns the raw concatenation of pending sub-packets, no envelope.
    pub fn get_buffer(&self) -> Bytes {
        self.concat_pending().freeze()
    }

    /// Produces the outbound envelope for the pending batch.
    ///
    /// The payload is compressed only when it is strictly larger than the
    /// compression threshold; the tag byte, when written, names the algorithm
    /// actually applied. Pending sub-packets are left in place (see the type
    /// docs).
    pub fn encode(&self) -> Result<Bytes> {
        let payload = self.concat_pending();

        let mut envelope = BytesMut::with_capacity(payload.len() + 2);
        envelope.put_u8(BATCH_HEADER);
        if payload.len() > self.compression_threshold {
            let compressed =
                compression::compress(self.compression, self.compression_level, &payload)?;
            if self.write_compressor {
                envelope.put_u8(self.compression.wire_tag());
            }
            envelope.put_slice(&compressed);
        } else {
            if self.write_compressor {
                envelope.put_u8(CompressionAlgorithm::None.wire_tag());
            }
            envelope.put_slice(&payload);
        }
        Ok(envelope.freeze())
    }

    /// Encodes a single packet without batch semantics.
    ///
    /// The packet is length-prefixed and compressed if over the threshold.
    /// When compression metadata is announced in-band, the result is prefixed
    /// with the fixed packet marker byte rather than the batch header.
    pub fn encode_packet(&self, packet: &[u8]) -> Result<Bytes> {
        let mut buffer = BytesMut::with_capacity(varint_len(packet.len() as u32) + packet.len());
        buffer.put_u32_varint(packet.len() as u32);
        buffer.put_slice(packet);

        let body = if buffer.len() > self.compression_threshold {
            compression::compress(self.compression, self.compression_level, &buffer)?
        } else {
            buffer.to_vec()
        };

        if self.write_compressor {
            let mut out = BytesMut::with_capacity(1 + body.len());
            out.put_u8(PACKET_COMPRESSION_MARKER);
            out.put_slice(&body);
            Ok(out.freeze())
        } else {
            Ok(Bytes::from(body))
        }
    }

    /// Parses an inbound envelope back into its sub-packets.
    ///
    /// The first byte must be the batch header. The remainder is handled by
    /// [`decode_packet`](Self::decode_packet).
    pub fn decode(config: &Config, envelope: &[u8]) -> Result<Vec<Bytes>> {
        match envelope.first() {
            Some(&BATCH_HEADER) => Self::decode_packet(config, &envelope[1..]),
            Some(&other) => Err(ErrorKind::BadEnvelopeHeader(other)),
            None => Err(ErrorKind::BadEnvelopeHeader(0)),
        }
    }

    /// Parses an envelope body whose outer header byte is already stripped.
    ///
    /// With in-band compression metadata, the leading byte names the
    /// algorithm and decompression failures are hard errors. Without it, the
    /// session-wide algorithm is attempted and a failure means the payload
    /// was never compressed - the backward-compatibility path for peers that
    /// do not negotiate per-envelope tagging.
    pub fn decode_packet(config: &Config, body: &[u8]) -> Result<Vec<Bytes>> {
        let decompressed = if config.announces_compressor() {
            let Some((&tag, rest)) = body.split_first() else {
                return Err(ErrorKind::DecompressionFailed("missing compression tag".into()));
            };
            let algorithm = CompressionAlgorithm::try_from(tag)?;
            compression::decompress(algorithm, rest)?
        } else {
            match compression::decompress(config.compression, body) {
                Ok(data) => data,
                Err(err) => {
                    trace!("treating envelope body as uncompressed: {}", err);
                    body.to_vec()
                }
            }
        };
        Self::split_packets(&decompressed)
    }

    /// Splits a decompressed payload into its varint-length-prefixed records.
    pub fn split_packets(payload: &[u8]) -> Result<Vec<Bytes>> {
        let mut buf = payload;
        let mut packets = Vec::new();
        while buf.has_remaining() {
            let len = buf
                .get_u32_varint()
                .map_err(|e| ErrorKind::InvalidSubPacketLength(format!("{:?}", e)))?
                as usize;
            if len > buf.remaining() {
                return Err(ErrorKind::TruncatedSubPacket { declared: len, remaining: buf.remaining() });
            }
            packets.push(Bytes::copy_from_slice(&buf.chunk()[..len]));
            buf.advance(len);
        }
        Ok(packets)
    }
}
