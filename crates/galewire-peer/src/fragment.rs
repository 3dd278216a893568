//! Fragmentation and reassembly for a single peer connection.
//!
//! Wire format: `[countdown][payload]`. The countdown byte is the number of
//! fragments still to arrive after this one, so a multi-fragment packet walks
//! `total-1, total-2, .., 0` and a single-fragment packet carries `0`.
//! Receivers treat the countdown as a strict sequence; any gap or repeat
//! means the stream is desynchronized.

use std::collections::VecDeque;

use bytes::{BufMut, Bytes, BytesMut};
use tracing::trace;

use galewire_core::{
    channel::MessageChannel,
    constants::{MAX_FRAGMENT_PAYLOAD, MAX_LOGICAL_PACKET, MIN_WIRE_MESSAGE_LEN},
    error::{ErrorKind, Result},
    ConnectionId,
};

/// Per-connection fragmentation state.
///
/// Exactly one instance exists per peer connection, owned by that
/// connection's event handler. At most one partial reassembly is in flight at
/// any time; the accumulation buffer is non-empty only while one is.
#[derive(Debug)]
pub struct FragmentTransport {
    connection_id: ConnectionId,
    /// Countdown value of the last fragment received, while a reassembly is
    /// in progress. The next fragment must carry this minus one.
    expected_remaining: Option<u8>,
    /// Partially reassembled payload.
    accumulation: BytesMut,
    /// Completed logical packets awaiting `read`, oldest first.
    inbound: VecDeque<Bytes>,
}

impl FragmentTransport {
    /// Creates the transport for a freshly established connection.
    pub fn new(connection_id: ConnectionId) -> Self {
        Self {
            connection_id,
            expected_remaining: None,
            accumulation: BytesMut::new(),
            inbound: VecDeque::new(),
        }
    }

    /// Returns the identifier of the connection this transport belongs to.
    pub fn connection_id(&self) -> ConnectionId {
        self.connection_id
    }

    /// True while a partial reassembly is in flight.
    pub fn is_reassembling(&self) -> bool {
        self.expected_remaining.is_some()
    }

    /// Returns the number of completed packets waiting to be read.
    pub fn queued_packets(&self) -> usize {
        self.inbound.len()
    }

    /// Writes one logical payload to the channel, fragmenting as needed.
    ///
    /// Payloads up to [`MAX_FRAGMENT_PAYLOAD`] go out as a single message
    /// with countdown 0; larger payloads are walked front to back in
    /// [`MAX_FRAGMENT_PAYLOAD`]-sized fragments. Returns the number of
    /// payload bytes written.
    pub fn write<C: MessageChannel>(&self, channel: &mut C, payload: &[u8]) -> Result<usize> {
        if !channel.is_open() {
            return Err(ErrorKind::ChannelClosed);
        }

        if payload.len() <= MAX_FRAGMENT_PAYLOAD {
            trace!(connection_id = self.connection_id, len = payload.len(), "sending single segment");
            let mut message = BytesMut::with_capacity(1 + payload.len());
            message.put_u8(0);
            message.put_slice(payload);
            channel.send_message(&message)?;
            return Ok(payload.len());
        }

        if payload.len() > MAX_LOGICAL_PACKET {
            return Err(ErrorKind::PayloadTooLarge { len: payload.len(), max: MAX_LOGICAL_PACKET });
        }

        let total = (payload.len() + MAX_FRAGMENT_PAYLOAD - 1) / MAX_FRAGMENT_PAYLOAD;
        let mut remaining = total;
        let mut written = 0;

        for chunk in payload.chunks(MAX_FRAGMENT_PAYLOAD) {
            remaining -= 1;
            trace!(connection_id = self.connection_id, remaining, "sending fragment");

            let mut message = BytesMut::with_capacity(1 + chunk.len());
            message.put_u8(remaining as u8);
            message.put_slice(chunk);
            channel.send_message(&message)?;

            written += chunk.len();
        }

        assert_eq!(remaining, 0, "fragment countdown did not terminate at zero");
        Ok(written)
    }

    /// Feeds one inbound wire message, in arrival order, to the reassembler.
    ///
    /// Returns the completed logical packet when this message was the final
    /// fragment; the packet is also queued for [`read`](Self::read). A
    /// countdown that does not continue the in-flight sequence leaves the
    /// transport state untouched and surfaces
    /// [`ErrorKind::FragmentSequenceMismatch`] - the caller decides whether
    /// to tear the connection down.
    pub fn handle_message(&mut self, message: &[u8]) -> Result<Option<Bytes>> {
        if message.len() < MIN_WIRE_MESSAGE_LEN {
            return Err(ErrorKind::TruncatedMessage { len: message.len() });
        }

        let remaining = message[0];
        let body = &message[1..];
        trace!(connection_id = self.connection_id, remaining, len = body.len(), "received fragment");

        if let Some(expected) = self.expected_remaining {
            if remaining != expected - 1 {
                return Err(ErrorKind::FragmentSequenceMismatch {
                    expected: expected - 1,
                    actual: remaining,
                });
            }
        }

        self.accumulation.extend_from_slice(body);

        if remaining > 0 {
            self.expected_remaining = Some(remaining);
            return Ok(None);
        }

        self.expected_remaining = None;
        let packet = self.accumulation.split().freeze();
        trace!(connection_id = self.connection_id, len = packet.len(), "reassembled packet");
        self.inbound.push_back(packet.clone());
        Ok(Some(packet))
    }

    /// Pops the oldest completed packet and copies it into `dst`.
    ///
    /// Non-blocking: returns 0 when nothing is queued. At most `dst.len()`
    /// bytes are copied; callers that need the whole packet size the
    /// destination from [`next_packet_len`](Self::next_packet_len) first.
    pub fn read(&mut self, dst: &mut [u8]) -> usize {
        let Some(packet) = self.inbound.pop_front() else {
            return 0;
        };
        let n = packet.len().min(dst.len());
        dst[..n].copy_from_slice(&packet[..n]);
        n
    }

    /// Length of the oldest completed packet, if one is queued.
    pub fn next_packet_len(&self) -> Option<usize> {
        self.inbound.front().map(Bytes::len)
    }
}
