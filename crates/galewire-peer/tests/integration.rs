//! Integration tests for the galewire-peer crate.
//!
//! These drive the full inbound/outbound path: batch framing on top of the
//! fragmentation transport, connected back to back through a memory channel.

use galewire_core::{
    channel::{MemoryChannel, MessageChannel},
    config::{CompressionAlgorithm, Config},
    error::ErrorKind,
};
use galewire_peer::FragmentTransport;
use galewire_protocol::BatchFramer;

fn patterned(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 131 + 17) as u8).collect()
}

/// Drains every message the sender queued into the receiving transport, in
/// order, and returns the completed packets.
fn pump(channel: &mut MemoryChannel, receiver: &mut FragmentTransport) -> Vec<Vec<u8>> {
    let mut packets = Vec::new();
    while let Some(message) = channel.pop_message() {
        if let Some(packet) = receiver.handle_message(&message).unwrap() {
            packets.push(packet.to_vec());
        }
    }
    packets
}

#[test]
fn test_round_trip_across_payload_sizes() {
    for size in [1usize, 9_999, 10_000, 10_001, 25_000, 100_000] {
        let sender = FragmentTransport::new(1);
        let mut receiver = FragmentTransport::new(2);
        let mut channel = MemoryChannel::new();
        let payload = patterned(size);

        assert_eq!(sender.write(&mut channel, &payload).unwrap(), size);

        let packets = pump(&mut channel, &mut receiver);
        assert_eq!(packets.len(), 1, "size {}", size);
        assert_eq!(packets[0], payload, "size {}", size);
    }
}

#[test]
fn test_empty_payload_fails_on_receive() {
    // An empty payload produces a 1-byte wire message, below the 2-byte
    // minimum. The writer accepts it; the receiver rejects it. Known
    // boundary of the wire format, not a silent success.
    let sender = FragmentTransport::new(1);
    let mut receiver = FragmentTransport::new(2);
    let mut channel = MemoryChannel::new();

    assert_eq!(sender.write(&mut channel, &[]).unwrap(), 0);
    let message = channel.pop_message().unwrap();
    assert_eq!(message, vec![0]);
    assert_eq!(receiver.handle_message(&message), Err(ErrorKind::TruncatedMessage { len: 1 }));
}

#[test]
fn test_fragment_walk_25000_bytes() {
    let sender = FragmentTransport::new(1);
    let mut channel = MemoryChannel::new();
    let payload = patterned(25_000);

    sender.write(&mut channel, &payload).unwrap();

    let messages: Vec<Vec<u8>> = std::iter::from_fn(|| channel.pop_message()).collect();
    assert_eq!(messages.len(), 3);
    assert_eq!(
        messages.iter().map(|m| (m[0], m.len() - 1)).collect::<Vec<_>>(),
        vec![(2, 10_000), (1, 10_000), (0, 5_000)]
    );

    // In order: one reassembled 25,000-byte packet.
    let mut receiver = FragmentTransport::new(2);
    assert_eq!(receiver.handle_message(&messages[0]).unwrap(), None);
    assert_eq!(receiver.handle_message(&messages[1]).unwrap(), None);
    let packet = receiver.handle_message(&messages[2]).unwrap().unwrap();
    assert_eq!(packet.as_ref(), payload.as_slice());

    // Misordered (2, 0, 1): the second call already desynchronizes.
    let mut receiver = FragmentTransport::new(3);
    assert_eq!(receiver.handle_message(&messages[0]).unwrap(), None);
    assert_eq!(
        receiver.handle_message(&messages[2]),
        Err(ErrorKind::FragmentSequenceMismatch { expected: 1, actual: 0 })
    );
}

#[test]
fn test_read_interface_end_to_end() {
    let sender = FragmentTransport::new(1);
    let mut receiver = FragmentTransport::new(2);
    let mut channel = MemoryChannel::new();
    let payload = patterned(30_000);

    sender.write(&mut channel, &payload).unwrap();
    while let Some(message) = channel.pop_message() {
        receiver.handle_message(&message).unwrap();
    }

    let len = receiver.next_packet_len().unwrap();
    assert_eq!(len, 30_000);
    let mut buffer = vec![0u8; len];
    assert_eq!(receiver.read(&mut buffer), 30_000);
    assert_eq!(buffer, payload);
    assert_eq!(receiver.next_packet_len(), None);
}

#[test]
fn test_batched_envelope_over_fragmented_channel() {
    // Upper layer: several sub-packets batched into one compressed envelope.
    // The envelope rides the fragmentation layer like any other payload.
    let config = Config {
        compression: CompressionAlgorithm::Deflate,
        compression_threshold: 512,
        compressor_in_header: true,
        compression_ready: true,
        ..Config::default()
    };

    let originals = [patterned(40), patterned(0), patterned(20_000), patterned(3)];
    let mut framer = BatchFramer::new(&config);
    for packet in &originals {
        framer.add_encoded_packet(packet);
    }
    let envelope = framer.encode().unwrap();

    let sender = FragmentTransport::new(1);
    let mut receiver = FragmentTransport::new(2);
    let mut channel = MemoryChannel::new();
    sender.write(&mut channel, &envelope).unwrap();

    let packets = pump(&mut channel, &mut receiver);
    assert_eq!(packets.len(), 1);

    let decoded = BatchFramer::decode(&config, &packets[0]).unwrap();
    assert_eq!(decoded.len(), originals.len());
    for (packet, original) in decoded.iter().zip(&originals) {
        assert_eq!(packet.as_ref(), original.as_slice());
    }
}

#[test]
fn test_two_way_conversation() {
    let config = Config { compressor_in_header: false, ..Config::default() };

    let mut alice = FragmentTransport::new(10);
    let mut bob = FragmentTransport::new(20);
    let mut to_bob = MemoryChannel::new();
    let mut to_alice = MemoryChannel::new();

    // Alice sends a batch; Bob answers with a single packet.
    let mut framer = BatchFramer::new(&config);
    framer.add_encoded_packets(&[b"ping".as_slice(), b"state".as_slice()]);
    alice.write(&mut to_bob, &framer.encode().unwrap()).unwrap();

    let inbound = pump(&mut to_bob, &mut bob);
    let decoded = BatchFramer::decode(&config, &inbound[0]).unwrap();
    assert_eq!(decoded[0].as_ref(), b"ping");
    assert_eq!(decoded[1].as_ref(), b"state");

    let reply = BatchFramer::new(&config).encode_packet(b"pong").unwrap();
    bob.write(&mut to_alice, &reply).unwrap();

    let inbound = pump(&mut to_alice, &mut alice);
    let decoded = BatchFramer::decode_packet(&config, &inbound[0]).unwrap();
    assert_eq!(decoded[0].as_ref(), b"pong");
}

#[test]
fn test_closed_channel_surfaces_mid_write() {
    // A channel that closes between fragments: the write fails on the next
    // send and the receiver, fed the partial sequence plus a fresh packet,
    // reports desynchronization instead of delivering a corrupt buffer.
    struct FlakyChannel {
        inner: MemoryChannel,
        sends_before_close: usize,
    }

    impl MessageChannel for FlakyChannel {
        fn send_message(&mut self, message: &[u8]) -> galewire_core::error::Result<()> {
            if self.sends_before_close == 0 {
                self.inner.close();
            } else {
                self.sends_before_close -= 1;
            }
            self.inner.send_message(message)
        }
        fn is_open(&self) -> bool {
            self.inner.is_open()
        }
    }

    let sender = FragmentTransport::new(1);
    let mut channel = FlakyChannel { inner: MemoryChannel::new(), sends_before_close: 1 };
    let payload = patterned(25_000);

    assert_eq!(sender.write(&mut channel, &payload), Err(ErrorKind::ChannelClosed));
    assert_eq!(channel.inner.queued_messages(), 1);

    let mut receiver = FragmentTransport::new(2);
    let first = channel.inner.pop_message().unwrap();
    assert_eq!(receiver.handle_message(&first).unwrap(), None);

    // The sender gave up; a later, unrelated single-fragment message cannot
    // continue the sequence.
    assert_eq!(
        receiver.handle_message(&[0, 1, 2]),
        Err(ErrorKind::FragmentSequenceMismatch { expected: 1, actual: 0 })
    );
}
