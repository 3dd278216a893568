//! Loopback demo: batch three packets into a compressed envelope, push it
//! through the fragmentation transport over an in-memory channel, and decode
//! it on the far side.
//!
//! Run with:
//! - cargo run -p galewire --example loopback

use galewire::{BatchFramer, CompressionAlgorithm, Config, FragmentTransport, MemoryChannel};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config {
        compression: CompressionAlgorithm::Deflate,
        compression_threshold: 256,
        compressor_in_header: true,
        compression_ready: true,
        ..Config::default()
    };

    // Outbound side: batch a few packets, one of them large enough to force
    // both compression and fragmentation.
    let mut framer = BatchFramer::new(&config);
    framer.add_encoded_packet(b"move north");
    framer.add_encoded_packet(&vec![7u8; 30_000]);
    framer.add_encoded_packet(b"chat: hello");

    let envelope = framer.encode()?;
    println!("envelope: {} bytes (compressed batch of 3 packets)", envelope.len());

    let sender = FragmentTransport::new(1);
    let mut channel = MemoryChannel::new();
    let written = sender.write(&mut channel, &envelope)?;
    println!("wrote {} bytes as {} wire message(s)", written, channel.queued_messages());

    // Inbound side: replay the wire messages in arrival order.
    let mut receiver = FragmentTransport::new(2);
    while let Some(message) = channel.pop_message() {
        println!("  fragment: countdown={} len={}", message[0], message.len() - 1);
        if let Some(packet) = receiver.handle_message(&message)? {
            println!("reassembled {} bytes", packet.len());
        }
    }

    let mut buffer = vec![0u8; receiver.next_packet_len().ok_or("no packet queued")?];
    receiver.read(&mut buffer);

    for (i, packet) in BatchFramer::decode(&config, &buffer)?.iter().enumerate() {
        match std::str::from_utf8(packet) {
            Ok(text) => println!("packet {}: \"{}\"", i, text),
            Err(_) => println!("packet {}: {} bytes of binary data", i, packet.len()),
        }
    }

    Ok(())
}
