//! Fuzz target for the Engine.IO / Socket.IO text codecs
//!
//! Feeds arbitrary text through the same decode chain the transport uses:
//! Engine.IO packet, then the Socket.IO packet it carries, then the chat
//! event inside.
//!
//! # Invariants
//!
//! - NEVER panic on malformed input
//! - Engine packets that decode re-encode to an equal packet
//! - Socket packets keep type, namespace and ack id across a re-encode

#![no_main]

use libfuzzer_sys::fuzz_target;
use murmur_proto::{EnginePacket, InboundEvent, SocketPacket};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    let Ok(engine) = EnginePacket::decode(text) else {
        return;
    };
    if let Ok(encoded) = engine.encode() {
        assert_eq!(EnginePacket::decode(&encoded).ok(), Some(engine.clone()));
    }

    let EnginePacket::Message(inner) = engine else {
        return;
    };
    let Ok(packet) = SocketPacket::decode(&inner) else {
        return;
    };
    let Ok(again) = SocketPacket::decode(&packet.encode()) else {
        panic!("re-encoded packet failed to decode: {packet:?}");
    };
    assert_eq!(
        (again.kind, &again.namespace, &again.ack_id),
        (packet.kind, &packet.namespace, &packet.ack_id)
    );

    let _ = InboundEvent::from_packet(&packet);
});
