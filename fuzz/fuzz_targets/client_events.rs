//! Fuzz target for the client state machine
//!
//! Drives [`Client::handle`] with arbitrary server events, shaped as real
//! event names with arbitrary JSON-ish arguments.
//!
//! # Invariants
//!
//! - NEVER panic, whatever the server sends
//! - Messages are only ever appended
//! - Connection status follows CONNECT / DISCONNECT packets

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use murmur_client::{Client, ClientEvent, ConnectionStatus, SystemEnv};
use murmur_proto::SocketPacket;

const EVENTS: [&str; 13] = [
    "receive_message",
    "private_message",
    "user_list",
    "user_joined",
    "user_left",
    "typing_users",
    "room_list",
    "room_joined",
    "message_reacted",
    "message_read",
    "unread_count",
    "notify",
    "server_shutdown",
];

#[derive(Debug, Arbitrary)]
enum Input {
    Connected,
    Disconnected,
    ServerConnect,
    ServerDisconnect,
    Event { name: u8, args: String },
    Raw(String),
}

fuzz_target!(|inputs: Vec<Input>| {
    let mut client = Client::new(SystemEnv::new());
    let _ = client.connect("fuzz");

    for input in inputs {
        let known = client.state().messages.len();

        let event = match input {
            Input::Connected => ClientEvent::Connected,
            Input::Disconnected => ClientEvent::Disconnected { reason: "fuzz".into() },
            Input::ServerConnect => ClientEvent::PacketReceived(SocketPacket::connect()),
            Input::ServerDisconnect => ClientEvent::PacketReceived(SocketPacket::disconnect()),
            Input::Event { name, args } => {
                let name = EVENTS[usize::from(name) % EVENTS.len()];
                match SocketPacket::decode(&format!("2[\"{name}\",{args}]")) {
                    Ok(packet) => ClientEvent::PacketReceived(packet),
                    Err(_) => continue,
                }
            },
            Input::Raw(text) => match SocketPacket::decode(&text) {
                Ok(packet) => ClientEvent::PacketReceived(packet),
                Err(_) => continue,
            },
        };

        let expected = match &event {
            ClientEvent::Connected => Some(ConnectionStatus::Connected),
            ClientEvent::Disconnected { .. } => Some(ConnectionStatus::Disconnected),
            _ => None,
        };

        let _ = client.handle(event);

        assert!(client.state().messages.len() >= known);
        if let Some(status) = expected {
            assert_eq!(client.state().status, status);
        }
    }
});
