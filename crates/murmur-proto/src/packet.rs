//! Socket.IO v5 packets.
//!
//! A Socket.IO packet travels as the payload of an Engine.IO `message`:
//!
//! ```text
//! <type>[<namespace>,][<ack id>][<json data>]
//!
//! 0                     CONNECT to the default namespace
//! 0{"sid":"xyz"}        CONNECT ack from the server
//! 2["typing",true]      EVENT
//! 2/admin,7["ping"]     EVENT on /admin expecting ack 7
//! ```
//!
//! The default namespace `/` is never written out.

use serde_json::Value;

use crate::ProtocolError;

/// Default Socket.IO namespace.
pub const DEFAULT_NAMESPACE: &str = "/";

/// Socket.IO packet type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PacketKind {
    /// Namespace connect (client request or server ack).
    Connect,
    /// Namespace disconnect.
    Disconnect,
    /// Event with JSON arguments.
    Event,
    /// Acknowledgement of an event.
    Ack,
    /// Namespace connection refused.
    ConnectError,
    /// Event with binary attachments.
    BinaryEvent,
    /// Acknowledgement with binary attachments.
    BinaryAck,
}

impl PacketKind {
    fn from_char(c: char) -> Result<Self, ProtocolError> {
        match c {
            '0' => Ok(Self::Connect),
            '1' => Ok(Self::Disconnect),
            '2' => Ok(Self::Event),
            '3' => Ok(Self::Ack),
            '4' => Ok(Self::ConnectError),
            '5' => Ok(Self::BinaryEvent),
            '6' => Ok(Self::BinaryAck),
            other => Err(ProtocolError::UnknownPacketType(other)),
        }
    }

    fn as_char(self) -> char {
        match self {
            Self::Connect => '0',
            Self::Disconnect => '1',
            Self::Event => '2',
            Self::Ack => '3',
            Self::ConnectError => '4',
            Self::BinaryEvent => '5',
            Self::BinaryAck => '6',
        }
    }
}

/// A decoded Socket.IO packet.
#[derive(Debug, Clone, PartialEq)]
pub struct SocketPacket {
    /// Packet type.
    pub kind: PacketKind,
    /// Namespace, `/` by default.
    pub namespace: String,
    /// Acknowledgement id requested by the sender.
    pub ack_id: Option<u64>,
    /// JSON data. `None` when the packet carries nothing.
    pub data: Option<Value>,
}

impl SocketPacket {
    /// CONNECT request for the default namespace.
    pub fn connect() -> Self {
        Self::bare(PacketKind::Connect)
    }

    /// DISCONNECT from the default namespace.
    pub fn disconnect() -> Self {
        Self::bare(PacketKind::Disconnect)
    }

    /// EVENT packet on the default namespace: `[name, payload]`.
    pub fn event(name: &str, payload: Value) -> Self {
        Self {
            kind: PacketKind::Event,
            namespace: DEFAULT_NAMESPACE.to_string(),
            ack_id: None,
            data: Some(Value::Array(vec![Value::String(name.to_string()), payload])),
        }
    }

    fn bare(kind: PacketKind) -> Self {
        Self { kind, namespace: DEFAULT_NAMESPACE.to_string(), ack_id: None, data: None }
    }

    /// Event name and arguments, if this is a well-formed EVENT packet.
    pub fn event_parts(&self) -> Option<(&str, &[Value])> {
        if self.kind != PacketKind::Event {
            return None;
        }
        let Some(Value::Array(items)) = &self.data else {
            return None;
        };
        let (name, args) = items.split_first()?;
        Some((name.as_str()?, args))
    }

    /// Decode from the payload of an Engine.IO `message`.
    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        let mut chars = text.chars();
        let kind = PacketKind::from_char(chars.next().ok_or(ProtocolError::EmptyPacket)?)?;
        if matches!(kind, PacketKind::BinaryEvent | PacketKind::BinaryAck) {
            return Err(ProtocolError::BinaryUnsupported);
        }
        let mut rest = chars.as_str();

        let mut namespace = DEFAULT_NAMESPACE.to_string();
        if rest.starts_with('/') {
            match rest.find(',') {
                Some(idx) => {
                    namespace = rest[..idx].to_string();
                    rest = &rest[idx + 1..];
                },
                // A bare namespace with no payload is valid: "0/admin"
                None if !rest.contains(['[', '{']) => {
                    namespace = rest.to_string();
                    rest = "";
                },
                None => return Err(ProtocolError::UnterminatedNamespace),
            }
        }

        let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
        let ack_id = if digits > 0 {
            let id = rest[..digits]
                .parse::<u64>()
                .map_err(|e| ProtocolError::MalformedEvent(format!("ack id: {e}")))?;
            rest = &rest[digits..];
            Some(id)
        } else {
            None
        };

        let data = if rest.is_empty() {
            None
        } else {
            match serde_json::from_str(rest)? {
                value @ (Value::Array(_) | Value::Object(_)) => Some(value),
                other => {
                    return Err(ProtocolError::MalformedEvent(format!("bare payload {other}")));
                },
            }
        };

        Ok(Self { kind, namespace, ack_id, data })
    }

    /// Encode as the payload of an Engine.IO `message`.
    pub fn encode(&self) -> String {
        let mut out = String::new();
        out.push(self.kind.as_char());
        if self.namespace != DEFAULT_NAMESPACE {
            out.push_str(&self.namespace);
            out.push(',');
        }
        if let Some(id) = self.ack_id {
            out.push_str(&id.to_string());
        }
        if let Some(data) = &self.data {
            out.push_str(&data.to_string());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn connect_encodes_to_single_digit() {
        assert_eq!(SocketPacket::connect().encode(), "0");
        assert_eq!(SocketPacket::disconnect().encode(), "1");
    }

    #[test]
    fn decode_connect_ack() {
        let packet = SocketPacket::decode(r#"0{"sid":"xyz"}"#).unwrap();
        assert_eq!(packet.kind, PacketKind::Connect);
        assert_eq!(packet.namespace, "/");
        assert_eq!(packet.data, Some(json!({"sid": "xyz"})));
    }

    #[test]
    fn decode_event_with_namespace_and_ack() {
        let packet = SocketPacket::decode(r#"2/admin,7["ping",1]"#).unwrap();
        assert_eq!(packet.kind, PacketKind::Event);
        assert_eq!(packet.namespace, "/admin");
        assert_eq!(packet.ack_id, Some(7));

        let (name, args) = packet.event_parts().unwrap();
        assert_eq!(name, "ping");
        assert_eq!(args, &[json!(1)]);
    }

    #[test]
    fn decode_bare_namespace() {
        let packet = SocketPacket::decode("1/admin").unwrap();
        assert_eq!(packet.kind, PacketKind::Disconnect);
        assert_eq!(packet.namespace, "/admin");
        assert!(packet.data.is_none());
    }

    #[test]
    fn binary_packets_are_rejected() {
        assert_eq!(
            SocketPacket::decode(r#"51-["upload",{"_placeholder":true,"num":0}]"#),
            Err(ProtocolError::BinaryUnsupported)
        );
    }

    #[test]
    fn scalar_payload_is_rejected() {
        // "2 5" would re-encode as "25", an ack id with no data
        assert!(matches!(
            SocketPacket::decode("2 5"),
            Err(ProtocolError::MalformedEvent(_))
        ));
    }

    #[test]
    fn event_parts_requires_string_name() {
        let packet = SocketPacket {
            kind: PacketKind::Event,
            namespace: "/".into(),
            ack_id: None,
            data: Some(json!([1, 2])),
        };
        assert!(packet.event_parts().is_none());
        assert!(SocketPacket::connect().event_parts().is_none());
    }

    #[test]
    fn namespace_round_trip() {
        let packet = SocketPacket {
            kind: PacketKind::Event,
            namespace: "/chat".into(),
            ack_id: Some(12),
            data: Some(json!(["typing", false])),
        };
        assert_eq!(SocketPacket::decode(&packet.encode()).unwrap(), packet);
    }
}
