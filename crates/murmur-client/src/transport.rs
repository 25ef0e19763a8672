//! WebSocket transport for the client.
//!
//! Provides [`ConnectedClient`] which runs an Engine.IO / Socket.IO session
//! over `tokio-tungstenite`. This is a thin layer that frames packets and
//! keeps the link alive; chat semantics remain in the Sans-IO [`Client`].
//!
//! [`Client`]: crate::Client

use std::time::Duration;

use futures_util::{
    SinkExt, StreamExt,
    stream::{SplitSink, SplitStream},
};
use murmur_proto::{EnginePacket, OpenPayload, PacketKind, SocketPacket};
use thiserror::Error;
use tokio::{
    net::TcpStream,
    sync::mpsc,
    task::JoinHandle,
    time::{Instant, sleep, timeout},
};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};
use url::Url;

use crate::ClientEvent;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;

/// Default server endpoint.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:5000";

/// Transport errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Endpoint could not be turned into a WebSocket URL.
    #[error("invalid endpoint: {0}")]
    Endpoint(String),

    /// Connection failed or dropped.
    #[error("connection failed: {0}")]
    Connection(String),

    /// Server sent something that is not Engine.IO.
    #[error("protocol error: {0}")]
    Protocol(String),
}

/// Reconnection policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Reconnect attempts after a lost connection before giving up.
    pub attempts: u32,
    /// Fixed delay between attempts.
    pub delay: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self { attempts: 5, delay: Duration::from_millis(1000) }
    }
}

/// Time a closing session gets to send DISCONNECT before it is aborted.
pub const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

/// Handle to a running WebSocket session.
///
/// Packets sent on `to_server` wait in the channel until the namespace is
/// connected. Lifecycle changes and inbound packets arrive on `from_server`.
pub struct ConnectedClient {
    /// Send packets to the server.
    pub to_server: mpsc::Sender<SocketPacket>,
    /// Receive events from the server.
    pub from_server: mpsc::Receiver<ClientEvent>,
    /// Session task.
    task: JoinHandle<()>,
}

impl ConnectedClient {
    /// Close the session.
    ///
    /// Closing the outbound channel lets a connected session send the
    /// Socket.IO DISCONNECT packet and close the socket. A task still running
    /// after [`SHUTDOWN_GRACE`] (connecting, or waiting to retry) is aborted.
    pub async fn shutdown(self) {
        let Self { to_server, from_server, mut task } = self;
        drop(to_server);

        if timeout(SHUTDOWN_GRACE, &mut task).await.is_err() {
            tracing::debug!("session did not close in time, aborting");
            task.abort();
        }
        drop(from_server);
    }
}

/// Convert a configured endpoint into the Engine.IO WebSocket URL.
///
/// `http://host:5000` becomes
/// `ws://host:5000/socket.io/?EIO=4&transport=websocket`.
pub fn endpoint_url(endpoint: &str) -> Result<Url, TransportError> {
    let mut url = Url::parse(endpoint).map_err(|e| TransportError::Endpoint(e.to_string()))?;

    let scheme = match url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => return Err(TransportError::Endpoint(format!("unsupported scheme: {other}"))),
    };
    url.set_scheme(scheme)
        .map_err(|()| TransportError::Endpoint(format!("cannot use scheme {scheme}")))?;
    url.set_path("/socket.io/");
    url.set_query(Some("EIO=4&transport=websocket"));

    Ok(url)
}

/// Start a session against `endpoint`.
///
/// Returns immediately; the connection is made by a spawned task. Failure to
/// connect only shows as no [`ClientEvent::Connected`] ever arriving. Must be
/// called from within a tokio runtime.
pub fn connect(endpoint: &str, policy: ReconnectPolicy) -> Result<ConnectedClient, TransportError> {
    let url = endpoint_url(endpoint)?;

    let (to_server_tx, to_server_rx) = mpsc::channel::<SocketPacket>(64);
    let (from_server_tx, from_server_rx) = mpsc::channel::<ClientEvent>(64);

    let task = tokio::spawn(run_connection(url, policy, to_server_rx, from_server_tx));

    Ok(ConnectedClient { to_server: to_server_tx, from_server: from_server_rx, task })
}

/// How a single session ended.
#[derive(Debug)]
enum SessionEnd {
    /// Our side went away (outbound channel or event receiver closed).
    Closed,
    /// Server sent a Socket.IO DISCONNECT.
    ServerDisconnect,
    /// Link failed.
    Lost { connected: bool, reason: String },
}

/// Run sessions until closed, retrying lost links per `policy`.
async fn run_connection(
    url: Url,
    policy: ReconnectPolicy,
    mut to_server: mpsc::Receiver<SocketPacket>,
    from_server: mpsc::Sender<ClientEvent>,
) {
    let mut attempts = 0;

    loop {
        tracing::debug!(%url, attempts, "opening session");

        match run_session(&url, &mut to_server, &from_server).await {
            SessionEnd::Closed => {
                tracing::debug!("session closed locally");
                return;
            },
            SessionEnd::ServerDisconnect => {
                tracing::info!("server closed the session");
                let reason = "server disconnect".to_string();
                let _ = from_server.send(ClientEvent::Disconnected { reason }).await;
                return;
            },
            SessionEnd::Lost { connected, reason } => {
                tracing::warn!(%reason, "connection lost");
                if from_server.send(ClientEvent::Disconnected { reason }).await.is_err() {
                    return;
                }
                if connected {
                    attempts = 0;
                }
                if attempts >= policy.attempts {
                    tracing::warn!(attempts, "reconnection attempts exhausted");
                    return;
                }
                attempts += 1;
                sleep(policy.delay).await;
            },
        }
    }
}

/// Run one WebSocket session from handshake to close.
async fn run_session(
    url: &Url,
    to_server: &mut mpsc::Receiver<SocketPacket>,
    from_server: &mpsc::Sender<ClientEvent>,
) -> SessionEnd {
    let lost = |connected: bool, reason: String| SessionEnd::Lost { connected, reason };

    let (ws, _response) = match connect_async(url.as_str()).await {
        Ok(ws) => ws,
        Err(e) => return lost(false, e.to_string()),
    };
    let (mut sink, mut source) = ws.split();

    let open = match wait_for_open(&mut source).await {
        Ok(open) => open,
        Err(e) => return lost(false, e.to_string()),
    };
    tracing::debug!(sid = %open.sid, "engine open");

    if let Err(e) = send_packet(&mut sink, &SocketPacket::connect()).await {
        return lost(false, e.to_string());
    }

    let heartbeat = heartbeat(&open);
    let deadline = sleep(heartbeat);
    tokio::pin!(deadline);
    let mut connected = false;

    loop {
        tokio::select! {
            frame = source.next() => {
                let text = match frame {
                    Some(Ok(Message::Text(text))) => text,
                    Some(Ok(Message::Close(_))) | None => {
                        return lost(connected, "socket closed".to_string());
                    },
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => return lost(connected, e.to_string()),
                };
                if let Some(next) = Instant::now().checked_add(heartbeat) {
                    deadline.as_mut().reset(next);
                }

                match EnginePacket::decode(text.as_str()) {
                    Ok(EnginePacket::Ping(data)) => {
                        if let Err(e) = send_engine(&mut sink, &EnginePacket::Pong(data)).await {
                            return lost(connected, e.to_string());
                        }
                    },
                    Ok(EnginePacket::Message(payload)) => {
                        let packet = match SocketPacket::decode(&payload) {
                            Ok(packet) => packet,
                            Err(e) => {
                                tracing::warn!(error = %e, "dropping undecodable packet");
                                continue;
                            },
                        };
                        let event = match packet.kind {
                            PacketKind::Connect => {
                                connected = true;
                                ClientEvent::Connected
                            },
                            PacketKind::Disconnect => return SessionEnd::ServerDisconnect,
                            _ => ClientEvent::PacketReceived(packet),
                        };
                        if from_server.send(event).await.is_err() {
                            return SessionEnd::Closed;
                        }
                    },
                    Ok(EnginePacket::Close) => return lost(connected, "engine close".to_string()),
                    Ok(other) => tracing::trace!(?other, "ignoring engine packet"),
                    Err(e) => tracing::warn!(error = %e, "dropping undecodable frame"),
                }
            },
            outbound = to_server.recv(), if connected => {
                let Some(packet) = outbound else {
                    let _ = send_packet(&mut sink, &SocketPacket::disconnect()).await;
                    let _ = sink.close().await;
                    return SessionEnd::Closed;
                };
                if let Err(e) = send_packet(&mut sink, &packet).await {
                    return lost(connected, e.to_string());
                }
            },
            () = &mut deadline => return lost(connected, "ping timeout".to_string()),
        }
    }
}

/// Silence allowed before the link counts as lost.
fn heartbeat(open: &OpenPayload) -> Duration {
    Duration::from_millis(open.ping_interval.saturating_add(open.ping_timeout))
}

/// Read frames until the Engine.IO `open` packet arrives.
async fn wait_for_open(source: &mut WsSource) -> Result<OpenPayload, TransportError> {
    while let Some(frame) = source.next().await {
        match frame.map_err(|e| TransportError::Connection(e.to_string()))? {
            Message::Text(text) => {
                return match EnginePacket::decode(text.as_str()) {
                    Ok(EnginePacket::Open(open)) => Ok(open),
                    Ok(other) => {
                        Err(TransportError::Protocol(format!("expected open, got {other:?}")))
                    },
                    Err(e) => Err(TransportError::Protocol(e.to_string())),
                };
            },
            Message::Close(_) => break,
            _ => {},
        }
    }
    Err(TransportError::Connection("closed before handshake".to_string()))
}

async fn send_packet(sink: &mut WsSink, packet: &SocketPacket) -> Result<(), TransportError> {
    send_engine(sink, &EnginePacket::Message(packet.encode())).await
}

async fn send_engine(sink: &mut WsSink, packet: &EnginePacket) -> Result<(), TransportError> {
    let text = packet.encode().map_err(|e| TransportError::Protocol(e.to_string()))?;
    sink.send(Message::text(text)).await.map_err(|e| TransportError::Connection(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_url_converts_http() {
        let url = endpoint_url("http://localhost:5000").unwrap();
        assert_eq!(url.as_str(), "ws://localhost:5000/socket.io/?EIO=4&transport=websocket");
    }

    #[test]
    fn endpoint_url_converts_https() {
        let url = endpoint_url("https://chat.example.com").unwrap();
        assert_eq!(url.as_str(), "wss://chat.example.com/socket.io/?EIO=4&transport=websocket");
    }

    #[test]
    fn endpoint_url_rejects_other_schemes() {
        assert!(matches!(endpoint_url("ftp://host"), Err(TransportError::Endpoint(_))));
        assert!(matches!(endpoint_url("not a url"), Err(TransportError::Endpoint(_))));
    }

    #[test]
    fn heartbeat_saturates_on_huge_intervals() {
        let open = OpenPayload {
            sid: "s".into(),
            upgrades: vec![],
            ping_interval: u64::MAX,
            ping_timeout: 20_000,
            max_payload: 0,
        };
        assert_eq!(heartbeat(&open), Duration::from_millis(u64::MAX));

        let open = OpenPayload { ping_interval: 25_000, ..open };
        assert_eq!(heartbeat(&open), Duration::from_millis(45_000));
    }

    #[test]
    fn default_policy_matches_library_defaults() {
        let policy = ReconnectPolicy::default();
        assert_eq!(policy.attempts, 5);
        assert_eq!(policy.delay, Duration::from_secs(1));
    }
}
