#![allow(dead_code)]

use futures::{SinkExt, StreamExt};
use limbo::config::ServerProperties;
use limbo::error::{LimboError, Result};
use limbo::protocol::clientbound::ClientboundPacket;
use limbo::protocol::frame::{FrameCodec, RawPacket};
use limbo::protocol::packet::MinecraftPacketBuffer;
use limbo::protocol::registry::{PacketKind, PacketRegistry, GAME_VERSION, PROTOCOL_VERSION};
use limbo::server::connection::{ClientConnection, ConnectionState};
use limbo::server::{self, Server};
use limbo::world::palette::load_bundled_global_palette;
use limbo::Packet;
use std::cell::{Cell, RefCell};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_util::codec::Framed;
use uuid::Uuid;

pub type Client = Framed<TcpStream, FrameCodec>;

const READ_TIMEOUT: Duration = Duration::from_secs(5);

/// Starts a server on an ephemeral local port.
pub async fn start_server(properties: ServerProperties) -> SocketAddr {
    load_bundled_global_palette().unwrap();
    let server = Arc::new(Server::new(properties, PacketRegistry::protocol_766()).unwrap());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(server::serve(listener, server));
    addr
}

pub fn test_properties() -> ServerProperties {
    ServerProperties {
        view_distance: 2,
        ..ServerProperties::default()
    }
}

pub async fn connect_to_server(addr: SocketAddr) -> Client {
    Framed::new(TcpStream::connect(addr).await.unwrap(), FrameCodec)
}

/// Sends `[id][payload]` built by `write`.
pub async fn send_frame(
    client: &mut Client,
    id: i32,
    write: impl FnOnce(&mut MinecraftPacketBuffer),
) -> std::io::Result<()> {
    let mut buffer = MinecraftPacketBuffer::new();
    buffer.write_varint(id);
    write(&mut buffer);
    client.send(buffer.into_inner()).await
}

pub async fn send_handshake(client: &mut Client, next_state: i32) -> std::io::Result<()> {
    send_frame(client, 0x00, |buffer| {
        buffer.write_varint(PROTOCOL_VERSION);
        buffer.write_string("localhost");
        buffer.write_u16(25565).unwrap();
        buffer.write_varint(next_state);
    })
    .await
}

pub async fn send_login_start(client: &mut Client, username: &str) -> std::io::Result<()> {
    send_frame(client, 0x00, |buffer| {
        buffer.write_string(username);
        buffer.write_uuid(Uuid::nil()).unwrap();
    })
    .await
}

/// Next frame, or `None` once the server closed the connection.
pub async fn read_frame(client: &mut Client) -> Option<RawPacket> {
    match timeout(READ_TIMEOUT, client.next()).await {
        Ok(Some(Ok(frame))) => Some(frame),
        Ok(_) => None,
        Err(_) => panic!("Timed out waiting for a frame"),
    }
}

/// Reads until a frame with `id` arrives, returning it and every frame
/// skipped on the way.
pub async fn read_until(client: &mut Client, id: i32) -> (RawPacket, Vec<RawPacket>) {
    let mut skipped = Vec::new();
    loop {
        let frame = read_frame(client).await.expect("connection closed");
        if frame.id == id {
            return (frame, skipped);
        }
        skipped.push(frame);
    }
}

/// Logs in and acknowledges, leaving the client in configuration.
pub async fn log_in(addr: SocketAddr, username: &str) -> Client {
    let mut client = connect_to_server(addr).await;
    send_handshake(&mut client, 2).await.unwrap();
    send_login_start(&mut client, username).await.unwrap();
    let success = read_frame(&mut client).await.unwrap();
    assert_eq!(success.id, 0x02);
    send_frame(&mut client, 0x03, |_| {}).await.unwrap();
    client
}

pub async fn send_vanilla_known_packs(client: &mut Client) -> std::io::Result<()> {
    send_frame(client, 0x07, |buffer| {
        buffer.write_varint(1);
        buffer.write_string("minecraft");
        buffer.write_string("core");
        buffer.write_string(GAME_VERSION);
    })
    .await
}

/// Runs the configuration exchange. Returns the registry data frames.
pub async fn configure(client: &mut Client) -> Vec<RawPacket> {
    let known_packs = read_frame(client).await.unwrap();
    assert_eq!(known_packs.id, 0x0E);
    send_vanilla_known_packs(client).await.unwrap();

    let (_, registries) = read_until(client, 0x03).await;
    assert!(registries.iter().all(|frame| frame.id == 0x07));
    send_frame(client, 0x03, |_| {}).await.unwrap();
    registries
}

/// Logs a player all the way into the play state, consuming the join packet.
pub async fn join(addr: SocketAddr, username: &str) -> Client {
    let mut client = log_in(addr, username).await;
    configure(&mut client).await;
    let join_game = read_frame(&mut client).await.unwrap();
    assert_eq!(join_game.id, 0x2B);
    client
}

pub fn assert_response_contains_status_fields(response: &str) {
    let value: serde_json::Value = serde_json::from_str(response).unwrap();
    assert!(value.get("version").is_some(), "Response missing version field");
    assert!(value.get("players").is_some(), "Response missing players field");
    assert!(value.get("description").is_some(), "Response missing description field");
}

/// Connection stand-in that records what it was asked to send.
pub struct RecordingConnection {
    state: Cell<ConnectionState>,
    fail: Cell<bool>,
    sent: RefCell<Vec<ClientboundPacket>>,
}

impl RecordingConnection {
    pub fn new(state: ConnectionState) -> Self {
        Self {
            state: Cell::new(state),
            fail: Cell::new(false),
            sent: RefCell::new(Vec::new()),
        }
    }

    pub fn playing() -> Self {
        Self::new(ConnectionState::Play)
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.set(fail);
    }

    /// Takes everything sent so far.
    pub fn drain(&self) -> Vec<ClientboundPacket> {
        self.sent.borrow_mut().drain(..).collect()
    }

    pub fn drain_kinds(&self) -> Vec<PacketKind> {
        self.drain().iter().map(|packet| packet.kind()).collect()
    }
}

impl ClientConnection for RecordingConnection {
    fn state(&self) -> ConnectionState {
        self.state.get()
    }

    fn send_packet(&self, packet: ClientboundPacket) -> Result<()> {
        if self.fail.get() {
            return Err(LimboError::ConnectionClosed);
        }
        self.sent.borrow_mut().push(packet);
        Ok(())
    }
}
