use crate::error::{LimboError, Result};
use crate::protocol::clientbound::ClientboundPacket;
use crate::protocol::packet::serialize;
use crate::protocol::registry::PacketRegistry;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

/// Protocol state of one connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ConnectionState {
    Handshake = 0,
    Status = 1,
    Login = 2,
    Configuration = 3,
    Play = 4,
}

impl ConnectionState {
    fn from_u8(value: u8) -> ConnectionState {
        match value {
            1 => ConnectionState::Status,
            2 => ConnectionState::Login,
            3 => ConnectionState::Configuration,
            4 => ConnectionState::Play,
            _ => ConnectionState::Handshake,
        }
    }
}

/// What the view manager needs from a connection: its state and an ordered
/// send path.
pub trait ClientConnection {
    fn state(&self) -> ConnectionState;

    /// Queues a packet. Packets go out in the order they were queued.
    fn send_packet(&self, packet: ClientboundPacket) -> Result<()>;
}

/// Sending side of a live connection. Packets are serialized on the caller's
/// thread and handed to the connection's writer task, so sending never
/// blocks.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    state: Arc<AtomicU8>,
    outbound: UnboundedSender<Vec<u8>>,
    registry: Arc<PacketRegistry>,
}

impl ConnectionHandle {
    pub fn new(outbound: UnboundedSender<Vec<u8>>, registry: Arc<PacketRegistry>) -> Self {
        Self {
            state: Arc::new(AtomicU8::new(ConnectionState::Handshake as u8)),
            outbound,
            registry,
        }
    }

    pub fn set_state(&self, state: ConnectionState) {
        self.state.store(state as u8, Ordering::Release);
    }

    pub fn is_closed(&self) -> bool {
        self.outbound.is_closed()
    }
}

impl ClientConnection for ConnectionHandle {
    fn state(&self) -> ConnectionState {
        ConnectionState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn send_packet(&self, packet: ClientboundPacket) -> Result<()> {
        let bytes = serialize(&packet, &self.registry)?;
        self.outbound
            .send(bytes)
            .map_err(|_| LimboError::ConnectionClosed)
    }
}
