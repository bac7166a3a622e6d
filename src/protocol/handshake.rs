use super::packet::*;
use std::io;

/// What the client wants after the handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextState {
    Status,
    Login,
    Transfer,
}

impl NextState {
    pub fn from_id(id: i32) -> Option<NextState> {
        match id {
            1 => Some(NextState::Status),
            2 => Some(NextState::Login),
            3 => Some(NextState::Transfer),
            _ => None,
        }
    }
}

/// Handshake packet
#[derive(Debug)]
pub struct HandshakePacket {
    pub protocol_version: i32,
    pub server_address: String,
    pub server_port: u16,
    pub next_state: i32,
}

impl HandshakePacket {
    pub fn next_state(&self) -> Option<NextState> {
        NextState::from_id(self.next_state)
    }
}

impl ServerboundPacket for HandshakePacket {
    const PACKET_ID: i32 = 0x00;

    fn read_from_buffer(buffer: &mut MinecraftPacketBuffer) -> io::Result<Self> {
        Ok(HandshakePacket {
            protocol_version: buffer.read_varint()?,
            server_address: buffer.read_string()?,
            server_port: buffer.read_u16()?,
            next_state: buffer.read_varint()?,
        })
    }
}
