use super::packet::*;
use crate::protocol::registry::PacketKind;
use serde::Serialize;
use std::io;

/// Status request, sent right after a status handshake. Has no fields.
pub struct StatusRequestPacket;

impl ServerboundPacket for StatusRequestPacket {
    const PACKET_ID: i32 = 0x00;

    fn read_from_buffer(_buffer: &mut MinecraftPacketBuffer) -> io::Result<Self> {
        Ok(StatusRequestPacket)
    }
}

pub struct PingRequestPacket {
    pub payload: i64,
}

impl ServerboundPacket for PingRequestPacket {
    const PACKET_ID: i32 = 0x01;

    fn read_from_buffer(buffer: &mut MinecraftPacketBuffer) -> io::Result<Self> {
        Ok(PingRequestPacket {
            payload: buffer.read_i64()?,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusVersion {
    pub name: String,
    pub protocol: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusPlayers {
    pub max: i32,
    pub online: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusDescription {
    pub text: String,
}

/// Body of the server list ping response.
#[derive(Debug, Clone, Serialize)]
pub struct ServerStatus {
    pub version: StatusVersion,
    pub players: StatusPlayers,
    pub description: StatusDescription,
}

#[derive(Debug, Clone)]
pub struct StatusResponsePacket {
    pub response: String,
}

impl StatusResponsePacket {
    pub fn new(status: &ServerStatus) -> Result<Self, serde_json::Error> {
        Ok(Self {
            response: serde_json::to_string(status)?,
        })
    }
}

impl Packet for StatusResponsePacket {
    fn kind(&self) -> PacketKind {
        PacketKind::StatusResponse
    }

    fn write_to_buffer(&self, buffer: &mut MinecraftPacketBuffer) -> io::Result<()> {
        buffer.write_string(&self.response);
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct PongResponsePacket {
    pub payload: i64,
}

impl Packet for PongResponsePacket {
    fn kind(&self) -> PacketKind {
        PacketKind::PongResponse
    }

    fn write_to_buffer(&self, buffer: &mut MinecraftPacketBuffer) -> io::Result<()> {
        buffer.write_i64(self.payload)
    }
}
