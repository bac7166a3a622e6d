use crate::protocol::packet::{MinecraftPacketBuffer, Packet, ServerboundPacket};
use crate::protocol::registry::PacketKind;
use std::io;

#[derive(Debug, Clone)]
pub struct KeepAlivePacket {
    pub keep_alive_id: i64,
}

impl KeepAlivePacket {
    pub fn new(keep_alive_id: i64) -> Self {
        Self { keep_alive_id }
    }
}

impl Packet for KeepAlivePacket {
    fn kind(&self) -> PacketKind {
        PacketKind::KeepAlive
    }

    fn write_to_buffer(&self, buffer: &mut MinecraftPacketBuffer) -> io::Result<()> {
        buffer.write_i64(self.keep_alive_id)
    }
}

/// The client's echo of a keep alive, in the play state.
#[derive(Debug, Clone)]
pub struct KeepAliveResponsePacket {
    pub keep_alive_id: i64,
}

impl ServerboundPacket for KeepAliveResponsePacket {
    const PACKET_ID: i32 = 0x18;

    fn read_from_buffer(buffer: &mut MinecraftPacketBuffer) -> io::Result<Self> {
        Ok(KeepAliveResponsePacket {
            keep_alive_id: buffer.read_i64()?,
        })
    }
}
