use crate::protocol::packet::{MinecraftPacketBuffer, Packet};
use crate::protocol::registry::PacketKind;
use std::io;

/// Tells the client which chunk its view is centred on. Chunks outside the
/// view distance around it are dropped by the client, so this is sent on
/// join and whenever the player crosses a chunk border.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetCenterChunkPacket {
    pub chunk_x: i32,
    pub chunk_z: i32,
}

impl SetCenterChunkPacket {
    pub fn new(chunk_x: i32, chunk_z: i32) -> Self {
        SetCenterChunkPacket { chunk_x, chunk_z }
    }
}

impl Packet for SetCenterChunkPacket {
    fn kind(&self) -> PacketKind {
        PacketKind::SetCenterChunk
    }

    fn write_to_buffer(&self, buffer: &mut MinecraftPacketBuffer) -> io::Result<()> {
        buffer.write_varint(self.chunk_x);
        buffer.write_varint(self.chunk_z);
        Ok(())
    }
}
