use crate::protocol::packet::{MinecraftPacketBuffer, Packet};
use crate::protocol::registry::PacketKind;
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnloadChunkPacket {
    pub x: i32,
    pub z: i32,
}

impl Packet for UnloadChunkPacket {
    fn kind(&self) -> PacketKind {
        PacketKind::UnloadChunk
    }

    /// Z comes before X on the wire.
    fn write_to_buffer(&self, buffer: &mut MinecraftPacketBuffer) -> io::Result<()> {
        buffer.write_i32(self.z)?;
        buffer.write_i32(self.x)
    }
}
