use crate::protocol::packet::{MinecraftPacketBuffer, Packet};
use crate::protocol::registry::PacketKind;
use std::io;

/// Opens a group of chunk data messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkBatchStartPacket;

impl Packet for ChunkBatchStartPacket {
    fn kind(&self) -> PacketKind {
        PacketKind::ChunkBatchStart
    }

    fn write_to_buffer(&self, _buffer: &mut MinecraftPacketBuffer) -> io::Result<()> {
        Ok(())
    }
}

/// Closes a group; `batch_size` is the number of chunk messages sent since
/// the matching start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkBatchFinishedPacket {
    pub batch_size: i32,
}

impl Packet for ChunkBatchFinishedPacket {
    fn kind(&self) -> PacketKind {
        PacketKind::ChunkBatchFinished
    }

    fn write_to_buffer(&self, buffer: &mut MinecraftPacketBuffer) -> io::Result<()> {
        buffer.write_varint(self.batch_size);
        Ok(())
    }
}
