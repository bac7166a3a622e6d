use crate::protocol::packet::{MinecraftPacketBuffer, Packet};
use crate::protocol::registry::PacketKind;
use std::io;

/// Destroys any number of entities in one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveEntitiesPacket {
    pub entity_ids: Vec<i32>,
}

impl RemoveEntitiesPacket {
    pub fn new(entity_ids: Vec<i32>) -> Self {
        Self { entity_ids }
    }
}

impl Packet for RemoveEntitiesPacket {
    fn kind(&self) -> PacketKind {
        PacketKind::RemoveEntities
    }

    fn write_to_buffer(&self, buffer: &mut MinecraftPacketBuffer) -> io::Result<()> {
        buffer.write_varint(self.entity_ids.len() as i32);
        for entity_id in &self.entity_ids {
            buffer.write_varint(*entity_id);
        }
        Ok(())
    }
}
