use crate::protocol::packet::{MinecraftPacketBuffer, Packet};
use crate::protocol::registry::PacketKind;
use crate::world::entity::{EntitySnapshot, MetadataEntry, MetadataValue};
use std::io;

/// Marks the end of the metadata entry list.
const END_OF_METADATA: u8 = 0xFF;

#[derive(Debug, Clone, PartialEq)]
pub struct SetEntityDataPacket {
    pub entity_id: i32,
    pub entries: Vec<MetadataEntry>,
}

impl SetEntityDataPacket {
    pub fn from_entity(entity: &EntitySnapshot) -> Self {
        Self {
            entity_id: entity.entity_id,
            entries: entity.metadata.clone(),
        }
    }
}

fn write_value(buffer: &mut MinecraftPacketBuffer, value: &MetadataValue) -> io::Result<()> {
    match value {
        MetadataValue::Byte(byte) => buffer.write_i8(*byte),
        MetadataValue::VarInt(int) => buffer.write_varint(*int),
        MetadataValue::Float(float) => buffer.write_f32(*float)?,
        MetadataValue::String(string) => buffer.write_string(string),
        MetadataValue::Component(component) => buffer.write_bytes_raw(component.as_bytes()),
        MetadataValue::OptionalComponent(component) => {
            buffer.write_bool(component.is_some());
            if let Some(component) = component {
                buffer.write_bytes_raw(component.as_bytes());
            }
        }
        MetadataValue::Boolean(flag) => buffer.write_bool(*flag),
    }
    Ok(())
}

impl Packet for SetEntityDataPacket {
    fn kind(&self) -> PacketKind {
        PacketKind::SetEntityData
    }

    fn write_to_buffer(&self, buffer: &mut MinecraftPacketBuffer) -> io::Result<()> {
        buffer.write_varint(self.entity_id);
        for entry in &self.entries {
            buffer.write_u8(entry.index);
            buffer.write_varint(entry.value.serializer_id());
            write_value(buffer, &entry.value)?;
        }
        buffer.write_u8(END_OF_METADATA);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::component::Component;

    #[test]
    fn test_empty_metadata_is_just_terminator() {
        let mut buffer = MinecraftPacketBuffer::new();
        SetEntityDataPacket {
            entity_id: 5,
            entries: Vec::new(),
        }
        .write_to_buffer(&mut buffer)
        .unwrap();
        assert_eq!(buffer.buffer, vec![0x05, 0xFF]);
    }

    #[test]
    fn test_entries_carry_serializer_ids() {
        let name = Component::text("Hi");
        let mut buffer = MinecraftPacketBuffer::new();
        SetEntityDataPacket {
            entity_id: 1,
            entries: vec![
                MetadataEntry::new(0, MetadataValue::Byte(0x20)),
                MetadataEntry::new(2, MetadataValue::OptionalComponent(Some(name.clone()))),
                MetadataEntry::new(3, MetadataValue::Boolean(true)),
            ],
        }
        .write_to_buffer(&mut buffer)
        .unwrap();

        let mut expected = vec![0x01, 0x00, 0x00, 0x20, 0x02, 0x06, 0x01];
        expected.extend_from_slice(name.as_bytes());
        expected.extend_from_slice(&[0x03, 0x08, 0x01, 0xFF]);
        assert_eq!(buffer.buffer, expected);
    }
}
