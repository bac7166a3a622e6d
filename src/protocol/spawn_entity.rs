use crate::protocol::packet::{MinecraftPacketBuffer, Packet};
use crate::protocol::registry::PacketKind;
use crate::world::entity::EntitySnapshot;
use std::io;
use uuid::Uuid;

/// Spawns a non-living or living entity on the client.
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnEntityPacket {
    pub entity_id: i32,
    pub uuid: Uuid,
    pub entity_type: i32,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub pitch: f32,
    pub yaw: f32,
    pub head_yaw: f32,
    pub data: i32,
    pub velocity_x: f64,
    pub velocity_y: f64,
    pub velocity_z: f64,
}

impl SpawnEntityPacket {
    pub fn from_entity(entity: &EntitySnapshot) -> Self {
        let location = &entity.location;
        Self {
            entity_id: entity.entity_id,
            uuid: entity.uuid,
            entity_type: entity.entity_type.type_id(),
            x: location.x,
            y: location.y,
            z: location.z,
            pitch: location.pitch,
            yaw: location.yaw,
            head_yaw: entity.head_yaw,
            data: entity.data,
            velocity_x: entity.velocity.x,
            velocity_y: entity.velocity.y,
            velocity_z: entity.velocity.z,
        }
    }
}

impl Packet for SpawnEntityPacket {
    fn kind(&self) -> PacketKind {
        PacketKind::SpawnEntity
    }

    fn write_to_buffer(&self, buffer: &mut MinecraftPacketBuffer) -> io::Result<()> {
        buffer.write_varint(self.entity_id);
        buffer.write_uuid(self.uuid)?;
        buffer.write_varint(self.entity_type);
        buffer.write_f64(self.x)?;
        buffer.write_f64(self.y)?;
        buffer.write_f64(self.z)?;
        buffer.write_angle(self.pitch);
        buffer.write_angle(self.yaw);
        buffer.write_angle(self.head_yaw);
        buffer.write_varint(self.data);
        buffer.write_velocity(self.velocity_x)?;
        buffer.write_velocity(self.velocity_y)?;
        buffer.write_velocity(self.velocity_z)
    }
}
