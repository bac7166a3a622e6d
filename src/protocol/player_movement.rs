use crate::protocol::packet::{MinecraftPacketBuffer, Packet, ServerboundPacket};
use crate::protocol::registry::PacketKind;
use crate::world::entity::Location;
use std::io;

/// Synchronize Player Position: moves the client and closes the loading
/// screen on join. The client answers with a teleport confirmation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynchronizePlayerPositionPacket {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub yaw: f32,
    pub pitch: f32,
    /// Bit field marking which of the values are relative.
    pub flags: u8,
    pub teleport_id: i32,
}

impl SynchronizePlayerPositionPacket {
    /// Absolute teleport to `location`.
    pub fn absolute(location: &Location, teleport_id: i32) -> Self {
        Self {
            x: location.x,
            y: location.y,
            z: location.z,
            yaw: location.yaw,
            pitch: location.pitch,
            flags: 0,
            teleport_id,
        }
    }
}

impl Packet for SynchronizePlayerPositionPacket {
    fn kind(&self) -> PacketKind {
        PacketKind::SynchronizePlayerPosition
    }

    fn write_to_buffer(&self, buffer: &mut MinecraftPacketBuffer) -> io::Result<()> {
        buffer.write_f64(self.x)?;
        buffer.write_f64(self.y)?;
        buffer.write_f64(self.z)?;
        buffer.write_f32(self.yaw)?;
        buffer.write_f32(self.pitch)?;
        buffer.write_u8(self.flags);
        buffer.write_varint(self.teleport_id);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SetPlayerPositionPacket {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub on_ground: bool,
}

impl ServerboundPacket for SetPlayerPositionPacket {
    const PACKET_ID: i32 = 0x1A;

    fn read_from_buffer(buffer: &mut MinecraftPacketBuffer) -> io::Result<Self> {
        Ok(SetPlayerPositionPacket {
            x: buffer.read_f64()?,
            y: buffer.read_f64()?,
            z: buffer.read_f64()?,
            on_ground: buffer.read_bool()?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SetPlayerPositionAndRotationPacket {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub yaw: f32,
    pub pitch: f32,
    pub on_ground: bool,
}

impl ServerboundPacket for SetPlayerPositionAndRotationPacket {
    const PACKET_ID: i32 = 0x1B;

    fn read_from_buffer(buffer: &mut MinecraftPacketBuffer) -> io::Result<Self> {
        Ok(SetPlayerPositionAndRotationPacket {
            x: buffer.read_f64()?,
            y: buffer.read_f64()?,
            z: buffer.read_f64()?,
            yaw: buffer.read_f32()?,
            pitch: buffer.read_f32()?,
            on_ground: buffer.read_bool()?,
        })
    }
}
