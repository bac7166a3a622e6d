use crate::protocol::packet::{MinecraftPacketBuffer, Packet};
use crate::protocol::registry::PacketKind;
use crate::world::environment::Environment;
use serde::Deserialize;
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum GameMode {
    Survival = 0,
    Creative = 1,
    #[default]
    Adventure = 2,
    Spectator = 3,
}

/// Data-kept flag for entity metadata.
const KEEP_METADATA: u8 = 0x02;

/// Moves the client into another world.
#[derive(Debug, Clone, PartialEq)]
pub struct RespawnPacket {
    pub environment: Environment,
    pub world_name: String,
    pub hashed_seed: i64,
    pub game_mode: GameMode,
    pub debug: bool,
    pub flat: bool,
    pub copy_metadata: bool,
}

impl RespawnPacket {
    pub fn new(environment: Environment, world_name: &str, game_mode: GameMode) -> Self {
        Self {
            environment,
            world_name: world_name.to_string(),
            hashed_seed: 0,
            game_mode,
            debug: false,
            flat: true,
            copy_metadata: false,
        }
    }

    fn dimension_name(&self) -> String {
        dimension_name(&self.world_name)
    }
}

/// World names without a namespace live in `minecraft:`.
pub fn dimension_name(world_name: &str) -> String {
    if world_name.contains(':') {
        world_name.to_string()
    } else {
        format!("minecraft:{}", world_name)
    }
}

impl Packet for RespawnPacket {
    fn kind(&self) -> PacketKind {
        PacketKind::Respawn
    }

    fn write_to_buffer(&self, buffer: &mut MinecraftPacketBuffer) -> io::Result<()> {
        buffer.write_varint(self.environment.dimension_type_index());
        buffer.write_string(&self.dimension_name());
        buffer.write_i64(self.hashed_seed)?;
        buffer.write_u8(self.game_mode as u8);
        // Previous game mode
        buffer.write_u8(self.game_mode as u8);
        buffer.write_bool(self.debug);
        buffer.write_bool(self.flat);
        // No death location, no portal cooldown
        buffer.write_bool(false);
        buffer.write_varint(0);
        buffer.write_u8(if self.copy_metadata { KEEP_METADATA } else { 0 });
        Ok(())
    }
}
