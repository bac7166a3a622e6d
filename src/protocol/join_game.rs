use crate::protocol::packet::{MinecraftPacketBuffer, Packet};
use crate::protocol::registry::PacketKind;
use crate::protocol::respawn::{dimension_name, GameMode};
use crate::world::environment::Environment;
use std::io;

/// Login (play): the first packet after configuration. Puts the client into
/// its spawn world.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinGamePacket {
    pub entity_id: i32,
    pub is_hardcore: bool,
    /// Every world on the server, namespaced.
    pub world_names: Vec<String>,
    /// Ignored by the client.
    pub max_players: i32,
    pub view_distance: i32,
    pub simulation_distance: i32,
    pub reduced_debug_info: bool,
    pub enable_respawn_screen: bool,
    pub limited_crafting: bool,
    pub environment: Environment,
    pub world_name: String,
    pub hashed_seed: i64,
    pub game_mode: GameMode,
    /// -1 when there is none.
    pub previous_game_mode: i8,
    pub is_debug: bool,
    pub is_flat: bool,
    pub enforces_secure_chat: bool,
}

impl JoinGamePacket {
    pub fn new(entity_id: i32, environment: Environment, world_name: &str, game_mode: GameMode) -> Self {
        Self {
            entity_id,
            is_hardcore: false,
            world_names: vec![dimension_name(world_name)],
            max_players: 0,
            view_distance: 2,
            simulation_distance: 2,
            reduced_debug_info: false,
            enable_respawn_screen: true,
            limited_crafting: false,
            environment,
            world_name: dimension_name(world_name),
            hashed_seed: 0,
            game_mode,
            previous_game_mode: -1,
            is_debug: false,
            is_flat: true,
            enforces_secure_chat: false,
        }
    }

    pub fn with_world_names(mut self, world_names: Vec<String>) -> Self {
        self.world_names = world_names.iter().map(|name| dimension_name(name)).collect();
        self
    }

    pub fn with_limits(mut self, max_players: i32, view_distance: i32) -> Self {
        self.max_players = max_players;
        self.view_distance = view_distance;
        self.simulation_distance = view_distance;
        self
    }
}

impl Packet for JoinGamePacket {
    fn kind(&self) -> PacketKind {
        PacketKind::JoinGame
    }

    fn write_to_buffer(&self, buffer: &mut MinecraftPacketBuffer) -> io::Result<()> {
        buffer.write_i32(self.entity_id)?;
        buffer.write_bool(self.is_hardcore);
        buffer.write_varint(self.world_names.len() as i32);
        for world_name in &self.world_names {
            buffer.write_string(world_name);
        }
        buffer.write_varint(self.max_players);
        buffer.write_varint(self.view_distance);
        buffer.write_varint(self.simulation_distance);
        buffer.write_bool(self.reduced_debug_info);
        buffer.write_bool(self.enable_respawn_screen);
        buffer.write_bool(self.limited_crafting);

        buffer.write_varint(self.environment.dimension_type_index());
        buffer.write_string(&self.world_name);
        buffer.write_i64(self.hashed_seed)?;
        buffer.write_u8(self.game_mode as u8);
        buffer.write_i8(self.previous_game_mode);
        buffer.write_bool(self.is_debug);
        buffer.write_bool(self.is_flat);
        // No death location, no portal cooldown
        buffer.write_bool(false);
        buffer.write_varint(0);

        buffer.write_bool(self.enforces_secure_chat);
        Ok(())
    }
}
