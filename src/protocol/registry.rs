use crate::error::{LimboError, Result};
use std::collections::HashMap;

/// Protocol version the built-in registry targets (Minecraft 1.20.6).
pub const PROTOCOL_VERSION: i32 = 766;
pub const GAME_VERSION: &str = "1.20.6";

/// Every clientbound packet this server can serialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PacketKind {
    StatusResponse,
    PongResponse,
    LoginDisconnect,
    LoginSuccess,
    FinishConfiguration,
    RegistryData,
    KnownPacks,
    SpawnEntity,
    BossEvent,
    ChunkBatchFinished,
    ChunkBatchStart,
    CommandSuggestions,
    UnloadChunk,
    GameEvent,
    KeepAlive,
    LevelChunkWithLight,
    JoinGame,
    SynchronizePlayerPosition,
    RemoveEntities,
    Respawn,
    SetCenterChunk,
    SetEntityData,
}

impl PacketKind {
    pub const ALL: [PacketKind; 22] = [
        PacketKind::StatusResponse,
        PacketKind::PongResponse,
        PacketKind::LoginDisconnect,
        PacketKind::LoginSuccess,
        PacketKind::FinishConfiguration,
        PacketKind::RegistryData,
        PacketKind::KnownPacks,
        PacketKind::SpawnEntity,
        PacketKind::BossEvent,
        PacketKind::ChunkBatchFinished,
        PacketKind::ChunkBatchStart,
        PacketKind::CommandSuggestions,
        PacketKind::UnloadChunk,
        PacketKind::GameEvent,
        PacketKind::KeepAlive,
        PacketKind::LevelChunkWithLight,
        PacketKind::JoinGame,
        PacketKind::SynchronizePlayerPosition,
        PacketKind::RemoveEntities,
        PacketKind::Respawn,
        PacketKind::SetCenterChunk,
        PacketKind::SetEntityData,
    ];
}

/// Maps clientbound packet kinds to the IDs of one protocol version.
///
/// The table is built once at startup and validated before any connection
/// is accepted; afterwards it is only read.
#[derive(Debug, Clone, Default)]
pub struct PacketRegistry {
    ids: HashMap<PacketKind, i32>,
}

impl PacketRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// IDs for protocol 766.
    pub fn protocol_766() -> Self {
        let mut registry = Self::empty();
        // Status
        registry.register(PacketKind::StatusResponse, 0x00);
        registry.register(PacketKind::PongResponse, 0x01);
        // Login
        registry.register(PacketKind::LoginDisconnect, 0x00);
        registry.register(PacketKind::LoginSuccess, 0x02);
        // Configuration
        registry.register(PacketKind::FinishConfiguration, 0x03);
        registry.register(PacketKind::RegistryData, 0x07);
        registry.register(PacketKind::KnownPacks, 0x0E);
        // Play
        registry.register(PacketKind::SpawnEntity, 0x01);
        registry.register(PacketKind::BossEvent, 0x0A);
        registry.register(PacketKind::ChunkBatchFinished, 0x0C);
        registry.register(PacketKind::ChunkBatchStart, 0x0D);
        registry.register(PacketKind::CommandSuggestions, 0x10);
        registry.register(PacketKind::UnloadChunk, 0x21);
        registry.register(PacketKind::GameEvent, 0x22);
        registry.register(PacketKind::KeepAlive, 0x26);
        registry.register(PacketKind::LevelChunkWithLight, 0x27);
        registry.register(PacketKind::JoinGame, 0x2B);
        registry.register(PacketKind::SynchronizePlayerPosition, 0x40);
        registry.register(PacketKind::RemoveEntities, 0x42);
        registry.register(PacketKind::Respawn, 0x47);
        registry.register(PacketKind::SetCenterChunk, 0x54);
        registry.register(PacketKind::SetEntityData, 0x58);
        registry
    }

    pub fn register(&mut self, kind: PacketKind, packet_id: i32) {
        self.ids.insert(kind, packet_id);
    }

    pub fn packet_id(&self, kind: PacketKind) -> Result<i32> {
        self.ids
            .get(&kind)
            .copied()
            .ok_or(LimboError::UnregisteredPacket(kind))
    }

    /// Fails on the first packet kind without an ID.
    pub fn validate(&self) -> Result<()> {
        for kind in PacketKind::ALL {
            self.packet_id(kind)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_protocol_766_registers_every_kind() {
        assert!(PacketRegistry::protocol_766().validate().is_ok());
    }

    #[test]
    fn test_missing_kind_fails_validation() {
        let mut registry = PacketRegistry::empty();
        registry.register(PacketKind::StatusResponse, 0x00);
        assert_matches!(
            registry.validate(),
            Err(LimboError::UnregisteredPacket(PacketKind::PongResponse))
        );
    }

    #[test]
    fn test_lookup() {
        let registry = PacketRegistry::protocol_766();
        assert_eq!(registry.packet_id(PacketKind::LevelChunkWithLight).unwrap(), 0x27);
        assert_eq!(registry.packet_id(PacketKind::RemoveEntities).unwrap(), 0x42);
        assert_eq!(registry.packet_id(PacketKind::KnownPacks).unwrap(), 0x0E);
        assert_eq!(registry.packet_id(PacketKind::JoinGame).unwrap(), 0x2B);
    }
}
