use crate::protocol::boss_event::BossEventPacket;
use crate::protocol::center_chunk::SetCenterChunkPacket;
use crate::protocol::chunk_batch::{ChunkBatchFinishedPacket, ChunkBatchStartPacket};
use crate::protocol::chunk_data::ChunkDataPacket;
use crate::protocol::configuration::{
    ClientboundKnownPacksPacket, FinishConfigurationPacket, RegistryDataPacket,
};
use crate::protocol::entity_metadata::SetEntityDataPacket;
use crate::protocol::game_event::GameEventPacket;
use crate::protocol::join_game::JoinGamePacket;
use crate::protocol::keep_alive::KeepAlivePacket;
use crate::protocol::login::{LoginDisconnectPacket, LoginSuccessPacket};
use crate::protocol::packet::{MinecraftPacketBuffer, Packet};
use crate::protocol::player_movement::SynchronizePlayerPositionPacket;
use crate::protocol::registry::PacketKind;
use crate::protocol::remove_entities::RemoveEntitiesPacket;
use crate::protocol::respawn::RespawnPacket;
use crate::protocol::spawn_entity::SpawnEntityPacket;
use crate::protocol::status::{PongResponsePacket, StatusResponsePacket};
use crate::protocol::tab_complete::CommandSuggestionsPacket;
use crate::protocol::unload_chunk::UnloadChunkPacket;
use std::io;

/// Every packet the server can send, as one closed family.
#[derive(Debug, Clone)]
pub enum ClientboundPacket {
    StatusResponse(StatusResponsePacket),
    PongResponse(PongResponsePacket),
    LoginDisconnect(LoginDisconnectPacket),
    LoginSuccess(LoginSuccessPacket),
    FinishConfiguration(FinishConfigurationPacket),
    RegistryData(RegistryDataPacket),
    KnownPacks(ClientboundKnownPacksPacket),
    SpawnEntity(SpawnEntityPacket),
    BossEvent(BossEventPacket),
    ChunkBatchFinished(ChunkBatchFinishedPacket),
    ChunkBatchStart(ChunkBatchStartPacket),
    CommandSuggestions(CommandSuggestionsPacket),
    UnloadChunk(UnloadChunkPacket),
    GameEvent(GameEventPacket),
    KeepAlive(KeepAlivePacket),
    LevelChunkWithLight(ChunkDataPacket),
    JoinGame(JoinGamePacket),
    SynchronizePlayerPosition(SynchronizePlayerPositionPacket),
    RemoveEntities(RemoveEntitiesPacket),
    Respawn(RespawnPacket),
    SetCenterChunk(SetCenterChunkPacket),
    SetEntityData(SetEntityDataPacket),
}

impl ClientboundPacket {
    fn inner(&self) -> &dyn Packet {
        match self {
            ClientboundPacket::StatusResponse(packet) => packet,
            ClientboundPacket::PongResponse(packet) => packet,
            ClientboundPacket::LoginDisconnect(packet) => packet,
            ClientboundPacket::LoginSuccess(packet) => packet,
            ClientboundPacket::FinishConfiguration(packet) => packet,
            ClientboundPacket::RegistryData(packet) => packet,
            ClientboundPacket::KnownPacks(packet) => packet,
            ClientboundPacket::SpawnEntity(packet) => packet,
            ClientboundPacket::BossEvent(packet) => packet,
            ClientboundPacket::ChunkBatchFinished(packet) => packet,
            ClientboundPacket::ChunkBatchStart(packet) => packet,
            ClientboundPacket::CommandSuggestions(packet) => packet,
            ClientboundPacket::UnloadChunk(packet) => packet,
            ClientboundPacket::GameEvent(packet) => packet,
            ClientboundPacket::KeepAlive(packet) => packet,
            ClientboundPacket::LevelChunkWithLight(packet) => packet,
            ClientboundPacket::JoinGame(packet) => packet,
            ClientboundPacket::SynchronizePlayerPosition(packet) => packet,
            ClientboundPacket::RemoveEntities(packet) => packet,
            ClientboundPacket::Respawn(packet) => packet,
            ClientboundPacket::SetCenterChunk(packet) => packet,
            ClientboundPacket::SetEntityData(packet) => packet,
        }
    }
}

impl Packet for ClientboundPacket {
    fn kind(&self) -> PacketKind {
        self.inner().kind()
    }

    fn write_to_buffer(&self, buffer: &mut MinecraftPacketBuffer) -> io::Result<()> {
        self.inner().write_to_buffer(buffer)
    }
}

macro_rules! impl_from_packet {
    ($($variant:ident => $packet:ty),* $(,)?) => {
        $(
            impl From<$packet> for ClientboundPacket {
                fn from(packet: $packet) -> Self {
                    ClientboundPacket::$variant(packet)
                }
            }
        )*
    };
}

impl_from_packet! {
    StatusResponse => StatusResponsePacket,
    PongResponse => PongResponsePacket,
    LoginDisconnect => LoginDisconnectPacket,
    LoginSuccess => LoginSuccessPacket,
    FinishConfiguration => FinishConfigurationPacket,
    RegistryData => RegistryDataPacket,
    KnownPacks => ClientboundKnownPacksPacket,
    SpawnEntity => SpawnEntityPacket,
    BossEvent => BossEventPacket,
    ChunkBatchFinished => ChunkBatchFinishedPacket,
    ChunkBatchStart => ChunkBatchStartPacket,
    CommandSuggestions => CommandSuggestionsPacket,
    UnloadChunk => UnloadChunkPacket,
    GameEvent => GameEventPacket,
    KeepAlive => KeepAlivePacket,
    LevelChunkWithLight => ChunkDataPacket,
    JoinGame => JoinGamePacket,
    SynchronizePlayerPosition => SynchronizePlayerPositionPacket,
    RemoveEntities => RemoveEntitiesPacket,
    Respawn => RespawnPacket,
    SetCenterChunk => SetCenterChunkPacket,
    SetEntityData => SetEntityDataPacket,
}
