use crate::error::{LimboError, Result};
use crate::protocol::packet::{MinecraftPacketBuffer, Packet, ServerboundPacket};
use crate::protocol::registry::{PacketKind, GAME_VERSION};
use serde::Deserialize;
use std::io;

/// Entry names of the registries the client needs before it can join,
/// in vanilla registry order.
const BUNDLED_REGISTRIES: &str = include_str!("../../data/registries.json");

/// A data pack both sides can agree on, so registry entries are sent by name
/// only and the client fills in their contents from its own copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnownPack {
    pub namespace: String,
    pub id: String,
    pub version: String,
}

impl KnownPack {
    /// The vanilla pack every client of this version ships with.
    pub fn vanilla() -> Self {
        KnownPack {
            namespace: "minecraft".to_string(),
            id: "core".to_string(),
            version: GAME_VERSION.to_string(),
        }
    }

    fn write(&self, buffer: &mut MinecraftPacketBuffer) {
        buffer.write_string(&self.namespace);
        buffer.write_string(&self.id);
        buffer.write_string(&self.version);
    }

    fn read(buffer: &mut MinecraftPacketBuffer) -> io::Result<Self> {
        Ok(KnownPack {
            namespace: buffer.read_string()?,
            id: buffer.read_string()?,
            version: buffer.read_string()?,
        })
    }
}

/// Packs the server offers at the start of configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientboundKnownPacksPacket {
    pub packs: Vec<KnownPack>,
}

impl ClientboundKnownPacksPacket {
    pub fn vanilla() -> Self {
        ClientboundKnownPacksPacket {
            packs: vec![KnownPack::vanilla()],
        }
    }
}

impl Packet for ClientboundKnownPacksPacket {
    fn kind(&self) -> PacketKind {
        PacketKind::KnownPacks
    }

    fn write_to_buffer(&self, buffer: &mut MinecraftPacketBuffer) -> io::Result<()> {
        buffer.write_varint(self.packs.len() as i32);
        for pack in &self.packs {
            pack.write(buffer);
        }
        Ok(())
    }
}

/// The subset of offered packs the client also has.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerboundKnownPacksPacket {
    pub packs: Vec<KnownPack>,
}

impl ServerboundPacket for ServerboundKnownPacksPacket {
    const PACKET_ID: i32 = 0x07;

    fn read_from_buffer(buffer: &mut MinecraftPacketBuffer) -> io::Result<Self> {
        let count = buffer.read_varint()?;
        let count = usize::try_from(count)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "Negative pack count"))?;
        let mut packs = Vec::with_capacity(count.min(64));
        for _ in 0..count {
            packs.push(KnownPack::read(buffer)?);
        }
        Ok(ServerboundKnownPacksPacket { packs })
    }
}

/// One synced registry. Entries carry no data; the client takes it from the
/// shared vanilla pack.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegistryDataPacket {
    pub registry: String,
    pub entries: Vec<String>,
}

impl RegistryDataPacket {
    /// Registries compiled into the binary.
    pub fn bundled() -> Result<Vec<RegistryDataPacket>> {
        serde_json::from_str(BUNDLED_REGISTRIES)
            .map_err(|err| LimboError::ConfigError(format!("Malformed registry data: {}", err)))
    }
}

impl Packet for RegistryDataPacket {
    fn kind(&self) -> PacketKind {
        PacketKind::RegistryData
    }

    fn write_to_buffer(&self, buffer: &mut MinecraftPacketBuffer) -> io::Result<()> {
        buffer.write_string(&self.registry);
        buffer.write_varint(self.entries.len() as i32);
        for entry in &self.entries {
            buffer.write_string(entry);
            // No inline data
            buffer.write_bool(false);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinishConfigurationPacket;

impl Packet for FinishConfigurationPacket {
    fn kind(&self) -> PacketKind {
        PacketKind::FinishConfiguration
    }

    fn write_to_buffer(&self, _buffer: &mut MinecraftPacketBuffer) -> io::Result<()> {
        Ok(())
    }
}

/// The client's last configuration packet; play starts after it.
pub struct AcknowledgeFinishConfigurationPacket;

impl ServerboundPacket for AcknowledgeFinishConfigurationPacket {
    const PACKET_ID: i32 = 0x03;

    fn read_from_buffer(_buffer: &mut MinecraftPacketBuffer) -> io::Result<Self> {
        Ok(AcknowledgeFinishConfigurationPacket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::environment::Environment;

    #[test]
    fn test_known_packs_layout() {
        let mut buffer = MinecraftPacketBuffer::new();
        ClientboundKnownPacksPacket::vanilla()
            .write_to_buffer(&mut buffer)
            .unwrap();

        let mut read = MinecraftPacketBuffer::from_bytes(buffer.into_inner());
        assert_eq!(read.read_varint().unwrap(), 1);
        assert_eq!(read.read_string().unwrap(), "minecraft");
        assert_eq!(read.read_string().unwrap(), "core");
        assert_eq!(read.read_string().unwrap(), "1.20.6");
        assert_eq!(read.remaining(), 0);
    }

    #[test]
    fn test_read_client_known_packs() {
        let mut buffer = MinecraftPacketBuffer::new();
        buffer.write_varint(1);
        KnownPack::vanilla().write(&mut buffer);
        let mut read = MinecraftPacketBuffer::from_bytes(buffer.into_inner());
        let packet = ServerboundKnownPacksPacket::read_from_buffer(&mut read).unwrap();
        assert_eq!(packet.packs, vec![KnownPack::vanilla()]);
    }

    #[test]
    fn test_registry_entries_are_sent_without_data() {
        let packet = RegistryDataPacket {
            registry: "minecraft:wolf_variant".to_string(),
            entries: vec!["minecraft:ashen".to_string(), "minecraft:pale".to_string()],
        };
        let mut buffer = MinecraftPacketBuffer::new();
        packet.write_to_buffer(&mut buffer).unwrap();

        let mut read = MinecraftPacketBuffer::from_bytes(buffer.into_inner());
        assert_eq!(read.read_string().unwrap(), "minecraft:wolf_variant");
        assert_eq!(read.read_varint().unwrap(), 2);
        assert_eq!(read.read_string().unwrap(), "minecraft:ashen");
        assert!(!read.read_bool().unwrap());
        assert_eq!(read.read_string().unwrap(), "minecraft:pale");
        assert!(!read.read_bool().unwrap());
        assert_eq!(read.remaining(), 0);
    }

    #[test]
    fn test_bundled_registries_match_dimension_indices() {
        let registries = RegistryDataPacket::bundled().unwrap();
        let dimensions = registries
            .iter()
            .find(|registry| registry.registry == "minecraft:dimension_type")
            .unwrap();
        for environment in [Environment::Normal, Environment::Nether, Environment::End] {
            let index = environment.dimension_type_index() as usize;
            assert_eq!(dimensions.entries[index], environment.key());
        }
    }

    #[test]
    fn test_bundled_registries_cover_join_requirements() {
        let registries = RegistryDataPacket::bundled().unwrap();
        for required in [
            "minecraft:worldgen/biome",
            "minecraft:chat_type",
            "minecraft:damage_type",
            "minecraft:wolf_variant",
        ] {
            let registry = registries.iter().find(|registry| registry.registry == required);
            assert!(registry.is_some_and(|registry| !registry.entries.is_empty()), "{} missing", required);
        }
    }
}
