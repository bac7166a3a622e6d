use crate::protocol::packet::{MinecraftPacketBuffer, Packet};
use crate::protocol::registry::PacketKind;
use crate::world::chunk::{Chunk, LightSections};
use crate::world::palette::global_palette;
use std::io;
use std::sync::Arc;

/// Full chunk column with its terrain light.
#[derive(Debug, Clone)]
pub struct ChunkDataPacket {
    pub x: i32,
    pub z: i32,
    pub chunk: Arc<Chunk>,
    pub sky_light: LightSections,
    pub block_light: LightSections,
}

impl ChunkDataPacket {
    pub fn new(x: i32, z: i32, chunk: Arc<Chunk>) -> Self {
        Self {
            x,
            z,
            chunk,
            sky_light: Vec::new(),
            block_light: Vec::new(),
        }
    }

    pub fn with_light(mut self, sky_light: LightSections, block_light: LightSections) -> Self {
        self.sky_light = sky_light;
        self.block_light = block_light;
        self
    }
}

/// Builds the (present, empty) masks for a light list. Bit i stands for
/// entry i; trailing zero words are dropped.
fn light_masks(sections: &LightSections) -> (Vec<i64>, Vec<i64>) {
    let words = sections.len().div_ceil(64);
    let mut present = vec![0u64; words];
    let mut empty = vec![0u64; words];
    for (index, section) in sections.iter().enumerate() {
        let bit = 1u64 << (index % 64);
        match section {
            Some(_) => present[index / 64] |= bit,
            None => empty[index / 64] |= bit,
        }
    }
    (trim(present), trim(empty))
}

fn trim(mut words: Vec<u64>) -> Vec<i64> {
    while words.last() == Some(&0) {
        words.pop();
    }
    words.into_iter().map(|word| word as i64).collect()
}

fn write_light_arrays(buffer: &mut MinecraftPacketBuffer, sections: &LightSections) {
    let present: Vec<&Vec<u8>> = sections.iter().flatten().collect();
    buffer.write_varint(present.len() as i32);
    for array in present {
        buffer.write_varint(array.len() as i32);
        buffer.write_bytes_raw(array);
    }
}

impl Packet for ChunkDataPacket {
    fn kind(&self) -> PacketKind {
        PacketKind::LevelChunkWithLight
    }

    fn write_to_buffer(&self, buffer: &mut MinecraftPacketBuffer) -> io::Result<()> {
        let palette = global_palette().map_err(|err| io::Error::other(err.to_string()))?;

        buffer.write_i32(self.x)?;
        buffer.write_i32(self.z)?;
        self.chunk.heightmaps().write_network(buffer)?;

        let mut sections = MinecraftPacketBuffer::new();
        self.chunk.write_sections(&mut sections, palette)?;
        let sections = sections.into_inner();
        buffer.write_varint(sections.len() as i32);
        buffer.write_bytes_raw(&sections);

        // Block entities
        buffer.write_varint(0);

        let (sky_mask, empty_sky_mask) = light_masks(&self.sky_light);
        let (block_mask, empty_block_mask) = light_masks(&self.block_light);
        buffer.write_bitset(&sky_mask)?;
        buffer.write_bitset(&block_mask)?;
        buffer.write_bitset(&empty_sky_mask)?;
        buffer.write_bitset(&empty_block_mask)?;

        write_light_arrays(buffer, &self.sky_light);
        write_light_arrays(buffer, &self.block_light);
        Ok(())
    }
}
