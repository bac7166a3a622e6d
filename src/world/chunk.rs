use crate::protocol::nbt::Tag;
use crate::protocol::packet::MinecraftPacketBuffer;
use crate::world::environment::Environment;
use crate::world::palette::{BlockState, GlobalPalette, DIRECT_BLOCK_BITS};
use std::collections::{BTreeMap, HashMap};
use std::io;

pub const SECTION_VOLUME: usize = 16 * 16 * 16;
/// Bytes in one light array: one nibble per block of a section.
pub const LIGHT_ARRAY_LEN: usize = SECTION_VOLUME / 2;

/// Light arrays of one chunk column, bottom to top, including the section
/// below and above the world. `None` marks a section without light data.
pub type LightSections = Vec<Option<Vec<u8>>>;

/// Handle to a world owned by the world registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorldId(pub u16);

/// A chunk column address. Ordered by world, then x, then z.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkPosition {
    pub world: WorldId,
    pub x: i32,
    pub z: i32,
}

impl ChunkPosition {
    pub fn new(world: WorldId, x: i32, z: i32) -> Self {
        Self { world, x, z }
    }
}

/// 16x16x16 blocks with a local palette of block states.
#[derive(Debug, Clone)]
pub struct ChunkSection {
    palette: Vec<BlockState>,
    /// Indices into `palette`, y-major then z then x.
    blocks: Vec<u16>,
    biome: i32,
}

impl Default for ChunkSection {
    fn default() -> Self {
        Self::new()
    }
}

impl ChunkSection {
    /// An all-air section.
    pub fn new() -> Self {
        ChunkSection {
            palette: vec![BlockState::air()],
            blocks: vec![0; SECTION_VOLUME],
            biome: 0,
        }
    }

    fn index(x: usize, y: usize, z: usize) -> usize {
        (y * 16 * 16) + (z * 16) + x
    }

    /// Coordinates must be below 16; `Chunk::set_block` checks them.
    pub(crate) fn set_block_state(&mut self, x: usize, y: usize, z: usize, state: BlockState) {
        let palette_index = match self.palette.iter().position(|known| *known == state) {
            Some(index) => index,
            None => {
                if self.palette.len() >= SECTION_VOLUME {
                    self.compact_palette();
                }
                self.palette.push(state);
                self.palette.len() - 1
            }
        };
        self.blocks[Self::index(x, y, z)] = palette_index as u16;
    }

    /// Coordinates must be below 16; `Chunk::block_at` checks them.
    pub(crate) fn get_block_state(&self, x: usize, y: usize, z: usize) -> &BlockState {
        &self.palette[self.blocks[Self::index(x, y, z)] as usize]
    }

    /// Drops palette entries no block refers to. At most `SECTION_VOLUME`
    /// entries survive, so indices always fit in a u16.
    fn compact_palette(&mut self) {
        let mut remap = vec![None; self.palette.len()];
        let mut palette = Vec::new();
        for block in self.blocks.iter_mut() {
            let old = *block as usize;
            let new = *remap[old].get_or_insert_with(|| {
                palette.push(self.palette[old].clone());
                palette.len() - 1
            });
            *block = new as u16;
        }
        self.palette = palette;
    }

    pub fn biome(&self) -> i32 {
        self.biome
    }

    pub fn set_biome(&mut self, biome: i32) {
        self.biome = biome;
    }

    /// Number of non-air blocks.
    pub fn block_count(&self) -> i16 {
        let air: Vec<bool> = self.palette.iter().map(BlockState::is_air).collect();
        self.blocks
            .iter()
            .filter(|&&index| !air[index as usize])
            .count() as i16
    }

    /// Writes the section as the client expects it: block count, block-state
    /// container, biome container.
    pub fn write_to_buffer(
        &self,
        buffer: &mut MinecraftPacketBuffer,
        palette: &GlobalPalette,
    ) -> io::Result<()> {
        buffer.write_i16(self.block_count())?;

        let global_ids: Vec<i32> = self
            .palette
            .iter()
            .map(|state| palette.resolve_state(state))
            .collect();
        let mut distinct: Vec<i32> = Vec::new();
        for id in &global_ids {
            if !distinct.contains(id) {
                distinct.push(*id);
            }
        }

        if distinct.len() == 1 {
            write_single_valued(buffer, distinct[0]);
        } else {
            let bits = bits_for(distinct.len() as u32 - 1).max(4);
            if bits <= 8 {
                // Local palette index -> index into the sent palette.
                let remap: Vec<u32> = global_ids
                    .iter()
                    .map(|id| distinct.iter().position(|known| known == id).unwrap_or(0) as u32)
                    .collect();
                buffer.write_u8(bits as u8);
                buffer.write_varint(distinct.len() as i32);
                for id in &distinct {
                    buffer.write_varint(*id);
                }
                let values: Vec<u32> = self.blocks.iter().map(|&i| remap[i as usize]).collect();
                write_longs(buffer, &pack_entries(&values, bits))?;
            } else {
                buffer.write_u8(DIRECT_BLOCK_BITS as u8);
                let values: Vec<u32> = self
                    .blocks
                    .iter()
                    .map(|&i| global_ids[i as usize] as u32)
                    .collect();
                write_longs(buffer, &pack_entries(&values, DIRECT_BLOCK_BITS))?;
            }
        }

        write_single_valued(buffer, self.biome);
        Ok(())
    }
}

/// A full-height chunk column.
#[derive(Debug, Clone)]
pub struct Chunk {
    min_y: i32,
    sections: Vec<ChunkSection>,
}

impl Chunk {
    /// An all-air column sized for the environment. This is also the
    /// sentinel sent for positions without generated data.
    pub fn empty(environment: Environment) -> Self {
        Chunk {
            min_y: environment.min_y(),
            sections: vec![ChunkSection::new(); environment.section_count()],
        }
    }

    pub fn min_y(&self) -> i32 {
        self.min_y
    }

    pub fn height(&self) -> i32 {
        (self.sections.len() * 16) as i32
    }

    pub fn sections(&self) -> &[ChunkSection] {
        &self.sections
    }

    pub fn section_mut(&mut self, index: usize) -> Option<&mut ChunkSection> {
        self.sections.get_mut(index)
    }

    fn locate(&self, x: usize, y: i32, z: usize) -> Option<(usize, usize)> {
        if x >= 16 || z >= 16 || y < self.min_y || y >= self.min_y + self.height() {
            return None;
        }
        let relative = (y - self.min_y) as usize;
        Some((relative / 16, relative % 16))
    }

    /// Sets a block at column-local x/z and absolute y. Returns false when
    /// the position is outside the column.
    pub fn set_block(&mut self, x: usize, y: i32, z: usize, state: BlockState) -> bool {
        match self.locate(x, y, z) {
            Some((section, local_y)) => {
                self.sections[section].set_block_state(x, local_y, z, state);
                true
            }
            None => false,
        }
    }

    pub fn block_at(&self, x: usize, y: i32, z: usize) -> Option<&BlockState> {
        let (section, local_y) = self.locate(x, y, z)?;
        Some(self.sections[section].get_block_state(x, local_y, z))
    }

    /// Height above the bottom of the world of the highest non-air block
    /// plus one, per column in z-major order. Zero for empty columns.
    pub fn motion_blocking_heights(&self) -> Vec<u32> {
        let mut heights = vec![0u32; 256];
        for z in 0..16 {
            for x in 0..16 {
                'column: for (section_index, section) in self.sections.iter().enumerate().rev() {
                    for local_y in (0..16).rev() {
                        if !section.get_block_state(x, local_y, z).is_air() {
                            heights[z * 16 + x] = (section_index * 16 + local_y + 1) as u32;
                            break 'column;
                        }
                    }
                }
            }
        }
        heights
    }

    pub fn heightmaps(&self) -> Tag {
        let bits = bits_for(self.height() as u32);
        let packed = pack_entries(&self.motion_blocking_heights(), bits);
        let mut compound = BTreeMap::new();
        compound.insert("MOTION_BLOCKING".to_string(), Tag::LongArray(packed));
        Tag::Compound(compound)
    }

    /// Encodes every section, bottom to top.
    pub fn write_sections(
        &self,
        buffer: &mut MinecraftPacketBuffer,
        palette: &GlobalPalette,
    ) -> io::Result<()> {
        for section in &self.sections {
            section.write_to_buffer(buffer, palette)?;
        }
        Ok(())
    }
}

/// Bits needed to store `value`.
fn bits_for(value: u32) -> u32 {
    (32 - value.leading_zeros()).max(1)
}

fn write_single_valued(buffer: &mut MinecraftPacketBuffer, value: i32) {
    buffer.write_u8(0);
    buffer.write_varint(value);
    buffer.write_varint(0);
}

fn write_longs(buffer: &mut MinecraftPacketBuffer, longs: &[i64]) -> io::Result<()> {
    buffer.write_varint(longs.len() as i32);
    for value in longs {
        buffer.write_i64(*value)?;
    }
    Ok(())
}

/// Packs entries into longs, lowest bits first. Entries never straddle two
/// longs; leftover high bits stay zero.
pub fn pack_entries(values: &[u32], bits: u32) -> Vec<i64> {
    let per_long = (64 / bits) as usize;
    let mask = (1u64 << bits) - 1;
    let mut longs = vec![0u64; values.len().div_ceil(per_long)];
    for (i, value) in values.iter().enumerate() {
        let shift = (i % per_long) as u32 * bits;
        longs[i / per_long] |= (*value as u64 & mask) << shift;
    }
    longs.into_iter().map(|word| word as i64).collect()
}

/// Light arrays keyed by chunk column.
#[derive(Debug, Default, Clone)]
pub struct LightStore {
    columns: HashMap<(i32, i32), LightSections>,
}

impl LightStore {
    pub fn get(&self, x: i32, z: i32) -> Option<&LightSections> {
        self.columns.get(&(x, z))
    }

    pub fn set(&mut self, x: i32, z: i32, sections: LightSections) {
        self.columns.insert((x, z), sections);
    }
}
