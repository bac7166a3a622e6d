pub mod chunk;
pub mod entity;
pub mod environment;
pub mod palette;

use crate::world::chunk::{Chunk, LightSections, LightStore, WorldId};
use crate::world::entity::EntitySnapshot;
use crate::world::environment::Environment;
use std::collections::HashMap;
use std::sync::Arc;

/// One world: generated chunks, light, and the entities living in it.
///
/// The world is the only owner of chunk and entity data; players and
/// connections refer to it through its `WorldId`.
#[derive(Debug)]
pub struct World {
    id: WorldId,
    name: String,
    environment: Environment,
    chunks: HashMap<(i32, i32), Arc<Chunk>>,
    block_light: LightStore,
    sky_light: LightStore,
    entities: Vec<EntitySnapshot>,
    empty_chunk: Arc<Chunk>,
}

impl World {
    pub fn new(id: WorldId, name: &str, environment: Environment) -> Self {
        Self {
            id,
            name: name.to_string(),
            environment,
            chunks: HashMap::new(),
            block_light: LightStore::default(),
            sky_light: LightStore::default(),
            entities: Vec::new(),
            empty_chunk: Arc::new(Chunk::empty(environment)),
        }
    }

    pub fn id(&self) -> WorldId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub fn has_sky_light(&self) -> bool {
        self.environment.has_sky_light()
    }

    /// Generated data at (x, z), or `None` when nothing was generated there.
    pub fn chunk_at(&self, x: i32, z: i32) -> Option<Arc<Chunk>> {
        self.chunks.get(&(x, z)).cloned()
    }

    pub fn set_chunk(&mut self, x: i32, z: i32, chunk: Chunk) {
        self.chunks.insert((x, z), Arc::new(chunk));
    }

    /// The all-air column sent for positions without generated data.
    pub fn empty_chunk(&self) -> Arc<Chunk> {
        Arc::clone(&self.empty_chunk)
    }

    pub fn block_light_at(&self, x: i32, z: i32) -> Option<&LightSections> {
        self.block_light.get(x, z)
    }

    pub fn sky_light_at(&self, x: i32, z: i32) -> Option<&LightSections> {
        self.sky_light.get(x, z)
    }

    pub fn set_block_light(&mut self, x: i32, z: i32, sections: LightSections) {
        self.block_light.set(x, z, sections);
    }

    pub fn set_sky_light(&mut self, x: i32, z: i32, sections: LightSections) {
        self.sky_light.set(x, z, sections);
    }

    pub fn entities(&self) -> &[EntitySnapshot] {
        &self.entities
    }

    /// Adds an entity, replacing any entity with the same ID.
    pub fn add_entity(&mut self, entity: EntitySnapshot) {
        self.remove_entity(entity.entity_id);
        self.entities.push(entity);
    }

    pub fn remove_entity(&mut self, entity_id: i32) -> Option<EntitySnapshot> {
        let index = self
            .entities
            .iter()
            .position(|entity| entity.entity_id == entity_id)?;
        Some(self.entities.remove(index))
    }

    pub fn entity_mut(&mut self, entity_id: i32) -> Option<&mut EntitySnapshot> {
        self.entities
            .iter_mut()
            .find(|entity| entity.entity_id == entity_id)
    }
}

/// Owns every loaded world.
#[derive(Debug, Default)]
pub struct WorldRegistry {
    worlds: Vec<World>,
}

impl WorldRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_world(&mut self, name: &str, environment: Environment) -> WorldId {
        let id = WorldId(self.worlds.len() as u16);
        self.worlds.push(World::new(id, name, environment));
        id
    }

    pub fn get(&self, id: WorldId) -> Option<&World> {
        self.worlds.get(id.0 as usize)
    }

    pub fn get_mut(&mut self, id: WorldId) -> Option<&mut World> {
        self.worlds.get_mut(id.0 as usize)
    }

    pub fn by_name(&self, name: &str) -> Option<&World> {
        self.worlds.iter().find(|world| world.name() == name)
    }

    pub fn worlds(&self) -> &[World] {
        &self.worlds
    }
}
