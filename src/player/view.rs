use crate::error::Result;
use crate::player::Player;
use crate::protocol::chunk_batch::{ChunkBatchFinishedPacket, ChunkBatchStartPacket};
use crate::protocol::chunk_data::ChunkDataPacket;
use crate::protocol::entity_metadata::SetEntityDataPacket;
use crate::protocol::remove_entities::RemoveEntitiesPacket;
use crate::protocol::spawn_entity::SpawnEntityPacket;
use crate::protocol::unload_chunk::UnloadChunkPacket;
use crate::server::connection::{ClientConnection, ConnectionState};
use crate::world::chunk::{Chunk, ChunkPosition};
use crate::world::entity::Location;
use crate::world::World;
use crate::world::WorldRegistry;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Blocks per chunk edge.
const CHUNK_EDGE: i32 = 16;

/// What was last sent for a chunk position.
#[derive(Debug, Clone)]
pub enum ChunkView {
    Loaded(Arc<Chunk>),
    /// Nothing generated there; the empty column was sent.
    Empty,
}

/// What one player's client has been told about. Rebuilt every tick and
/// swapped in whole.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    entities: BTreeSet<i32>,
    chunks: BTreeMap<ChunkPosition, ChunkView>,
}

impl ViewState {
    pub fn entities(&self) -> &BTreeSet<i32> {
        &self.entities
    }

    pub fn chunks(&self) -> &BTreeMap<ChunkPosition, ChunkView> {
        &self.chunks
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty() && self.chunks.is_empty()
    }
}

/// Keeps each client's loaded entities and chunks in step with the world.
#[derive(Debug, Clone, Copy)]
pub struct PlayerViewManager {
    view_distance: i32,
}

impl PlayerViewManager {
    pub fn new(view_distance: i32) -> Self {
        Self { view_distance }
    }

    pub fn view_distance(&self) -> i32 {
        self.view_distance
    }

    /// Chunk columns around chunk (x, z): `[x - vd, x + vd)` on both axes.
    pub fn chunk_window(&self, chunk_x: i32, chunk_z: i32) -> impl Iterator<Item = (i32, i32)> {
        let vd = self.view_distance;
        (chunk_x - vd..chunk_x + vd)
            .flat_map(move |x| (chunk_z - vd..chunk_z + vd).map(move |z| (x, z)))
    }

    /// Sends one tick's worth of changes to `connection`, in this order:
    /// spawn and metadata for entities that came into range, one removal
    /// for entities that left, unloads for chunks that left the window, then
    /// the new chunks wrapped in a batch. Does nothing unless the connection
    /// is in the play state.
    ///
    /// A player without a location in a known world loses everything it was
    /// shown. On a send failure the previous view is kept and the error is
    /// returned to the caller.
    pub fn update<C: ClientConnection + ?Sized>(
        &self,
        player: &mut Player,
        worlds: &WorldRegistry,
        connection: &C,
    ) -> Result<()> {
        if connection.state() != ConnectionState::Play {
            return Ok(());
        }

        let located = player
            .location()
            .and_then(|location| worlds.get(location.world).map(|world| (location, world)));
        let Some((location, world)) = located else {
            return self.collapse(player, connection);
        };

        let mut next = ViewState::default();
        self.update_entities(&player.view, &mut next, &location, world, connection)?;
        self.update_chunks(&player.view, &mut next, &location, world, connection)?;
        player.view = next;
        Ok(())
    }

    fn update_entities<C: ClientConnection + ?Sized>(
        &self,
        previous: &ViewState,
        next: &mut ViewState,
        location: &Location,
        world: &World,
        connection: &C,
    ) -> Result<()> {
        let range = (self.view_distance * CHUNK_EDGE) as f64;
        let max_distance_squared = range * range;

        for entity in world.entities() {
            if entity.location.distance_squared(location) >= max_distance_squared {
                continue;
            }
            if next.entities.insert(entity.entity_id) && !previous.entities.contains(&entity.entity_id) {
                connection.send_packet(SpawnEntityPacket::from_entity(entity).into())?;
                connection.send_packet(SetEntityDataPacket::from_entity(entity).into())?;
            }
        }

        let departed: Vec<i32> = previous.entities.difference(&next.entities).copied().collect();
        if !departed.is_empty() {
            connection.send_packet(RemoveEntitiesPacket::new(departed).into())?;
        }
        Ok(())
    }

    fn update_chunks<C: ClientConnection + ?Sized>(
        &self,
        previous: &ViewState,
        next: &mut ViewState,
        location: &Location,
        world: &World,
        connection: &C,
    ) -> Result<()> {
        for (x, z) in self.chunk_window(location.chunk_x(), location.chunk_z()) {
            let view = match world.chunk_at(x, z) {
                Some(chunk) => ChunkView::Loaded(chunk),
                None => ChunkView::Empty,
            };
            next.chunks.insert(ChunkPosition::new(world.id(), x, z), view);
        }

        for position in previous.chunks.keys() {
            if !next.chunks.contains_key(position) {
                connection.send_packet(UnloadChunkPacket { x: position.x, z: position.z }.into())?;
            }
        }

        connection.send_packet(ChunkBatchStartPacket.into())?;
        let mut batch_size = 0;
        for (position, view) in &next.chunks {
            if previous.chunks.contains_key(position) {
                continue;
            }
            connection.send_packet(chunk_packet(world, position, view).into())?;
            batch_size += 1;
        }
        connection.send_packet(ChunkBatchFinishedPacket { batch_size }.into())?;
        Ok(())
    }

    fn collapse<C: ClientConnection + ?Sized>(&self, player: &mut Player, connection: &C) -> Result<()> {
        if !player.view.entities.is_empty() {
            let entity_ids = player.view.entities.iter().copied().collect();
            connection.send_packet(RemoveEntitiesPacket::new(entity_ids).into())?;
        }
        for position in player.view.chunks.keys() {
            connection.send_packet(UnloadChunkPacket { x: position.x, z: position.z }.into())?;
        }
        player.view = ViewState::default();
        Ok(())
    }
}

fn chunk_packet(world: &World, position: &ChunkPosition, view: &ChunkView) -> ChunkDataPacket {
    let (x, z) = (position.x, position.z);
    match view {
        ChunkView::Empty => ChunkDataPacket::new(x, z, world.empty_chunk()),
        ChunkView::Loaded(chunk) => {
            let block_light = world.block_light_at(x, z).cloned().unwrap_or_default();
            let sky_light = if world.has_sky_light() {
                world.sky_light_at(x, z).cloned().unwrap_or_default()
            } else {
                Vec::new()
            };
            ChunkDataPacket::new(x, z, Arc::clone(chunk)).with_light(sky_light, block_light)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_is_half_open() {
        let manager = PlayerViewManager::new(2);
        let window: Vec<(i32, i32)> = manager.chunk_window(0, 0).collect();
        assert_eq!(window.len(), 16);
        assert!(window.contains(&(-2, -2)));
        assert!(window.contains(&(1, 1)));
        assert!(!window.contains(&(2, 0)));
        assert!(!window.contains(&(0, 2)));
    }

    #[test]
    fn test_zero_view_distance_has_no_chunks() {
        assert_eq!(PlayerViewManager::new(0).chunk_window(3, 3).count(), 0);
    }
}
