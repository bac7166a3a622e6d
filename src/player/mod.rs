pub mod view;

use crate::error::Result;
use crate::protocol::respawn::{GameMode, RespawnPacket};
use crate::server::connection::ClientConnection;
use crate::world::entity::Location;
use crate::world::WorldRegistry;
use std::sync::{Arc, Mutex};
use uuid::Uuid;
use view::ViewState;

/// Location shared between a connection's reader, which applies movement
/// packets, and the tick driver, which reads it once per tick.
pub type SharedLocation = Arc<Mutex<Option<Location>>>;

/// A joined player. Worlds are referenced by handle only.
#[derive(Debug)]
pub struct Player {
    pub entity_id: i32,
    pub uuid: Uuid,
    pub username: String,
    pub game_mode: GameMode,
    location: SharedLocation,
    pub(crate) view: ViewState,
}

impl Player {
    pub fn new(entity_id: i32, uuid: Uuid, username: &str) -> Self {
        Self {
            entity_id,
            uuid,
            username: username.to_string(),
            game_mode: GameMode::default(),
            location: Arc::new(Mutex::new(None)),
            view: ViewState::default(),
        }
    }

    /// Handle for updating this player's location from another task.
    pub fn shared_location(&self) -> SharedLocation {
        Arc::clone(&self.location)
    }

    pub fn location(&self) -> Option<Location> {
        self.location.lock().ok().and_then(|location| *location)
    }

    pub fn set_location(&self, location: Option<Location>) {
        if let Ok(mut current) = self.location.lock() {
            *current = location;
        }
    }

    /// What this player's client currently has loaded.
    pub fn view(&self) -> &ViewState {
        &self.view
    }
}

/// Moves a player to `destination`. Crossing into another world sends a
/// respawn first; the next view update then streams the new surroundings.
pub fn change_world<C: ClientConnection + ?Sized>(
    player: &Player,
    worlds: &WorldRegistry,
    connection: &C,
    destination: Location,
) -> Result<()> {
    let crossing = player
        .location()
        .map_or(true, |current| current.world != destination.world);
    if crossing {
        if let Some(world) = worlds.get(destination.world) {
            connection.send_packet(
                RespawnPacket::new(world.environment(), world.name(), player.game_mode).into(),
            )?;
        }
    }
    player.set_location(Some(destination));
    Ok(())
}
