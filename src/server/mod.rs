pub mod connection;
pub mod session;

use crate::config::ServerProperties;
use crate::error::{LimboError, Result};
use crate::logger::time::unix_timestamp;
use crate::logger::LogSeverity::{Debug, Error, Info, Warning};
use crate::logger::log;
use crate::player::view::PlayerViewManager;
use crate::player::{change_world, Player, SharedLocation};
use crate::protocol::boss_event::{BossBar, BossBarAction, BossEventPacket};
use crate::protocol::center_chunk::SetCenterChunkPacket;
use crate::protocol::configuration::{
    AcknowledgeFinishConfigurationPacket, ClientboundKnownPacksPacket, FinishConfigurationPacket,
    KnownPack, RegistryDataPacket, ServerboundKnownPacksPacket,
};
use crate::protocol::frame::{FrameCodec, RawPacket};
use crate::protocol::game_event::{GameEvent, GameEventPacket};
use crate::protocol::handshake::{HandshakePacket, NextState};
use crate::protocol::join_game::JoinGamePacket;
use crate::protocol::keep_alive::KeepAliveResponsePacket;
use crate::protocol::login::{
    offline_uuid, LoginAcknowledgedPacket, LoginDisconnectPacket, LoginStartPacket,
    LoginSuccessPacket,
};
use crate::protocol::packet::ServerboundPacket;
use crate::protocol::player_movement::{
    SetPlayerPositionAndRotationPacket, SetPlayerPositionPacket, SynchronizePlayerPositionPacket,
};
use crate::protocol::registry::{PacketRegistry, GAME_VERSION, PROTOCOL_VERSION};
use crate::protocol::respawn::GameMode;
use crate::protocol::status::{
    PingRequestPacket, PongResponsePacket, ServerStatus, StatusDescription, StatusPlayers,
    StatusRequestPacket, StatusResponsePacket, StatusVersion,
};
use crate::protocol::tab_complete::{suggest, CommandSuggestionRequestPacket};
use crate::world::chunk::WorldId;
use crate::world::entity::Location;
use crate::world::WorldRegistry;
use connection::{ClientConnection, ConnectionHandle, ConnectionState};
use futures::{SinkExt, StreamExt};
use session::{PlayerSession, SessionManager};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;
use tokio::net::tcp::OwnedReadHalf;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, Notify, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, Instant, MissedTickBehavior};
use tokio_util::codec::{FramedRead, FramedWrite};

/// 20 ticks per second.
pub const TICK_INTERVAL: Duration = Duration::from_millis(50);

type Frames = FramedRead<OwnedReadHalf, FrameCodec>;

/// Shared server state. Worlds own all chunk and entity data; sessions refer
/// to them by `WorldId`.
#[derive(Debug)]
pub struct Server {
    properties: ServerProperties,
    registry: Arc<PacketRegistry>,
    /// Sent to every client during configuration.
    synced_registries: Vec<RegistryDataPacket>,
    worlds: RwLock<WorldRegistry>,
    spawn_world: WorldId,
    sessions: RwLock<SessionManager>,
    view: PlayerViewManager,
    boss_bar: Option<BossBar>,
    next_entity_id: AtomicI32,
    online: AtomicI32,
}

impl Server {
    /// Builds the server and its spawn world. Fails if the registry is
    /// missing a packet ID or the bundled registry data is malformed.
    pub fn new(properties: ServerProperties, registry: PacketRegistry) -> Result<Self> {
        registry.validate()?;
        let synced_registries = RegistryDataPacket::bundled()?;
        let mut worlds = WorldRegistry::new();
        let spawn_world = worlds.create_world(&properties.world_name, properties.environment);
        Ok(Self {
            registry: Arc::new(registry),
            synced_registries,
            worlds: RwLock::new(worlds),
            spawn_world,
            sessions: RwLock::new(SessionManager::new()),
            view: PlayerViewManager::new(properties.view_distance),
            boss_bar: properties.boss_bar.as_ref().map(|bar| bar.to_boss_bar()),
            next_entity_id: AtomicI32::new(1),
            online: AtomicI32::new(0),
            properties,
        })
    }

    pub fn properties(&self) -> &ServerProperties {
        &self.properties
    }

    pub fn worlds(&self) -> &RwLock<WorldRegistry> {
        &self.worlds
    }

    pub fn online_players(&self) -> i32 {
        self.online.load(Ordering::Acquire)
    }

    pub fn spawn_location(&self) -> Location {
        let spawn = &self.properties.spawn;
        Location::new(self.spawn_world, spawn.x, spawn.y, spawn.z).with_rotation(spawn.yaw, spawn.pitch)
    }

    /// Runs one view update for every joined player.
    pub async fn tick(&self) {
        let worlds = self.worlds.read().await;
        let mut sessions = self.sessions.write().await;
        sessions.tick(&self.view, &worlds);
    }

    /// Moves a joined player, sending a respawn when the world changes.
    /// Returns false when nobody by that name is online.
    pub async fn move_player(&self, username: &str, destination: Location) -> Result<bool> {
        let worlds = self.worlds.read().await;
        let mut sessions = self.sessions.write().await;
        let Some(session) = sessions.get_session(username) else {
            return Ok(false);
        };
        change_world(&session.player, &worlds, &session.connection, destination)?;
        Ok(true)
    }

    async fn join_game(&self, entity_id: i32, game_mode: GameMode) -> JoinGamePacket {
        let world_names = self
            .worlds
            .read()
            .await
            .worlds()
            .iter()
            .map(|world| world.name().to_string())
            .collect();
        JoinGamePacket::new(
            entity_id,
            self.properties.environment,
            &self.properties.world_name,
            game_mode,
        )
        .with_world_names(world_names)
        .with_limits(self.properties.max_players, self.properties.view_distance)
    }

    fn status(&self) -> ServerStatus {
        ServerStatus {
            version: StatusVersion {
                name: GAME_VERSION.to_string(),
                protocol: PROTOCOL_VERSION,
            },
            players: StatusPlayers {
                max: self.properties.max_players,
                online: self.online_players(),
            },
            description: StatusDescription {
                text: self.properties.motd.clone(),
            },
        }
    }

    /// Reserves a player slot, failing when the server is full.
    fn try_join(&self) -> bool {
        let max = self.properties.max_players;
        self.online
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |online| {
                (online < max).then_some(online + 1)
            })
            .is_ok()
    }

    fn leave(&self) {
        self.online.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Binds the configured address and serves until the listener fails.
pub async fn run(server: Arc<Server>) -> Result<()> {
    let address = server.properties().bind_address();
    let listener = TcpListener::bind(&address).await?;
    log(format!("Listening on {}", address), Info);
    serve(listener, server).await
}

/// Accepts connections on `listener` and starts the tick and keep alive
/// drivers.
pub async fn serve(listener: TcpListener, server: Arc<Server>) -> Result<()> {
    spawn_tick_driver(Arc::clone(&server));
    spawn_keep_alive_checker(Arc::clone(&server));

    loop {
        let (socket, addr) = listener.accept().await?;
        log(format!("New connection from: {}", addr), Debug);
        tokio::spawn(handle_connection(Arc::clone(&server), socket, addr));
    }
}

pub fn spawn_tick_driver(server: Arc<Server>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(TICK_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            server.tick().await;
        }
    })
}

fn spawn_keep_alive_checker(server: Arc<Server>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(Duration::from_secs(1));
        loop {
            ticker.tick().await;
            let mut sessions = server.sessions.write().await;
            for username in sessions.check_keep_alives(Instant::now(), unix_timestamp()) {
                log(format!("Player {} timed out", username), Info);
            }
        }
    })
}

async fn handle_connection(server: Arc<Server>, socket: TcpStream, addr: SocketAddr) {
    let (reader, writer) = socket.into_split();
    let mut frames = FramedRead::new(reader, FrameCodec);
    let (outbound, mut queued) = mpsc::unbounded_channel::<Vec<u8>>();
    let connection = ConnectionHandle::new(outbound, Arc::clone(&server.registry));

    let writer_task = tokio::spawn(async move {
        let mut sink = FramedWrite::new(writer, FrameCodec);
        while let Some(packet) = queued.recv().await {
            if let Err(err) = sink.send(packet).await {
                log(format!("Failed to write to {}: {}", addr, err), Debug);
                break;
            }
        }
    });

    if let Err(err) = serve_connection(&server, &mut frames, &connection).await {
        log(format!("Connection {} closed: {}", addr, err), Warning);
    }
    drop(connection);
    if let Err(err) = writer_task.await {
        log(format!("Writer for {} failed: {}", addr, err), Error);
    }
}

async fn next_frame(frames: &mut Frames) -> Result<RawPacket> {
    match frames.next().await {
        Some(frame) => Ok(frame?),
        None => Err(LimboError::ConnectionClosed),
    }
}

/// Reads frames until one with `packet_id` arrives, logging the skipped ones.
async fn skip_until(frames: &mut Frames, packet_id: i32, phase: &str) -> Result<RawPacket> {
    loop {
        let frame = next_frame(frames).await?;
        if frame.id == packet_id {
            return Ok(frame);
        }
        log(format!("Ignoring {} packet 0x{:02x}", phase, frame.id), Debug);
    }
}

fn read_packet<P: ServerboundPacket>(frame: RawPacket) -> Result<P> {
    if frame.id != P::PACKET_ID {
        return Err(LimboError::ProtocolError(format!(
            "Expected packet 0x{:02x}, got 0x{:02x}",
            P::PACKET_ID,
            frame.id
        )));
    }
    Ok(P::read_from_buffer(&mut frame.into_buffer())?)
}

async fn serve_connection(
    server: &Arc<Server>,
    frames: &mut Frames,
    connection: &ConnectionHandle,
) -> Result<()> {
    let handshake: HandshakePacket = read_packet(next_frame(frames).await?)?;
    log(format!("Received handshake: {:?}", handshake), Debug);

    match handshake.next_state() {
        Some(NextState::Status) => {
            connection.set_state(ConnectionState::Status);
            handle_status(server, frames, connection).await
        }
        Some(NextState::Login) => {
            connection.set_state(ConnectionState::Login);
            handle_login(server, frames, connection).await
        }
        Some(NextState::Transfer) | None => Err(LimboError::ProtocolError(format!(
            "Unsupported next state {}",
            handshake.next_state
        ))),
    }
}

async fn handle_status(
    server: &Arc<Server>,
    frames: &mut Frames,
    connection: &ConnectionHandle,
) -> Result<()> {
    loop {
        let frame = next_frame(frames).await?;
        match frame.id {
            StatusRequestPacket::PACKET_ID => {
                let response = StatusResponsePacket::new(&server.status())?;
                connection.send_packet(response.into())?;
            }
            PingRequestPacket::PACKET_ID => {
                let ping: PingRequestPacket = read_packet(frame)?;
                connection.send_packet(PongResponsePacket { payload: ping.payload }.into())?;
                return Ok(());
            }
            other => {
                return Err(LimboError::ProtocolError(format!(
                    "Unexpected status packet 0x{:02x}",
                    other
                )))
            }
        }
    }
}

async fn handle_login(
    server: &Arc<Server>,
    frames: &mut Frames,
    connection: &ConnectionHandle,
) -> Result<()> {
    let login_start: LoginStartPacket = read_packet(next_frame(frames).await?)?;
    let username = login_start.username;
    log(format!("Player {} attempting to login", username), Debug);

    if !server.try_join() {
        connection.send_packet(LoginDisconnectPacket::new("The server is full!").into())?;
        return Ok(());
    }

    let result = login_and_play(server, frames, connection, &username).await;
    server.leave();
    log(format!("Player {} disconnected", username), Info);
    result
}

async fn login_and_play(
    server: &Arc<Server>,
    frames: &mut Frames,
    connection: &ConnectionHandle,
    username: &str,
) -> Result<()> {
    let uuid = offline_uuid(username);
    connection.send_packet(LoginSuccessPacket::new(uuid, username.to_string()).into())?;
    skip_until(frames, LoginAcknowledgedPacket::PACKET_ID, "login").await?;

    connection.set_state(ConnectionState::Configuration);
    configure(server, frames, connection).await?;
    connection.set_state(ConnectionState::Play);

    let entity_id = server.next_entity_id.fetch_add(1, Ordering::Relaxed);
    let game_mode = server.properties.game_mode;
    let spawn = server.spawn_location();
    connection.send_packet(server.join_game(entity_id, game_mode).await.into())?;
    if let Some(bar) = &server.boss_bar {
        connection.send_packet(BossEventPacket::new(BossBarAction::Add, bar.clone()).into())?;
    }
    connection.send_packet(SynchronizePlayerPositionPacket::absolute(&spawn, 0).into())?;
    connection.send_packet(GameEventPacket::new(GameEvent::StartWaitingForChunks).into())?;
    connection.send_packet(SetCenterChunkPacket::new(spawn.chunk_x(), spawn.chunk_z()).into())?;

    let mut player = Player::new(entity_id, uuid, username);
    player.game_mode = game_mode;
    player.set_location(Some(spawn));
    let location = player.shared_location();

    let session = PlayerSession::new(player, connection.clone());
    let kick = Arc::clone(&session.kick);
    if server.sessions.write().await.add_session(session).is_some() {
        log(format!("Player {} logged in again, closing the older connection", username), Info);
    }
    log(format!("Player {} joined", username), Info);

    let result = play_loop(server, frames, connection, username, entity_id, &location, &kick).await;
    server
        .sessions
        .write()
        .await
        .remove_own_session(username, entity_id);
    result
}

/// Agrees on the vanilla data pack, sends the synced registries and waits
/// for the client to finish configuring.
async fn configure(
    server: &Arc<Server>,
    frames: &mut Frames,
    connection: &ConnectionHandle,
) -> Result<()> {
    connection.send_packet(ClientboundKnownPacksPacket::vanilla().into())?;
    let frame = skip_until(frames, ServerboundKnownPacksPacket::PACKET_ID, "configuration").await?;
    let known: ServerboundKnownPacksPacket = read_packet(frame)?;
    if !known.packs.contains(&KnownPack::vanilla()) {
        log(
            format!("Client does not share the {} data pack", GAME_VERSION),
            Warning,
        );
    }

    for registry in &server.synced_registries {
        connection.send_packet(registry.clone().into())?;
    }
    connection.send_packet(FinishConfigurationPacket.into())?;
    skip_until(frames, AcknowledgeFinishConfigurationPacket::PACKET_ID, "configuration").await?;
    Ok(())
}

async fn play_loop(
    server: &Arc<Server>,
    frames: &mut Frames,
    connection: &ConnectionHandle,
    username: &str,
    entity_id: i32,
    location: &SharedLocation,
    kick: &Notify,
) -> Result<()> {
    loop {
        let frame = tokio::select! {
            _ = kick.notified() => return Ok(()),
            frame = frames.next() => match frame {
                Some(frame) => frame?,
                None => return Ok(()),
            },
        };

        match frame.id {
            KeepAliveResponsePacket::PACKET_ID => {
                let response: KeepAliveResponsePacket = read_packet(frame)?;
                let mut sessions = server.sessions.write().await;
                if let Some(session) = sessions.own_session(username, entity_id) {
                    session.record_keep_alive(response.keep_alive_id, Instant::now());
                }
            }
            SetPlayerPositionPacket::PACKET_ID => {
                let position: SetPlayerPositionPacket = read_packet(frame)?;
                let moved = update_location(location, |current| {
                    current.x = position.x;
                    current.y = position.y;
                    current.z = position.z;
                });
                recenter(connection, moved)?;
            }
            SetPlayerPositionAndRotationPacket::PACKET_ID => {
                let position: SetPlayerPositionAndRotationPacket = read_packet(frame)?;
                let moved = update_location(location, |current| {
                    current.x = position.x;
                    current.y = position.y;
                    current.z = position.z;
                    current.yaw = position.yaw;
                    current.pitch = position.pitch;
                });
                recenter(connection, moved)?;
            }
            CommandSuggestionRequestPacket::PACKET_ID => {
                let request: CommandSuggestionRequestPacket = read_packet(frame)?;
                let response = suggest(request.transaction_id, &request.text, &server.properties.commands);
                connection.send_packet(response.into())?;
            }
            other => log(format!("Received unknown packet 0x{:02x}", other), Debug),
        }
    }
}

/// Applies a client position update. Returns the new chunk when the player
/// crossed a chunk border.
fn update_location(
    location: &SharedLocation,
    apply: impl FnOnce(&mut Location),
) -> Option<(i32, i32)> {
    let mut guard = location.lock().ok()?;
    let current = guard.as_mut()?;
    let before = (current.chunk_x(), current.chunk_z());
    apply(current);
    let after = (current.chunk_x(), current.chunk_z());
    (before != after).then_some(after)
}

fn recenter(connection: &ConnectionHandle, moved: Option<(i32, i32)>) -> Result<()> {
    match moved {
        Some((chunk_x, chunk_z)) => {
            connection.send_packet(SetCenterChunkPacket::new(chunk_x, chunk_z).into())
        }
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn shared(x: f64, z: f64) -> SharedLocation {
        Arc::new(Mutex::new(Some(Location::new(WorldId(0), x, 64.0, z))))
    }

    #[test]
    fn test_update_location_reports_chunk_crossing() {
        let location = shared(15.0, 0.0);
        let moved = update_location(&location, |current| current.x = 16.5);
        assert_eq!(moved, Some((1, 0)));
    }

    #[test]
    fn test_update_location_within_chunk() {
        let location = shared(1.0, 1.0);
        let moved = update_location(&location, |current| {
            current.x = 14.0;
            current.yaw = 90.0;
        });
        assert_eq!(moved, None);
        assert_eq!(location.lock().unwrap().unwrap().yaw, 90.0);
    }

    #[test]
    fn test_update_location_without_location() {
        let location: SharedLocation = Arc::new(Mutex::new(None));
        assert_eq!(update_location(&location, |current| current.x = 100.0), None);
    }
}
