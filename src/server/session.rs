use crate::logger::{log, LogSeverity};
use crate::player::view::PlayerViewManager;
use crate::player::Player;
use crate::protocol::keep_alive::KeepAlivePacket;
use crate::server::connection::{ClientConnection, ConnectionHandle};
use crate::world::WorldRegistry;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Notify;
use tokio::time::{Duration, Instant};

pub const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(10);
pub const KEEP_ALIVE_TIMEOUT: Duration = Duration::from_secs(30);

/// A player in the play state together with its send path.
#[derive(Debug)]
pub struct PlayerSession {
    pub player: Player,
    pub connection: ConnectionHandle,
    /// Wakes the connection's reader when the session is dropped from here.
    pub kick: Arc<Notify>,
    pub last_keep_alive_id: i64,
    pub last_keep_alive_sent: Instant,
    pub last_keep_alive_response: Instant,
}

impl PlayerSession {
    pub fn new(player: Player, connection: ConnectionHandle) -> Self {
        let now = Instant::now();
        Self {
            player,
            connection,
            kick: Arc::new(Notify::new()),
            last_keep_alive_id: 0,
            last_keep_alive_sent: now,
            last_keep_alive_response: now,
        }
    }

    pub fn has_timed_out(&self, now: Instant) -> bool {
        now.duration_since(self.last_keep_alive_response) > KEEP_ALIVE_TIMEOUT
    }

    pub fn keep_alive_due(&self, now: Instant) -> bool {
        now.duration_since(self.last_keep_alive_sent) >= KEEP_ALIVE_INTERVAL
    }

    /// Accepts the client's echo if it matches the last ID sent.
    pub fn record_keep_alive(&mut self, keep_alive_id: i64, now: Instant) -> bool {
        if keep_alive_id != self.last_keep_alive_id {
            return false;
        }
        self.last_keep_alive_response = now;
        true
    }
}

/// All joined players, keyed by username.
#[derive(Debug, Default)]
pub struct SessionManager {
    sessions: BTreeMap<String, PlayerSession>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a session. A session already holding the name is kicked and
    /// returned.
    pub fn add_session(&mut self, session: PlayerSession) -> Option<PlayerSession> {
        let replaced = self.sessions.insert(session.player.username.clone(), session)?;
        replaced.kick.notify_one();
        Some(replaced)
    }

    pub fn remove_session(&mut self, username: &str) -> Option<PlayerSession> {
        let session = self.sessions.remove(username)?;
        session.kick.notify_one();
        Some(session)
    }

    /// Removes the session under `username` only if it belongs to
    /// `entity_id`, so a replaced connection cannot drop its successor.
    pub fn remove_own_session(&mut self, username: &str, entity_id: i32) -> Option<PlayerSession> {
        self.own_session(username, entity_id)?;
        self.remove_session(username)
    }

    pub fn get_session(&mut self, username: &str) -> Option<&mut PlayerSession> {
        self.sessions.get_mut(username)
    }

    /// The session under `username`, if it belongs to `entity_id`.
    pub fn own_session(&mut self, username: &str, entity_id: i32) -> Option<&mut PlayerSession> {
        self.sessions
            .get_mut(username)
            .filter(|session| session.player.entity_id == entity_id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn get_player_names(&self) -> Vec<String> {
        self.sessions.keys().cloned().collect()
    }

    /// Runs one view update per session. A session whose update fails is
    /// removed; the others are not affected.
    pub fn tick(&mut self, view: &PlayerViewManager, worlds: &WorldRegistry) {
        let mut failed = Vec::new();
        for (username, session) in self.sessions.iter_mut() {
            if let Err(err) = view.update(&mut session.player, worlds, &session.connection) {
                log(
                    format!("Dropping {} after failed view update: {}", username, err),
                    LogSeverity::Warning,
                );
                failed.push(username.clone());
            }
        }
        for username in failed {
            self.remove_session(&username);
        }
    }

    /// Sends due keep alives and drops sessions that stopped answering.
    /// Returns the names of removed players.
    pub fn check_keep_alives(&mut self, now: Instant, keep_alive_id: i64) -> Vec<String> {
        let mut to_remove = Vec::new();
        for (username, session) in self.sessions.iter_mut() {
            if session.has_timed_out(now) {
                to_remove.push(username.clone());
                continue;
            }
            if session.keep_alive_due(now) {
                session.last_keep_alive_id = keep_alive_id;
                session.last_keep_alive_sent = now;
                if session
                    .connection
                    .send_packet(KeepAlivePacket::new(keep_alive_id).into())
                    .is_err()
                {
                    to_remove.push(username.clone());
                }
            }
        }
        for username in &to_remove {
            self.remove_session(username);
        }
        to_remove
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::registry::PacketRegistry;
    use crate::server::connection::ConnectionState;
    use tokio::sync::mpsc;
    use uuid::Uuid;

    fn session(name: &str) -> (PlayerSession, mpsc::UnboundedReceiver<Vec<u8>>) {
        session_with_id(name, 1)
    }

    fn session_with_id(name: &str, entity_id: i32) -> (PlayerSession, mpsc::UnboundedReceiver<Vec<u8>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let connection = ConnectionHandle::new(tx, Arc::new(PacketRegistry::protocol_766()));
        connection.set_state(ConnectionState::Play);
        (PlayerSession::new(Player::new(entity_id, Uuid::nil(), name), connection), rx)
    }

    fn was_kicked(kick: &Notify) -> bool {
        futures::FutureExt::now_or_never(kick.notified()).is_some()
    }

    #[test]
    fn test_keep_alive_sent_when_due() {
        let (session, mut rx) = session("Steve");
        let start = session.last_keep_alive_sent;
        let mut manager = SessionManager::new();
        manager.add_session(session);

        assert!(manager.check_keep_alives(start, 7).is_empty());
        assert!(rx.try_recv().is_err());

        let later = start + KEEP_ALIVE_INTERVAL;
        assert!(manager.check_keep_alives(later, 7).is_empty());
        assert_eq!(rx.try_recv().unwrap()[0], 0x26);

        let session = manager.get_session("Steve").unwrap();
        assert!(!session.record_keep_alive(6, later));
        assert!(session.record_keep_alive(7, later));
    }

    #[test]
    fn test_silent_session_times_out() {
        let (session, _rx) = session("Alex");
        let start = session.last_keep_alive_response;
        let kick = Arc::clone(&session.kick);
        let mut manager = SessionManager::new();
        manager.add_session(session);

        let removed = manager.check_keep_alives(start + KEEP_ALIVE_TIMEOUT + Duration::from_secs(1), 1);
        assert_eq!(removed, vec!["Alex".to_string()]);
        assert!(manager.is_empty());
        // The stored permit wakes the reader immediately.
        assert!(was_kicked(&kick));
    }

    #[test]
    fn test_second_login_kicks_first_session() {
        let (first, _first_rx) = session_with_id("Steve", 1);
        let (second, _second_rx) = session_with_id("Steve", 2);
        let first_kick = Arc::clone(&first.kick);
        let second_kick = Arc::clone(&second.kick);
        let mut manager = SessionManager::new();

        assert!(manager.add_session(first).is_none());
        let replaced = manager.add_session(second).unwrap();
        assert_eq!(replaced.player.entity_id, 1);
        assert_eq!(manager.len(), 1);
        assert!(was_kicked(&first_kick));

        // The first connection's cleanup must leave the live session alone.
        assert!(manager.remove_own_session("Steve", 1).is_none());
        assert!(manager.own_session("Steve", 1).is_none());
        assert_eq!(manager.own_session("Steve", 2).unwrap().player.entity_id, 2);
        assert!(!was_kicked(&second_kick));

        assert_eq!(manager.remove_own_session("Steve", 2).unwrap().player.entity_id, 2);
        assert!(manager.is_empty());
    }

    #[test]
    fn test_failed_update_removes_only_that_session() {
        let (healthy, _healthy_rx) = session("Healthy");
        let (broken, broken_rx) = session("Broken");
        drop(broken_rx);

        let mut worlds = WorldRegistry::new();
        let world = worlds.create_world("limbo", crate::world::environment::Environment::End);
        let spawn = crate::world::entity::Location::new(world, 0.0, 64.0, 0.0);
        healthy.player.set_location(Some(spawn));
        broken.player.set_location(Some(spawn));

        let mut manager = SessionManager::new();
        manager.add_session(healthy);
        manager.add_session(broken);
        crate::world::palette::load_bundled_global_palette().unwrap();
        manager.tick(&PlayerViewManager::new(2), &worlds);
        assert_eq!(manager.get_player_names(), vec!["Healthy".to_string()]);
    }
}
