use crate::error::{LimboError, Result};
use crate::logger::{log, LogSeverity};
use crate::protocol::boss_event::{BossBar, BossBarColor, BossBarFlags, BossBarOverlay};
use crate::protocol::component::Component;
use crate::protocol::respawn::GameMode;
use crate::world::environment::Environment;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub const DEFAULT_CONFIG_PATH: &str = "server.json";

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct SpawnPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub yaw: f32,
    pub pitch: f32,
}

impl Default for SpawnPoint {
    fn default() -> Self {
        Self {
            x: 0.5,
            y: 100.0,
            z: 0.5,
            yaw: 0.0,
            pitch: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BossBarConfig {
    pub text: String,
    pub progress: f32,
    pub color: BossBarColor,
    pub overlay: BossBarOverlay,
    #[serde(flatten)]
    pub flags: BossBarFlags,
}

impl Default for BossBarConfig {
    fn default() -> Self {
        Self {
            text: "Limbo".to_string(),
            progress: 1.0,
            color: BossBarColor::default(),
            overlay: BossBarOverlay::default(),
            flags: BossBarFlags::default(),
        }
    }
}

impl BossBarConfig {
    /// The configured bar. Its UUID is derived from the text so every
    /// session shows the same bar.
    pub fn to_boss_bar(&self) -> BossBar {
        BossBar {
            uuid: Uuid::new_v3(&Uuid::NAMESPACE_OID, self.text.as_bytes()),
            name: Component::text(&self.text),
            progress: self.progress.clamp(0.0, 1.0),
            color: self.color,
            overlay: self.overlay,
            flags: self.flags,
        }
    }
}

/// Server settings, read from a JSON file. Every key is optional.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerProperties {
    pub server_ip: String,
    pub server_port: u16,
    pub max_players: i32,
    pub view_distance: i32,
    pub motd: String,
    pub world_name: String,
    pub environment: Environment,
    pub game_mode: GameMode,
    pub spawn: SpawnPoint,
    pub log_level: String,
    pub boss_bar: Option<BossBarConfig>,
    pub commands: Vec<String>,
    /// A full `blocks.json` report to use instead of the bundled one.
    pub palette_path: Option<PathBuf>,
}

impl Default for ServerProperties {
    fn default() -> Self {
        Self {
            server_ip: "0.0.0.0".to_string(),
            server_port: 25565,
            max_players: 10,
            view_distance: 6,
            motd: "A Limbo Server".to_string(),
            world_name: "world".to_string(),
            environment: Environment::default(),
            game_mode: GameMode::default(),
            spawn: SpawnPoint::default(),
            log_level: "info".to_string(),
            boss_bar: None,
            commands: Vec::new(),
            palette_path: None,
        }
    }
}

impl ServerProperties {
    /// Loads the file at `path`. A missing file gives the defaults; a file
    /// that exists but does not parse or validate is an error.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log(
                format!("No config at {}, using defaults", path.display()),
                LogSeverity::Info,
            );
            return Ok(Self::default());
        }
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let properties: ServerProperties = serde_json::from_str(json)
            .map_err(|err| LimboError::ConfigError(format!("Malformed config: {}", err)))?;
        properties.validate()?;
        Ok(properties)
    }

    fn validate(&self) -> Result<()> {
        if !(2..=32).contains(&self.view_distance) {
            return Err(LimboError::ConfigError(format!(
                "view_distance must be between 2 and 32, got {}",
                self.view_distance
            )));
        }
        if self.max_players < 0 {
            return Err(LimboError::ConfigError(format!(
                "max_players must not be negative, got {}",
                self.max_players
            )));
        }
        self.log_severity()?;
        Ok(())
    }

    pub fn log_severity(&self) -> Result<LogSeverity> {
        self.log_level
            .parse()
            .map_err(|_| LimboError::ConfigError(format!("Unknown log_level {}", self.log_level)))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server_ip, self.server_port)
    }
}
