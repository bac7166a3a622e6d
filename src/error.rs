use crate::protocol::registry::PacketKind;
use std::error::Error;
use std::fmt;

pub type Result<T> = std::result::Result<T, LimboError>;

#[derive(Debug)]
pub enum LimboError {
    IoError(std::io::Error),
    JsonError(serde_json::Error),
    ProtocolError(String),
    ConfigError(String),
    /// The bundled block-state dataset is missing, malformed or not loaded yet.
    PaletteError(String),
    /// A clientbound packet kind has no ID in the active registry.
    UnregisteredPacket(PacketKind),
    /// The outbound half of a connection is gone.
    ConnectionClosed,
}

impl fmt::Display for LimboError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LimboError::IoError(err) => write!(f, "IO error: {}", err),
            LimboError::JsonError(err) => write!(f, "JSON error: {}", err),
            LimboError::ProtocolError(msg) => write!(f, "Protocol error: {}", msg),
            LimboError::ConfigError(msg) => write!(f, "Config error: {}", msg),
            LimboError::PaletteError(msg) => write!(f, "Palette error: {}", msg),
            LimboError::UnregisteredPacket(kind) => {
                write!(f, "Packet {:?} has no registered ID", kind)
            }
            LimboError::ConnectionClosed => write!(f, "Connection closed"),
        }
    }
}

impl Error for LimboError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            LimboError::IoError(err) => Some(err),
            LimboError::JsonError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for LimboError {
    fn from(err: std::io::Error) -> Self {
        LimboError::IoError(err)
    }
}

impl From<serde_json::Error> for LimboError {
    fn from(err: serde_json::Error) -> Self {
        LimboError::JsonError(err)
    }
}
