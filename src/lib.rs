pub mod config;
pub mod error;
pub mod logger;
pub mod player;
pub mod protocol;
pub mod server;
pub mod world;

// Re-export commonly used items
pub use error::{LimboError, Result};
pub use logger::{log, LogSeverity};
pub use protocol::packet::Packet;
