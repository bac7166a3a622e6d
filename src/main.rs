use limbo::config::{ServerProperties, DEFAULT_CONFIG_PATH};
use limbo::logger::{log, set_min_severity, LogSeverity::*};
use limbo::protocol::registry::PacketRegistry;
use limbo::server::{self, Server};
use limbo::world::palette::{init_global_palette, GlobalPalette};
use limbo::Result;
use std::env;
use std::process;
use std::sync::Arc;

fn startup() -> Result<Server> {
    let config_path = env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let properties = ServerProperties::load(&config_path)?;
    set_min_severity(properties.log_severity()?);

    let palette = match &properties.palette_path {
        Some(path) => GlobalPalette::from_file(path)?,
        None => GlobalPalette::bundled()?,
    };
    let palette = init_global_palette(palette)?;
    log(format!("Loaded {} block types", palette.len()), Debug);

    Server::new(properties, PacketRegistry::protocol_766())
}

#[tokio::main]
async fn main() {
    log("Limbo init".to_string(), Info);

    let server = match startup() {
        Ok(server) => Arc::new(server),
        Err(err) => {
            log(format!("Startup failed: {}", err), Fatal);
            process::exit(1);
        }
    };

    if let Err(err) = server::run(server).await {
        log(format!("Server stopped: {}", err), Fatal);
        process::exit(1);
    }
}
