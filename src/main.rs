use sensorcast::config::{StreamMode, load_config};
use sensorcast::registry::Registry;
use sensorcast::session::spawn_shared_stream;
use sensorcast::transport::websocket::start_websocket_server;
use sensorcast::utils::error::Result;
use sensorcast::utils::logging;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    logging::init("info");

    if let Err(e) = run_server().await {
        error!("Server failed: {e}");
        std::process::exit(1);
    }
}

async fn run_server() -> Result<()> {
    let config = load_config()?;
    let registry = Registry::shared();

    if config.telemetry.mode == StreamMode::Shared {
        spawn_shared_stream(registry.clone(), config.telemetry.interval());
    }

    tokio::select! {
        result = start_websocket_server(config, registry) => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received. Exiting gracefully.");
        }
    }

    Ok(())
}
