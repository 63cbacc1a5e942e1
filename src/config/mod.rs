mod settings;

use crate::config::settings::PartialSettings;
use config::{Config, ConfigError, Environment, File};

pub use settings::{ServerSettings, Settings, StreamMode, TelemetrySettings};

/// Loads the configuration from the default file and environment variables
/// Merges the configuration with default values
/// Returns a `Settings` struct containing the server and telemetry configurations
///
/// Environment keys carry the `SENSORCAST_` prefix and a double underscore
/// between sections, so that field names keep their own underscores:
/// `SENSORCAST_SERVER__PORT`, `SENSORCAST_TELEMETRY__INTERVAL_MS`.
pub fn load_config() -> Result<Settings, ConfigError> {
    let builder = Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(
            Environment::with_prefix("SENSORCAST")
                .prefix_separator("_")
                .separator("__"),
        );

    let config = builder.build()?;
    let partial: PartialSettings = config.try_deserialize()?;
    let default = Settings::default();

    let server = partial.server;
    let telemetry = partial.telemetry;

    let settings = Settings {
        server: ServerSettings {
            host: server
                .as_ref()
                .and_then(|s| s.host.clone())
                .unwrap_or(default.server.host),
            port: server
                .as_ref()
                .and_then(|s| s.port)
                .unwrap_or(default.server.port),
            path: server
                .as_ref()
                .and_then(|s| s.path.clone())
                .unwrap_or(default.server.path),
        },
        telemetry: TelemetrySettings {
            interval_ms: telemetry
                .as_ref()
                .and_then(|t| t.interval_ms)
                .unwrap_or(default.telemetry.interval_ms),
            mode: telemetry
                .as_ref()
                .and_then(|t| t.mode)
                .unwrap_or(default.telemetry.mode),
        },
    };

    if settings.telemetry.interval_ms == 0 {
        return Err(ConfigError::Message(
            "telemetry.interval_ms must be greater than zero".to_string(),
        ));
    }

    Ok(settings)
}
