use std::time::Duration;

use serde::Deserialize;

/// Top-level configuration settings for the broadcaster.
///
/// Includes settings for both the WebSocket server and the telemetry stream.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Settings {
    pub server: ServerSettings,
    pub telemetry: TelemetrySettings,
}

impl Settings {
    /// Socket address the server binds to, as `host:port`.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Configuration settings for the server.
///
/// Defines the host and port the server will bind to, and the one HTTP path
/// that is upgraded to a WebSocket.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub path: String,
}

/// Configuration settings for telemetry generation.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct TelemetrySettings {
    /// Delay between two ticks, in milliseconds.
    pub interval_ms: u64,
    pub mode: StreamMode,
}

impl TelemetrySettings {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// Who owns the generator loop.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum StreamMode {
    /// Every connection runs its own generator and broadcasts to all clients.
    #[default]
    PerConnection,
    /// One process-wide generator broadcasts to all clients.
    Shared,
}

/// Partial configuration settings loaded from files or environment.
///
/// Every field is optional. Missing values are filled in from `Settings::default()`.
#[derive(Debug, Deserialize)]
pub struct PartialSettings {
    pub server: Option<PartialServerSettings>,
    pub telemetry: Option<PartialTelemetrySettings>,
}

#[derive(Debug, Deserialize)]
pub struct PartialServerSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub path: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PartialTelemetrySettings {
    pub interval_ms: Option<u64>,
    pub mode: Option<StreamMode>,
}

/// Provides default values for `Settings`.
///
/// The defaults bind every interface on port 8000 and tick every two seconds.
impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                host: "0.0.0.0".to_string(),
                port: 8000,
                path: "/ws".to_string(),
            },
            telemetry: TelemetrySettings {
                interval_ms: 2000,
                mode: StreamMode::default(),
            },
        }
    }
}
