//! The `error` module defines the error types used within `sensorcast`.
//!
//! Only startup failures are represented here. Failures scoped to a single
//! client are logged and resolved by dropping that client, never returned.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SensorcastError {
    #[error("failed to load configuration: {0}")]
    Config(#[from] config::ConfigError),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("WebSocket server exited unexpectedly")]
    ServerStopped,
}

pub type Result<T> = std::result::Result<T, SensorcastError>;
