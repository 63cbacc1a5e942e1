//! # Sensorcast
//!
//! `sensorcast` is a small real-time telemetry broadcaster built with Rust.
//! It generates synthetic sensor readings (temperature, humidity, power,
//! voltage, fan speed and a door-open alarm) on a fixed interval and pushes
//! them as JSON to every client connected over a WebSocket.
//!
//! ## Core Modules
//!
//! - `client`: Represents a connected WebSocket client.
//! - `config`: Handles loading and managing server configuration.
//! - `registry`: Tracks live clients and fans readings out to them.
//! - `session`: Runs the tick loop, per connection or shared.
//! - `telemetry`: The random-walk reading generator.
//! - `transport`: Manages the WebSocket server and the per-connection tasks.
//! - `utils`: Error type and logging setup.

pub mod client;
pub mod config;
pub mod registry;
pub mod session;
pub mod telemetry;
pub mod transport;
pub mod utils;
