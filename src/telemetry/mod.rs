//! The `telemetry` module produces the synthetic sensor time series.
//!
//! A `TelemetryGenerator` keeps the previous temperature and derives each new
//! `Reading` from it with a bounded random walk; every other field is an
//! independent draw per tick.

pub mod generator;
pub mod reading;

pub use generator::{TelemetryGenerator, door_opened, round_to};
pub use reading::Reading;
