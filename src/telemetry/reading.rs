use serde::{Deserialize, Serialize};

/// One synthetic telemetry sample.
///
/// Serialized as a flat JSON object with exactly these six keys, e.g.
///
/// ```json
/// {"temperature":22.41,"humidity":47.1,"power":1.23,"voltage":230.4,"fan_speed":1337,"door_opened":false}
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Degrees Celsius, two decimal places.
    pub temperature: f64,
    /// Relative humidity in percent, two decimal places.
    pub humidity: f64,
    /// Kilowatts, two decimal places.
    pub power: f64,
    /// Volts, one decimal place.
    pub voltage: f64,
    /// Revolutions per minute.
    pub fan_speed: u32,
    /// Set when the temperature fell by more than one degree since the previous tick.
    pub door_opened: bool,
}
