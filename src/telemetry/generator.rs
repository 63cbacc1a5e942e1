use std::ops::RangeInclusive;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::telemetry::reading::Reading;

/// Range the very first `previous_temperature` is drawn from.
pub const INITIAL_TEMPERATURE: RangeInclusive<f64> = 21.0..=25.0;
/// Maximum per-tick temperature change in either direction.
pub const TEMPERATURE_STEP: f64 = 0.7;
pub const HUMIDITY: RangeInclusive<f64> = 40.0..=55.0;
pub const POWER: RangeInclusive<f64> = 1.0..=1.5;
pub const VOLTAGE: RangeInclusive<f64> = 228.0..=232.0;
pub const FAN_SPEED: RangeInclusive<u32> = 1200..=1500;
/// A drop larger than this between two ticks raises the door alarm.
pub const DOOR_DROP_THRESHOLD: f64 = 1.0;

/// Rounds `value` to `places` decimal places.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// The door alarm fires when the temperature fell by strictly more than
/// [`DOOR_DROP_THRESHOLD`] since the previous tick.
pub fn door_opened(previous_temperature: f64, temperature: f64) -> bool {
    previous_temperature - temperature > DOOR_DROP_THRESHOLD
}

/// Random-walk telemetry source for one stream.
///
/// The only state carried across ticks is `previous_temperature`; it is
/// replaced by the freshly generated temperature after every call to
/// [`TelemetryGenerator::next_reading`].
#[derive(Debug)]
pub struct TelemetryGenerator<R = StdRng> {
    rng: R,
    previous_temperature: f64,
}

impl TelemetryGenerator<StdRng> {
    /// Generator backed by an OS-seeded `StdRng`.
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_os_rng())
    }
}

impl<R: Rng> TelemetryGenerator<R> {
    /// Seeds `previous_temperature` uniformly from [`INITIAL_TEMPERATURE`].
    pub fn new(mut rng: R) -> Self {
        let previous_temperature = rng.random_range(INITIAL_TEMPERATURE);
        Self::with_previous_temperature(rng, previous_temperature)
    }

    pub fn with_previous_temperature(rng: R, previous_temperature: f64) -> Self {
        Self {
            rng,
            previous_temperature,
        }
    }

    pub fn previous_temperature(&self) -> f64 {
        self.previous_temperature
    }

    /// Produces the reading for one tick and advances the walk.
    pub fn next_reading(&mut self) -> Reading {
        let step = self.rng.random_range(-TEMPERATURE_STEP..=TEMPERATURE_STEP);
        let temperature = round_to(self.previous_temperature + step, 2);
        let humidity = round_to(self.rng.random_range(HUMIDITY), 2);
        let power = round_to(self.rng.random_range(POWER), 2);
        let voltage = round_to(self.rng.random_range(VOLTAGE), 1);
        let fan_speed = self.rng.random_range(FAN_SPEED);

        let reading = Reading {
            temperature,
            humidity,
            power,
            voltage,
            fan_speed,
            door_opened: door_opened(self.previous_temperature, temperature),
        };

        self.previous_temperature = temperature;
        reading
    }
}
