use std::time::Duration;

use rand::Rng;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::client::ClientId;
use crate::registry::{self, SharedRegistry};
use crate::telemetry::TelemetryGenerator;

/// Generates one reading per tick and broadcasts it to every client.
///
/// With an `owner`, the loop belongs to that connection and returns as soon as
/// the owner is no longer registered, whether it was removed by a failed
/// delivery or by its connection closing. Without one, it runs until the task
/// is dropped or aborted.
pub async fn run_generator_loop<R: Rng>(
    registry: SharedRegistry,
    mut generator: TelemetryGenerator<R>,
    interval: Duration,
    owner: Option<ClientId>,
) {
    loop {
        let reading = generator.next_reading();

        let owner_alive = {
            let mut registry = registry::lock(&registry);
            let delivered = registry.broadcast(&reading);
            debug!(
                temperature = reading.temperature,
                door_opened = reading.door_opened,
                delivered,
                "tick"
            );
            owner.as_ref().is_none_or(|id| registry.contains(id))
        };

        if !owner_alive {
            debug!("Generator loop for {:?} stopped", owner);
            return;
        }

        tokio::time::sleep(interval).await;
    }
}

/// Starts the single process-wide stream used by `StreamMode::Shared`.
pub fn spawn_shared_stream(registry: SharedRegistry, interval: Duration) -> JoinHandle<()> {
    info!("Starting shared telemetry stream ({interval:?} interval)");
    tokio::spawn(run_generator_loop(
        registry,
        TelemetryGenerator::from_entropy(),
        interval,
        None,
    ))
}
