//! Connection registry
//!
//! Tracks the live clients in connection order and fans readings out to all
//! of them. The API is synchronous and meant to sit behind
//! `Arc<Mutex<Registry>>`; nothing here awaits, so the lock is never held
//! across socket I/O. Delivery goes through each client's channel and the
//! socket write happens in that client's own writer task.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{error, info, warn};
use tungstenite::protocol::Message as WsMessage;

use crate::client::{Client, ClientId};
use crate::telemetry::Reading;

pub type SharedRegistry = Arc<Mutex<Registry>>;

/// Locks a shared registry. A panic while holding the lock cannot leave the
/// client list half-updated, so a poisoned lock is simply taken over.
pub fn lock(registry: &SharedRegistry) -> MutexGuard<'_, Registry> {
    registry.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug, Default)]
pub struct Registry {
    clients: Vec<Client>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            clients: Vec::new(),
        }
    }

    pub fn shared() -> SharedRegistry {
        Arc::new(Mutex::new(Self::new()))
    }

    /// Adds a client to the end of the live set.
    /// A client whose id is already registered is ignored.
    pub fn register(&mut self, client: Client) {
        if self.contains(&client.id) {
            return;
        }
        self.clients.push(client);
        info!("Client connected ({} total)", self.clients.len());
    }

    /// Removes a client if present. Returns whether anything was removed;
    /// calling it for an unknown or already removed id is a no-op.
    pub fn unregister(&mut self, client_id: &ClientId) -> bool {
        let before = self.clients.len();
        self.clients.retain(|c| &c.id != client_id);
        let removed = self.clients.len() != before;
        if removed {
            info!("Client disconnected ({} total)", self.clients.len());
        }
        removed
    }

    /// Sends `reading` to every registered client, in registration order.
    ///
    /// Clients whose channel is closed are unregistered once the pass is
    /// over, so removal never disturbs the traversal. Nothing is returned to
    /// the caller but the number of clients that accepted the message.
    pub fn broadcast(&mut self, reading: &Reading) -> usize {
        let text = match serde_json::to_string(reading) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize reading: {e}");
                return 0;
            }
        };
        let ws_msg = WsMessage::text(text);

        let mut failed = Vec::new();
        let mut delivered = 0;
        for client in &self.clients {
            if client.send(ws_msg.clone()) {
                delivered += 1;
            } else {
                warn!("Failed to send to {}, dropping it", client.id);
                failed.push(client.id.clone());
            }
        }

        for client_id in &failed {
            self.unregister(client_id);
        }
        delivered
    }

    pub fn contains(&self, client_id: &ClientId) -> bool {
        self.clients.iter().any(|c| &c.id == client_id)
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// Ids of the live clients in registration order.
    pub fn ids(&self) -> Vec<ClientId> {
        self.clients.iter().map(|c| c.id.clone()).collect()
    }
}
