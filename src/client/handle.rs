use tokio::sync::mpsc::Sender;
use tungstenite::protocol::Message as WsMessage;
use uuid::Uuid;

pub type ClientId = String;

/// Frames a client may have queued but not yet written to its socket.
/// A reading is superseded every tick, so a peer this far behind is dropped.
pub const SEND_QUEUE_CAPACITY: usize = 16;

/// Represents a connected WebSocket client.
///
/// The registry never touches the socket directly; it writes into `sender`
/// and a per-connection task forwards the frames to the socket. Once that
/// task is gone the channel is closed and every send fails.
#[derive(Debug, Clone)]
pub struct Client {
    /// Unique identifier for the connection.
    pub id: ClientId,

    /// Channel to send WebSocket messages to the client.
    pub sender: Sender<WsMessage>,
}

impl Client {
    /// Create a new client with a sender channel and a fresh UUID.
    pub fn new(sender: Sender<WsMessage>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            sender,
        }
    }

    /// Queue a frame for the socket without waiting. Returns `false` if the
    /// connection is gone or its queue is full.
    pub fn send(&self, msg: WsMessage) -> bool {
        self.sender.try_send(msg).is_ok()
    }
}
