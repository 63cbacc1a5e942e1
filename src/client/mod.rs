//! The `client` module defines the representation of a connected client.
//!
//! It provides the `Client` struct, which encapsulates the state of a single
//! connected client: an identifier standing in for the connection itself and
//! the channel used to push messages to its socket.

pub mod handle;
pub use handle::{Client, ClientId, SEND_QUEUE_CAPACITY};
