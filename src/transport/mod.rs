//! The `transport` module is responsible for handling network communication
//! with clients via WebSockets.
//!
//! It accepts connections on the configured path, registers each one with
//! the registry, forwards broadcast frames to the socket and unregisters the
//! client once the connection goes away.

pub mod handshake;
pub mod websocket;

#[cfg(test)]
mod tests;
