//! WebSocket transport
//!
//! Responsibilities:
//! - Accept TCP connections and upgrade the ones aimed at the configured path
//! - Create a `Client` for each connection and register it with the registry
//! - Forward frames queued on the client's channel to its socket
//! - Drive the per-connection generator loop when running in that mode
//! - Unregister the client when the peer closes or the socket fails

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::spawn;
use tokio::sync::mpsc;
use tokio_tungstenite::accept_hdr_async;
use tracing::{debug, info, warn};
use tungstenite::protocol::Message as WsMessage;

use crate::client::{Client, SEND_QUEUE_CAPACITY};
use crate::config::{Settings, StreamMode};
use crate::registry::{self, SharedRegistry};
use crate::session::run_generator_loop;
use crate::telemetry::TelemetryGenerator;
use crate::transport::handshake::upgrade_callback;
use crate::utils::error::{Result, SensorcastError};

/// Pause after a failed `accept` before trying again.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Binds the configured address and serves connections.
///
/// Serving never ends on its own, so any return past the bind is an error.
pub async fn start_websocket_server(settings: Settings, registry: SharedRegistry) -> Result<()> {
    let addr = settings.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| SensorcastError::Bind {
            addr: addr.clone(),
            source,
        })?;

    info!("WebSocket server listening on ws://{addr}{}", settings.server.path);

    serve(listener, registry, settings).await;
    Err(SensorcastError::ServerStopped)
}

/// Accept loop over an already bound listener.
pub async fn serve(listener: TcpListener, registry: SharedRegistry, settings: Settings) {
    let settings = Arc::new(settings);
    let listener = &listener;

    accept_loop(
        move || listener.accept(),
        move |stream: TcpStream, peer: SocketAddr| {
            let registry = registry.clone();
            let settings = settings.clone();
            spawn(async move {
                handle_connection(stream, peer, registry, &settings).await;
            });
        },
    )
    .await
}

/// Hands every accepted connection to `on_accept`.
///
/// Accept errors (out of file descriptors, aborted handshakes) are logged and
/// retried after [`ACCEPT_BACKOFF`]; they never end the loop.
pub(crate) async fn accept_loop<S, A, Fut, H>(mut accept: A, mut on_accept: H)
where
    A: FnMut() -> Fut,
    Fut: Future<Output = io::Result<(S, SocketAddr)>>,
    H: FnMut(S, SocketAddr),
{
    loop {
        match accept().await {
            Ok((stream, peer)) => on_accept(stream, peer),
            Err(e) => {
                warn!("Failed to accept connection: {e}");
                tokio::time::sleep(ACCEPT_BACKOFF).await;
            }
        }
    }
}

async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    registry: SharedRegistry,
    settings: &Settings,
) {
    let ws_stream =
        match accept_hdr_async(stream, upgrade_callback(settings.server.path.clone())).await {
            Ok(ws) => ws,
            Err(e) => {
                warn!("WebSocket handshake error from {peer}: {e}");
                return;
            }
        };

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();
    let (tx, mut rx) = mpsc::channel::<WsMessage>(SEND_QUEUE_CAPACITY);
    let client = Client::new(tx);
    let client_id = client.id.clone();
    debug!("{client_id} connected from {peer}");

    registry::lock(&registry).register(client);

    // registry -> socket. If this task ends, or stalls on a peer that stops
    // reading until the queue fills, the next broadcast drops the client.
    {
        let client_id = client_id.clone();
        spawn(async move {
            while let Some(msg) = rx.recv().await {
                if let Err(e) = ws_sender.send(msg).await {
                    warn!("Failed to send message to {client_id}: {e}");
                    break;
                }
            }
            debug!("Send loop closed for {client_id}");
        });
    }

    // Inbound frames carry no meaning; they are read only to notice the
    // close and to let tungstenite answer pings.
    let read_until_closed = async {
        while let Some(frame) = ws_receiver.next().await {
            match frame {
                Ok(WsMessage::Close(_)) => break,
                Ok(_) => {}
                Err(e) => {
                    debug!("Read error from {client_id}: {e}");
                    break;
                }
            }
        }
    };

    match settings.telemetry.mode {
        StreamMode::PerConnection => {
            let generator = TelemetryGenerator::from_entropy();
            tokio::select! {
                _ = read_until_closed => {}
                _ = run_generator_loop(
                    registry.clone(),
                    generator,
                    settings.telemetry.interval(),
                    Some(client_id.clone()),
                ) => {}
            }
        }
        StreamMode::Shared => read_until_closed.await,
    }

    registry::lock(&registry).unregister(&client_id);
    debug!("{client_id} disconnected");
}
