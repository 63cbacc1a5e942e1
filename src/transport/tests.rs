use crate::config::{Settings, StreamMode};
use crate::registry::{self, Registry, SharedRegistry};
use crate::telemetry::Reading;
use crate::transport::handshake::{apply_cors, upgrade_callback};
use crate::transport::websocket::{accept_loop, serve};
use futures_util::{SinkExt, StreamExt};
use std::collections::VecDeque;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::server::{Request, Response};
use tokio_tungstenite::tungstenite::http::{HeaderMap, HeaderValue, StatusCode};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

type WsClient = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

const WAIT: Duration = Duration::from_secs(5);

async fn setup_server(mode: StreamMode, interval_ms: u64) -> (SocketAddr, SharedRegistry) {
    let mut settings = Settings::default();
    settings.telemetry.mode = mode;
    settings.telemetry.interval_ms = interval_ms;

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local_addr");
    let registry = Registry::shared();

    if mode == StreamMode::Shared {
        crate::session::spawn_shared_stream(registry.clone(), settings.telemetry.interval());
    }
    tokio::spawn(serve(listener, registry.clone(), settings));

    (addr, registry)
}

async fn connect(addr: SocketAddr) -> WsClient {
    let (ws, _) = connect_async(format!("ws://{addr}/ws"))
        .await
        .expect("WebSocket handshake failed");
    ws
}

async fn next_reading(ws: &mut WsClient) -> Reading {
    loop {
        let msg = timeout(WAIT, ws.next())
            .await
            .expect("timed out waiting for a reading")
            .expect("stream ended")
            .expect("read error");
        if let WsMessage::Text(text) = msg {
            return serde_json::from_str(&text).unwrap_or_else(|e| {
                panic!("Failed to deserialize Reading from '{text}': {e}");
            });
        }
    }
}

async fn wait_for_len(registry: &SharedRegistry, expected: usize) {
    timeout(WAIT, async {
        while registry::lock(registry).len() != expected {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("registry never reached {expected} clients"));
}

#[test]
fn test_upgrade_callback_rejects_other_paths() {
    let callback = upgrade_callback("/ws".to_string());
    let request = Request::builder().uri("/other").body(()).unwrap();
    let err = callback(&request, Response::new(())).unwrap_err();
    assert_eq!(err.status(), StatusCode::NOT_FOUND);
}

#[test]
fn test_upgrade_callback_adds_cors_headers() {
    let callback = upgrade_callback("/ws".to_string());
    let request = Request::builder()
        .uri("/ws")
        .header("Origin", "http://localhost:5173")
        .body(())
        .unwrap();
    let response = callback(&request, Response::new(())).unwrap();
    let headers = response.headers();
    assert_eq!(
        headers["access-control-allow-origin"],
        "http://localhost:5173"
    );
    assert_eq!(headers["access-control-allow-credentials"], "true");
    assert_eq!(headers["access-control-allow-methods"], "*");
    assert_eq!(headers["access-control-allow-headers"], "*");
}

#[test]
fn test_cors_without_origin_uses_wildcard() {
    let mut headers = HeaderMap::new();
    apply_cors(None, &mut headers);
    assert_eq!(headers["access-control-allow-origin"], "*");
    assert!(headers.get("vary").is_none());
}

#[tokio::test]
async fn test_client_receives_readings() {
    let (addr, registry) = setup_server(StreamMode::PerConnection, 50).await;
    let mut ws = connect(addr).await;

    let reading = next_reading(&mut ws).await;
    assert!((40.0..=55.0).contains(&reading.humidity));
    assert!((1.0..=1.5).contains(&reading.power));
    assert!((228.0..=232.0).contains(&reading.voltage));
    assert!((1200..=1500).contains(&reading.fan_speed));

    let second = next_reading(&mut ws).await;
    assert_eq!(
        second.door_opened,
        reading.temperature - second.temperature > 1.0
    );

    wait_for_len(&registry, 1).await;
}

#[tokio::test]
async fn test_message_has_exactly_the_reading_keys() {
    let (addr, _registry) = setup_server(StreamMode::PerConnection, 50).await;
    let mut ws = connect(addr).await;

    let msg = timeout(WAIT, ws.next()).await.unwrap().unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(msg.to_text().unwrap()).unwrap();
    let mut keys: Vec<&str> = value.as_object().unwrap().keys().map(|k| k.as_str()).collect();
    keys.sort_unstable();
    assert_eq!(
        keys,
        vec!["door_opened", "fan_speed", "humidity", "power", "temperature", "voltage"]
    );
    assert!(value["fan_speed"].is_u64());
    assert!(value["door_opened"].is_boolean());
}

#[tokio::test]
async fn test_close_unregisters_client() {
    let (addr, registry) = setup_server(StreamMode::PerConnection, 50).await;
    let mut ws = connect(addr).await;
    wait_for_len(&registry, 1).await;

    ws.close(None).await.expect("Failed to close WebSocket");
    wait_for_len(&registry, 0).await;
}

#[tokio::test]
async fn test_dropped_connection_unregisters_client() {
    let (addr, registry) = setup_server(StreamMode::Shared, 20).await;
    let a = connect(addr).await;
    let mut b = connect(addr).await;
    wait_for_len(&registry, 2).await;

    drop(a);
    wait_for_len(&registry, 1).await;

    // the remaining client keeps receiving
    next_reading(&mut b).await;
}

#[tokio::test]
async fn test_unknown_path_is_rejected() {
    let (addr, registry) = setup_server(StreamMode::PerConnection, 50).await;
    let result = connect_async(format!("ws://{addr}/elsewhere")).await;
    assert!(result.is_err());
    assert!(registry::lock(&registry).is_empty());
}

#[tokio::test]
async fn test_handshake_response_allows_any_origin() {
    let (addr, _registry) = setup_server(StreamMode::PerConnection, 50).await;
    let mut request = format!("ws://{addr}/ws").into_client_request().unwrap();
    request
        .headers_mut()
        .insert("Origin", HeaderValue::from_static("http://dashboard.example"));

    let (_ws, response) = connect_async(request).await.expect("handshake failed");
    let headers = response.headers();
    assert_eq!(
        headers["access-control-allow-origin"],
        "http://dashboard.example"
    );
    assert_eq!(headers["access-control-allow-credentials"], "true");
}

#[tokio::test]
async fn test_each_connection_drives_its_own_stream() {
    // interval far beyond the test so only first ticks are observed
    let (addr, registry) = setup_server(StreamMode::PerConnection, 60_000).await;

    let mut a = connect(addr).await;
    next_reading(&mut a).await;

    let mut b = connect(addr).await;
    wait_for_len(&registry, 2).await;

    // b's own loop ticks at once and reaches both clients
    let from_b = next_reading(&mut b).await;
    assert_eq!(next_reading(&mut a).await, from_b);
}

#[tokio::test]
async fn test_shared_stream_sends_the_same_readings_to_everyone() {
    let (addr, registry) = setup_server(StreamMode::Shared, 50).await;
    let mut a = connect(addr).await;
    let mut b = connect(addr).await;
    wait_for_len(&registry, 2).await;

    let from_b = next_reading(&mut b).await;
    let mut seen = false;
    for _ in 0..10 {
        if next_reading(&mut a).await == from_b {
            seen = true;
            break;
        }
    }
    assert!(seen, "client a never saw {from_b:?}");
}

#[tokio::test]
async fn test_inbound_messages_are_ignored() {
    let (addr, registry) = setup_server(StreamMode::PerConnection, 50).await;
    let mut ws = connect(addr).await;

    ws.send(WsMessage::text("hello")).await.unwrap();
    ws.send(WsMessage::Ping(vec![1, 2, 3].into())).await.unwrap();

    next_reading(&mut ws).await;
    wait_for_len(&registry, 1).await;
}

#[tokio::test(start_paused = true)]
async fn test_accept_errors_do_not_stop_the_server() {
    let peer: SocketAddr = "127.0.0.1:4000".parse().unwrap();
    let mut outcomes: VecDeque<io::Result<(u32, SocketAddr)>> = VecDeque::from([
        Err(io::Error::from_raw_os_error(24)), // EMFILE
        Ok((1, peer)),
        Err(io::Error::new(io::ErrorKind::ConnectionAborted, "aborted")),
        Err(io::Error::new(io::ErrorKind::ConnectionAborted, "aborted")),
        Ok((2, peer)),
    ]);
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

    let handle = tokio::spawn(accept_loop(
        move || {
            let next = outcomes.pop_front();
            async move {
                match next {
                    Some(outcome) => outcome,
                    None => std::future::pending().await,
                }
            }
        },
        move |stream, _peer| {
            tx.send(stream).unwrap();
        },
    ));

    assert_eq!(timeout(WAIT, rx.recv()).await.unwrap(), Some(1));
    assert_eq!(timeout(WAIT, rx.recv()).await.unwrap(), Some(2));
    assert!(!handle.is_finished());
    handle.abort();
}
