//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{body::Body, http::Request, response::Response, Router};
use steam_relay::config::RelayConfig;
use steam_relay::http::HttpServer;
use steam_relay::lookup::RequestPipeline;
use steam_relay::observability::{DiagnosticLogger, SystemClock};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tower::ServiceExt;

pub const TEST_STEAM_ID: &str = "76561198000000000";

/// A raw-TCP HTTP server answering every request with a fixed response.
///
/// Serves as the upstream API, or as a forward proxy that answers on the
/// upstream's behalf. Request heads are captured for inspection.
pub struct MockServer {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<String>>>,
}

#[allow(dead_code)]
impl MockServer {
    /// Captured request heads (request line + headers), oldest first.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn hits(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

/// Start a mock server on an ephemeral loopback port.
pub async fn start_mock_server(status: u16, body: impl Into<String>) -> MockServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let body = body.into();

    let captured = requests.clone();
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let captured = captured.clone();
                    let body = body.clone();
                    tokio::spawn(async move {
                        let head = read_head(&mut socket).await;
                        captured.lock().unwrap().push(head);

                        let status_text = match status {
                            200 => "200 OK",
                            403 => "403 Forbidden",
                            500 => "500 Internal Server Error",
                            502 => "502 Bad Gateway",
                            _ => "200 OK",
                        };
                        let response = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    MockServer { addr, requests }
}

async fn read_head(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                buf.extend_from_slice(&chunk[..n]);
                if buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// A loopback address nothing is listening on.
#[allow(dead_code)]
pub async fn closed_port_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Configuration pointing the relay at `upstream`.
pub fn config_for(upstream: &str) -> RelayConfig {
    let mut config = RelayConfig::default();
    config.upstream.endpoint = format!("{}/api/v1/game/steam/summary", upstream);
    config.upstream.api_key = "test-key".to_string();
    config.upstream.timeout_secs = 5;
    config
}

/// Relay router plus the in-memory diagnostic log it writes to.
pub fn relay(config: RelayConfig) -> (Router, Arc<DiagnosticLogger>) {
    let logger = Arc::new(DiagnosticLogger::in_memory(Arc::new(SystemClock)));
    let pipeline = Arc::new(RequestPipeline::new(&config, logger.clone()).unwrap());
    let server = HttpServer::new(config, pipeline, logger.clone());
    (server.router(), logger)
}

/// Send one request through the router.
pub async fn send(router: Router, method: &str, uri: &str) -> Response {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("origin", "http://example.com")
        .body(Body::empty())
        .unwrap();
    router.oneshot(request).await.unwrap()
}

/// Read a response body as JSON.
pub async fn json_body(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
