// Server loop module
// Accepts connections until the shutdown signal fires

use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Notify;

use super::connection::serve_connection;
use crate::config::AppState;
use crate::logger;

/// Accept loop
///
/// Runs until `shutdown` is notified. Accept errors are logged and the loop
/// keeps going; connections already spawned finish on their own.
#[allow(clippy::ignored_unit_patterns)]
pub async fn run(listener: TcpListener, state: Arc<AppState>, shutdown: Arc<Notify>) {
    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        serve_connection(stream, peer_addr, Arc::clone(&state));
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            _ = shutdown.notified() => {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_state;
    use crate::server::create_reusable_listener;
    use http_body_util::{BodyExt, Full};
    use hyper::body::Bytes;
    use hyper::header::{CONTENT_LENGTH, CONTENT_TYPE, HOST};
    use hyper::{Method, Request, StatusCode};
    use hyper_util::rt::TokioIo;
    use std::net::SocketAddr;
    use tempfile::TempDir;

    async fn send(addr: SocketAddr, method: Method, uri: &str, body: &str) -> (StatusCode, Option<String>, Bytes) {
        let stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        let (mut sender, conn) = hyper::client::conn::http1::handshake(TokioIo::new(stream))
            .await
            .unwrap();
        tokio::spawn(conn);

        let req = Request::builder()
            .method(method)
            .uri(uri)
            .header(HOST, "localhost")
            .header(CONTENT_LENGTH, body.len())
            .body(Full::new(Bytes::from(body.to_string())))
            .unwrap();
        let resp = sender.send_request(req).await.unwrap();
        let status = resp.status();
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        (status, content_type, bytes)
    }

    async fn start(dir: &TempDir) -> (SocketAddr, Arc<Notify>, tokio::task::JoinHandle<()>) {
        let listener = create_reusable_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = Arc::new(Notify::new());
        let handle = tokio::spawn(run(listener, test_state(dir.path()), Arc::clone(&shutdown)));
        (addr, shutdown, handle)
    }

    #[tokio::test]
    async fn test_end_to_end_save_and_not_found() {
        let dir = TempDir::new().unwrap();
        let (addr, shutdown, handle) = start(&dir).await;

        let (status, content_type, body) =
            send(addr, Method::POST, "/save-config", r#"{"a":1}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some("application/json"));
        let envelope: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(envelope, serde_json::json!({"success": true}));

        let (status, _, body) = send(addr, Method::POST, "/save-config", r#"{"b":2}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert!(!body.is_empty());
        let saved: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(dir.path().join("config.json")).unwrap())
                .unwrap();
        assert_eq!(saved, serde_json::json!({"b": 2}));

        let (status, _, body) = send(addr, Method::POST, "/other", r#"{"c":3}"#).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.is_empty());

        let (status, _, body) = send(addr, Method::POST, "/save-config", "not json").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let envelope: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(!envelope["error"].as_str().unwrap().is_empty());

        shutdown.notify_one();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_shutdown_stops_accept_loop() {
        let dir = TempDir::new().unwrap();
        let (_addr, shutdown, handle) = start(&dir).await;

        shutdown.notify_one();
        tokio::time::timeout(std::time::Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
