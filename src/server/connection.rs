// 连接处理模块
// Serves a single accepted TCP connection over HTTP/1.1

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use crate::config::AppState;
use crate::handler;
use crate::logger;

/// Handle a single connection in a spawned task.
///
/// This function:
/// 1. Wraps the TCP stream in `TokioIo`
/// 2. Configures HTTP/1.1 keep-alive from settings
/// 3. Serves the connection with the request router
/// 4. Bounds the whole connection, idle keep-alive time included, by
///    `performance.connection_timeout`
///
/// The handler holds no per-connection state, so connections are fully
/// independent; the config store serializes the actual file writes.
pub fn serve_connection(stream: tokio::net::TcpStream, peer_addr: SocketAddr, state: Arc<AppState>) {
    logger::log_connection_accepted(&peer_addr);

    tokio::spawn(async move {
        let io = TokioIo::new(stream);
        let timeout_duration = Duration::from_secs(state.config.performance.connection_timeout);

        let mut builder = http1::Builder::new();
        builder.keep_alive(state.config.performance.keep_alive);

        let conn = builder.serve_connection(
            io,
            service_fn(move |req| handler::handle_request(req, Arc::clone(&state), peer_addr)),
        );

        match tokio::time::timeout(timeout_duration, conn).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => logger::log_connection_error(&err),
            Err(_) => {
                logger::log_warning(&format!(
                    "Connection from {peer_addr} closed after reaching its {} second lifetime",
                    timeout_duration.as_secs()
                ));
            }
        }
    });
}
