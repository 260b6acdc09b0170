//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: matches the save route, dispatches,
//! and writes the access log line.

use crate::config::AppState;
use crate::handler::save;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::USER_AGENT;
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// The single route that accepts uploads
pub const SAVE_CONFIG_PATH: &str = "/save-config";

/// Routing decision for a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    SaveConfig,
    NotFound,
}

/// Only `POST /save-config` is served; everything else is a 404.
/// `target` is the request target as sent, query string included, so
/// `/save-config?x=1` does not match.
pub fn route(method: &Method, target: &str) -> Route {
    if *method == Method::POST && target == SAVE_CONFIG_PATH {
        Route::SaveConfig
    } else {
        Route::NotFound
    }
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    remote_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let started = Instant::now();
    let mut entry = state.config.logging.access_log.then(|| access_entry(&req, remote_addr));

    let target = req
        .uri()
        .path_and_query()
        .map_or_else(|| req.uri().path(), |pq| pq.as_str());
    let response = match route(req.method(), target) {
        Route::SaveConfig => save::handle_save(req, &state).await,
        Route::NotFound => http::build_404_response(),
    };

    if let Some(entry) = entry.as_mut() {
        entry.status = response.status().as_u16();
        entry.body_bytes = response.body().size_hint().exact().unwrap_or(0);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

fn access_entry<B>(req: &Request<B>, remote_addr: SocketAddr) -> AccessLogEntry {
    let mut entry = AccessLogEntry::new(
        remote_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = logger::http_version_label(req.version());
    entry.user_agent = req
        .headers()
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string);
    entry
}
