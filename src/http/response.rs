//! HTTP response building module
//!
//! Provides builders for the two response kinds the server emits.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::CONTENT_TYPE;
use hyper::{Response, StatusCode};
use serde::Serialize;

/// Fallback when the envelope itself cannot be serialized
const SERIALIZE_FAILED_BODY: &str = r#"{"error": "failed to serialize response"}"#;

/// Build JSON response with `Content-Type: application/json`
pub fn build_json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    let (status, json) = match serde_json::to_vec(body) {
        Ok(j) => (status, Bytes::from(j)),
        Err(e) => {
            crate::logger::log_error(&format!("Failed to serialize response: {e}"));
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Bytes::from_static(SERIALIZE_FAILED_BODY.as_bytes()),
            )
        }
    };

    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "application/json")
        .body(Full::new(json))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 404 Not Found response, empty body and no content type
pub fn build_404_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::NOT_FOUND)
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("404", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
