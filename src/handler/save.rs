//! Save-config handler
//!
//! Reads exactly `Content-Length` bytes, parses them as UTF-8 JSON and hands
//! the document to the config store. Any failure along the way becomes a 500
//! carrying the failure's message.

use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::header::CONTENT_LENGTH;
use hyper::{HeaderMap, Request, Response, StatusCode};
use serde_json::Value;

use crate::config::AppState;
use crate::error::SaveError;
use crate::http::{self, ResponseEnvelope};
use crate::logger;

/// Handle `POST /save-config`
pub async fn handle_save<B>(req: Request<B>, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    match save_config(req, state).await {
        Ok(()) => {
            logger::log_debug(&format!("Saved config to {}", state.store.path().display()));
            http::build_json_response(StatusCode::OK, &ResponseEnvelope::success())
        }
        Err(e) => {
            logger::log_error(&format!("save-config failed: {e}"));
            http::build_json_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &ResponseEnvelope::failure(&e),
            )
        }
    }
}

async fn save_config<B>(req: Request<B>, state: &AppState) -> Result<(), SaveError>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let limit = state.config.http.max_body_size;
    let declared = content_length(req.headers())?;
    if declared > limit {
        return Err(SaveError::BodyTooLarge { limit });
    }

    let body = read_body(req.into_body(), declared, limit).await?;
    let document = parse_document(&body)?;
    state.store.save(&document).await
}

/// Parse the mandatory `Content-Length` header
pub fn content_length(headers: &HeaderMap) -> Result<u64, SaveError> {
    let value = headers
        .get(CONTENT_LENGTH)
        .ok_or(SaveError::MissingContentLength)?;
    let text = value.to_str().map_err(|_| {
        SaveError::InvalidContentLength(String::from_utf8_lossy(value.as_bytes()).into_owned())
    })?;
    text.trim()
        .parse::<u64>()
        .map_err(|_| SaveError::InvalidContentLength(text.to_string()))
}

/// Collect the body, refusing anything past `limit` bytes
async fn read_body<B>(body: B, expected: u64, limit: u64) -> Result<Bytes, SaveError>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let limited = Limited::new(body, usize::try_from(limit).unwrap_or(usize::MAX));
    let bytes = match limited.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) if e.is::<LengthLimitError>() => return Err(SaveError::BodyTooLarge { limit }),
        Err(e) => return Err(SaveError::BodyRead(e.to_string())),
    };

    let actual = u64::try_from(bytes.len()).unwrap_or(u64::MAX);
    if actual != expected {
        return Err(SaveError::LengthMismatch { expected, actual });
    }
    Ok(bytes)
}

/// Decode UTF-8, then parse JSON
pub fn parse_document(body: &[u8]) -> Result<Value, SaveError> {
    let text = std::str::from_utf8(body)?;
    serde_json::from_str(text).map_err(SaveError::InvalidJson)
}
