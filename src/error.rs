//! Save-config failure type
//!
//! Every failure on the save path ends up as one of these. The status code
//! never varies by kind (always 500); the `Display` text is what the client
//! receives in the `error` field.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("missing Content-Length header")]
    MissingContentLength,

    #[error("invalid Content-Length header: {0:?}")]
    InvalidContentLength(String),

    #[error("request body exceeds the {limit} byte limit")]
    BodyTooLarge { limit: u64 },

    #[error("failed to read request body: {0}")]
    BodyRead(String),

    #[error("request body was {actual} bytes but Content-Length declared {expected}")]
    LengthMismatch { expected: u64, actual: u64 },

    #[error("request body is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    #[error("{0}")]
    InvalidJson(serde_json::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(serde_json::Error),

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
