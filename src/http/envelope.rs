//! Response envelope
//!
//! `{"success": true}` or `{"error": "<message>"}`, nothing else.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseEnvelope {
    Success { success: bool },
    Failure { error: String },
}

impl ResponseEnvelope {
    pub const fn success() -> Self {
        Self::Success { success: true }
    }

    pub fn failure(err: &impl std::fmt::Display) -> Self {
        Self::Failure {
            error: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_shape() {
        let value = serde_json::to_value(ResponseEnvelope::success()).unwrap();
        assert_eq!(value, json!({"success": true}));
    }

    #[test]
    fn test_failure_shape() {
        let value = serde_json::to_value(ResponseEnvelope::failure(&"disk full")).unwrap();
        assert_eq!(value, json!({"error": "disk full"}));
    }

    #[test]
    fn test_parse_either_shape() {
        let ok: ResponseEnvelope = serde_json::from_str(r#"{"success": true}"#).unwrap();
        assert_eq!(ok, ResponseEnvelope::success());

        let err: ResponseEnvelope = serde_json::from_str(r#"{"error": "boom"}"#).unwrap();
        assert_eq!(
            err,
            ResponseEnvelope::Failure {
                error: "boom".to_string()
            }
        );
    }
}
