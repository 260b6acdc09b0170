//! HTTP protocol layer module
//!
//! Response builders and the JSON envelope, decoupled from the save logic.

pub mod envelope;
pub mod response;

// Re-export commonly used types
pub use envelope::ResponseEnvelope;
pub use response::{build_404_response, build_json_response};
