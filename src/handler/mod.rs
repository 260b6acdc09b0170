//! Request handler module
//!
//! Routes each request either to the save-config handler or to a bare 404.

pub mod router;
pub mod save;

// Re-export main entry point
pub use router::handle_request;
