//! Logger module
//!
//! Provides logging utilities for the server including:
//! - Startup/shutdown banners
//! - Access logging in `combined`, `common` or `json` format
//! - Leveled error/warning/info/debug lines
//! - File-based logging support

mod format;
pub mod writer;

pub use format::{http_version_label, AccessLogEntry};
pub use writer::Level;

use crate::config::Config;
use std::net::SocketAddr;
use std::path::Path;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    let level = config
        .logging
        .level
        .parse::<Level>()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    writer::init(
        level,
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

/// Level threshold before `init()` runs (and in tests)
const DEFAULT_LEVEL: Level = Level::Info;

fn enabled(level: Level) -> bool {
    let threshold = writer::get().map_or(DEFAULT_LEVEL, writer::LogWriter::level);
    level <= threshold
}

/// Write to info/access log, bypassing the level filter
fn write_info(message: &str) {
    match writer::get() {
        Some(w) => w.write_info(message),
        None => println!("{message}"),
    }
}

/// Write to error log
fn write_error(message: &str) {
    match writer::get() {
        Some(w) => w.write_error(message),
        None => eprintln!("{message}"),
    }
}

/// Write to access log specifically
fn write_access(message: &str) {
    match writer::get() {
        Some(w) => w.write_access(message),
        None => println!("{message}"),
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config, config_file: &Path) {
    // Always printed, whatever the level
    write_info(&format!("Starting server at http://localhost:{}", addr.port()));
    if !enabled(Level::Info) {
        return;
    }
    write_info(&format!("Listening on: {addr}"));
    write_info(&format!("Config file: {}", config_file.display()));
    if config.storage.atomic_writes {
        write_info("Config writes: atomic (temp file + rename)");
    }
    write_info(&format!("Max body size: {} bytes", config.http.max_body_size));
    write_info(&format!("Log level: {}", config.logging.level));
    if let Some(ref path) = config.logging.access_log_file {
        write_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(&format!("Error log: {path}"));
    }
}

pub fn log_shutdown() {
    log_info("[Shutdown] Listener closed, exiting");
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    log_debug(&format!("[Connection] Accepted from: {peer_addr}"));
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    log_error(&format!("Failed to serve connection: {err:?}"));
}

pub fn log_error(message: &str) {
    if enabled(Level::Error) {
        write_error(&format!("[ERROR] {message}"));
    }
}

pub fn log_warning(message: &str) {
    if enabled(Level::Warn) {
        write_error(&format!("[WARN] {message}"));
    }
}

pub fn log_info(message: &str) {
    if enabled(Level::Info) {
        write_info(&format!("[INFO] {message}"));
    }
}

pub fn log_debug(message: &str) {
    if enabled(Level::Debug) {
        write_info(&format!("[DEBUG] {message}"));
    }
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    write_access(&entry.format(format));
}
