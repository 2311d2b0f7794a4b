//! Logger module
//!
//! Provides logging utilities for the webhook router:
//! - Console lifecycle and access logging, filtered by the configured level
//! - JSON-lines error log with daily rotation (see [`ErrorLogger`])

pub mod error_log;
pub mod format;
pub mod writer;

pub use error_log::{ErrorLogger, LogError};
pub use format::{ExceptionInfo, JsonFormatter, Level, LogRecord};

use crate::config::Config;
use std::net::SocketAddr;
use std::sync::OnceLock;

/// Console verbosity, fixed at startup
static CONSOLE_LEVEL: OnceLock<Level> = OnceLock::new();

/// Initialize console logging with the configured level
///
/// Should be called once at application startup. Unknown level names fall back to
/// `info`; later calls are ignored.
pub fn init(config: &Config) {
    let level = Level::parse(&config.logging.level).unwrap_or(Level::Info);
    let _ = CONSOLE_LEVEL.set(level);
    if Level::parse(&config.logging.level).is_none() {
        log_warning(&format!(
            "Unknown log level '{}', using info",
            config.logging.level
        ));
    }
}

fn enabled(level: Level) -> bool {
    level >= *CONSOLE_LEVEL.get().unwrap_or(&Level::Info)
}

/// Write to info log
fn write_info(message: &str) {
    if enabled(Level::Info) {
        println!("{message}");
    }
}

/// Write to error log
fn write_error(level: Level, message: &str) {
    if enabled(level) {
        eprintln!("{message}");
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    write_info("======================================");
    write_info(&format!("Started on port {}", addr.port()));
    write_info(&format!("Listening on: http://{addr}"));
    write_info(&format!("Log level: {}", config.logging.level));
    write_info(&format!("Error log: {}", config.log_file_path().display()));
    write_info("======================================\n");
}

pub fn log_dotenv_loaded(count: usize) {
    write_info(&format!("[Config] Loaded {count} variables from .env"));
}

pub fn log_request(method: &str, path: &str, status: u16) {
    write_info(&format!("[Request] {method} {path} - {status}"));
}

pub fn log_handler_failure(correlation_key: &str, error: &dyn std::fmt::Display) {
    write_error(Level::Error, &format!("[ERROR] {correlation_key}: {error}"));
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write_error(
        Level::Error,
        &format!("[ERROR] Failed to serve connection: {err:?}"),
    );
}

pub fn log_error(message: &str) {
    write_error(Level::Error, &format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_error(Level::Warning, &format!("[WARN] {message}"));
}

pub fn log_debug(message: &str) {
    if enabled(Level::Debug) {
        println!("[DEBUG] {message}");
    }
}

pub fn log_shutdown_started() {
    write_info("Stopping");
}

pub fn log_shutdown_complete() {
    write_info("Stopped");
}
