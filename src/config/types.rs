// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub outbound: OutboundConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Console verbosity (error, warn, info, debug)
    pub level: String,
    /// Print one line per handled request
    pub access_log: bool,
    /// Directory holding the JSON error log and its rotated siblings
    pub dir: String,
    /// Name of the current error log file inside `dir`
    pub file_name: String,
}

/// Outbound notification configuration
#[derive(Debug, Deserialize, Clone)]
pub struct OutboundConfig {
    /// Base URL of the IFTTT Maker webhooks service
    pub base_url: String,
    /// Environment variable holding the webhook key, read on every call
    pub key_var: String,
}
