// Configuration module entry point
// Loads the layered server configuration and the optional .env file

pub mod dotenv;
mod types;

use std::net::SocketAddr;
use std::path::PathBuf;

pub use types::{Config, LoggingConfig, OutboundConfig, ServerConfig};

impl Config {
    /// Load configuration from specified file path (without extension)
    /// The file is optional; defaults and `WEBHOOKS__*` variables fill the rest
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::Environment::with_prefix("WEBHOOKS").separator("__"))
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8000)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.dir", "logs")?
            .set_default("logging.file_name", "webhooks.log")?
            .set_default("outbound.base_url", "https://maker.ifttt.com")?
            .set_default("outbound.key_var", "IFTTT_WEBHOOK_KEY")?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }

    /// Full path of the current (unrotated) error log file
    pub fn log_file_path(&self) -> PathBuf {
        PathBuf::from(&self.logging.dir).join(&self.logging.file_name)
    }
}
