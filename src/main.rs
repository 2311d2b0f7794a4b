use clap::Parser;
use std::path::Path;
use std::sync::Arc;

mod config;
mod handler;
mod http;
mod logger;
mod outbound;
mod server;

use config::dotenv::{self, DotEnvError};
use handler::{Dispatcher, HandlerContext};
use logger::ErrorLogger;
use outbound::IftttClient;

/// Local development server for the webhook router
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Port to listen on, overrides the configured one
    port: Option<u16>,

    /// Configuration file, without extension
    #[arg(long, default_value = "config")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Variables from .env must be visible before the config layer reads the environment
    load_dotenv(Path::new(".env"));

    let mut cfg = config::Config::load_from(&args.config)?;
    if let Some(port) = args.port {
        cfg.server.port = port;
    }
    logger::init(&cfg);

    let addr = cfg.get_socket_addr()?;
    let error_logger = Arc::new(ErrorLogger::from_config(&cfg.logging));
    let context = HandlerContext::new(
        Arc::new(IftttClient::from_config(&cfg.outbound)),
        error_logger.current_log_path(),
    );
    let dispatcher =
        Arc::new(Dispatcher::new(context, error_logger).with_access_log(cfg.logging.access_log));

    let server = server::start(addr, dispatcher)?;
    logger::log_server_start(&server.local_addr(), &cfg);

    server::signal::wait_for_shutdown().await?;
    logger::log_shutdown_started();
    server.shutdown().await;
    logger::log_shutdown_complete();
    Ok(())
}

/// A missing file is normal; a malformed one is reported and skipped
fn load_dotenv(path: &Path) {
    match dotenv::load(path) {
        Ok(count) => logger::log_dotenv_loaded(count),
        Err(DotEnvError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => logger::log_warning(&format!("Ignoring {}: {e}", path.display())),
    }
}
