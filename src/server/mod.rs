// Server module entry point
// Binds the dev server, runs the accept loop and stops it on request

pub mod connection;
pub mod listener;
pub mod signal;

// Rust does not allow `loop` as a module name (keyword), use server_loop instead
#[path = "loop.rs"]
pub mod server_loop;

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use crate::handler::Dispatcher;

pub use listener::create_listener;
pub use server_loop::start_server_loop;

/// A running server
pub struct ServerHandle {
    local_addr: SocketAddr,
    shutdown: Arc<Notify>,
    task: JoinHandle<()>,
}

impl ServerHandle {
    /// Address actually bound, with the real port when 0 was requested
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop accepting and wait for the listener to be released
    pub async fn shutdown(self) {
        self.shutdown.notify_one();
        if let Err(e) = self.task.await {
            crate::logger::log_error(&format!("Server loop ended abnormally: {e}"));
        }
    }
}

/// Bind `addr` and start serving in the background
pub fn start(addr: SocketAddr, dispatcher: Arc<Dispatcher>) -> std::io::Result<ServerHandle> {
    let listener = create_listener(addr)?;
    let local_addr = listener.local_addr()?;
    let shutdown = Arc::new(Notify::new());
    let task = tokio::spawn(start_server_loop(
        listener,
        dispatcher,
        Arc::clone(&shutdown),
    ));
    Ok(ServerHandle {
        local_addr,
        shutdown,
        task,
    })
}
