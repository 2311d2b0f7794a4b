// Connection handling module
// Serves a single accepted TCP connection

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::sync::Arc;

use crate::handler::{self, Dispatcher};
use crate::logger;

/// Serve one connection in a spawned task.
///
/// HTTP/1.1 with keep-alive. No read or write timeout is applied: a slow upstream
/// call only holds up the connection that is waiting on it.
pub fn handle_connection(stream: tokio::net::TcpStream, dispatcher: Arc<Dispatcher>) {
    tokio::spawn(async move {
        let io = TokioIo::new(stream);

        let mut builder = http1::Builder::new();
        builder.keep_alive(true);

        let conn = builder.serve_connection(
            io,
            service_fn(move |req| handler::handle_request(req, Arc::clone(&dispatcher))),
        );

        if let Err(err) = conn.await {
            logger::log_connection_error(&err);
        }
    });
}
