//! Request handler module
//!
//! Route table, request model, the per-route business logic and the dispatcher that
//! ties them to the error log.

mod dates;
pub mod endpoints;
pub mod error;
pub mod request;
pub mod router;
pub mod routes;

// Re-export main entry point
pub use endpoints::HandlerContext;
pub use error::HandlerError;
pub use request::WebhookRequest;
pub use router::{handle_request, Dispatcher};
pub use routes::{Route, RouteTable};
