//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: route lookup, handler invocation, and the
//! uniform failure contract. Unknown paths answer 404. A failing handler is recorded
//! in the error log under `"<path> - <method>"` and answered with a 500; if the log
//! itself cannot be written the 500 carries the logging error instead.

use hyper::body::Incoming;
use hyper::{Method, Request};
use std::convert::Infallible;
use std::sync::Arc;

use super::endpoints::{self, HandlerContext};
use super::error::HandlerError;
use super::request::WebhookRequest;
use super::routes::RouteTable;
use crate::http::{self, HttpResponse};
use crate::logger::{self, ErrorLogger, ExceptionInfo};

/// Correlation key written as the message of every failure record
pub fn correlation_key(path: &str, method: &Method) -> String {
    format!("{path} - {method}")
}

pub struct Dispatcher {
    routes: RouteTable,
    context: HandlerContext,
    error_logger: Arc<ErrorLogger>,
    access_log: bool,
}

impl Dispatcher {
    pub fn new(context: HandlerContext, error_logger: Arc<ErrorLogger>) -> Self {
        Self {
            routes: RouteTable::new(),
            context,
            error_logger,
            access_log: false,
        }
    }

    #[must_use]
    pub const fn with_access_log(mut self, enabled: bool) -> Self {
        self.access_log = enabled;
        self
    }

    /// Answer an already-read request
    pub async fn dispatch(&self, req: &WebhookRequest) -> HttpResponse {
        let response = match self.routes.lookup(&req.path) {
            None => http::build_404_response(&req.path),
            Some(route) => match endpoints::handle(route, &self.context, req).await {
                Ok(response) => response,
                Err(err) => self.failure_response(&req.path, &req.method, &err),
            },
        };
        self.log_access(&req.method, &req.path, &response);
        response
    }

    /// Answer a live hyper request
    ///
    /// The body is only read once the path is known to be served.
    pub async fn handle_incoming(&self, req: Request<Incoming>) -> HttpResponse {
        let method = req.method().clone();
        let path = req.uri().path().to_string();

        if self.routes.lookup(&path).is_none() {
            let response = http::build_404_response(&path);
            self.log_access(&method, &path, &response);
            return response;
        }

        match WebhookRequest::from_hyper(req).await {
            Ok(req) => self.dispatch(&req).await,
            Err(err) => {
                let response = self.failure_response(&path, &method, &err);
                self.log_access(&method, &path, &response);
                response
            }
        }
    }

    fn failure_response(&self, path: &str, method: &Method, err: &HandlerError) -> HttpResponse {
        let key = correlation_key(path, method);
        logger::log_handler_failure(&key, err);

        let exception = ExceptionInfo::from_error(err.type_name(), err);
        match self.error_logger.record_failure(&key, exception) {
            Ok(()) => http::build_500_logged_response(),
            Err(log_err) => {
                logger::log_error(&format!("Failed to write error log: {log_err}"));
                http::build_500_logging_failed_response(&log_err.to_string())
            }
        }
    }

    fn log_access(&self, method: &Method, path: &str, response: &HttpResponse) {
        if self.access_log {
            logger::log_request(method.as_str(), path, response.status().as_u16());
        }
    }
}

/// hyper service entry point
pub async fn handle_request(
    req: Request<Incoming>,
    dispatcher: Arc<Dispatcher>,
) -> Result<HttpResponse, Infallible> {
    Ok(dispatcher.handle_incoming(req).await)
}
