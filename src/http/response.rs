//! HTTP response building module
//!
//! Builders for the few response shapes the router produces. Bodies are assembled
//! from chunks so a response can carry several upstream payloads back to back.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};

pub type HttpResponse = Response<Full<Bytes>>;

pub const TEXT_PLAIN: &str = "text/plain";
pub const APPLICATION_JSON: &str = "application/json";

/// Build a response with the given status, content type and body chunks
pub fn build_response<I, B>(status: StatusCode, content_type: &str, chunks: I) -> HttpResponse
where
    I: IntoIterator<Item = B>,
    B: AsRef<[u8]>,
{
    let mut body = Vec::new();
    for chunk in chunks {
        body.extend_from_slice(chunk.as_ref());
    }

    Response::builder()
        .status(status)
        .header("Content-Type", content_type)
        .body(Full::new(Bytes::from(body)))
        .unwrap_or_else(|e| {
            log_build_error(status, &e);
            let mut fallback = Response::new(Full::new(Bytes::new()));
            *fallback.status_mut() = status;
            fallback
        })
}

/// Build 200 `text/plain` response
pub fn build_text_response<I, B>(chunks: I) -> HttpResponse
where
    I: IntoIterator<Item = B>,
    B: AsRef<[u8]>,
{
    build_response(StatusCode::OK, TEXT_PLAIN, chunks)
}

/// Build 200 `application/json` response
pub fn build_json_response(json: String) -> HttpResponse {
    build_response(StatusCode::OK, APPLICATION_JSON, [json])
}

/// Build 404 Not Found response naming the requested path
pub fn build_404_response(path: &str) -> HttpResponse {
    build_response(
        StatusCode::NOT_FOUND,
        TEXT_PLAIN,
        [b"Not found\n".as_slice(), path.as_bytes()],
    )
}

/// Build 405 Method Not Allowed response for POST-only routes
pub fn build_405_response() -> HttpResponse {
    let mut response = build_response(
        StatusCode::METHOD_NOT_ALLOWED,
        TEXT_PLAIN,
        [b"POST only please".as_slice()],
    );
    response
        .headers_mut()
        .insert("Allow", hyper::header::HeaderValue::from_static("POST"));
    response
}

/// Build 500 response after a failure was written to the error log
pub fn build_500_logged_response() -> HttpResponse {
    build_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        TEXT_PLAIN,
        [b"Server error\n".as_slice(), b"Errors logged.".as_slice()],
    )
}

/// Build 500 response when the error log itself could not be written
///
/// Carries the logging failure, not the handler failure that triggered it.
pub fn build_500_logging_failed_response(logging_error: &str) -> HttpResponse {
    build_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        TEXT_PLAIN,
        [
            b"Server error\n".as_slice(),
            b"Problem logging error.\n".as_slice(),
            logging_error.as_bytes(),
        ],
    )
}

/// Log response build error
fn log_build_error(status: StatusCode, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
