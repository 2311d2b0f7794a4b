//! Inbound request model
//!
//! The hyper request is read once into an immutable [`WebhookRequest`] so handlers can
//! be called (and tested) without a live connection.

use http_body_util::BodyExt;
use hyper::body::{Bytes, Incoming};
use hyper::{HeaderMap, Method, Request};
use serde::de::DeserializeOwned;

use super::error::HandlerError;
use crate::http::{parse_query, QueryParams};

#[derive(Debug, Clone)]
pub struct WebhookRequest {
    pub method: Method,
    pub path: String,
    /// Raw query string, without the leading `?`
    pub query: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl WebhookRequest {
    pub fn new(method: Method, path: &str) -> Self {
        Self {
            method,
            path: path.to_string(),
            query: String::new(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    #[must_use]
    pub fn with_query(mut self, query: &str) -> Self {
        self.query = query.to_string();
        self
    }

    /// Attach a body along with a matching `Content-Length` header
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self.headers
            .insert(hyper::header::CONTENT_LENGTH, self.body.len().into());
        self
    }

    /// Read the whole hyper request, body included
    pub async fn from_hyper(req: Request<Incoming>) -> Result<Self, HandlerError> {
        let (parts, body) = req.into_parts();
        let body = body.collect().await?.to_bytes();
        Ok(Self {
            path: parts.uri.path().to_string(),
            query: parts.uri.query().unwrap_or_default().to_string(),
            method: parts.method,
            headers: parts.headers,
            body,
        })
    }

    pub fn query_params(&self) -> QueryParams {
        parse_query(&self.query)
    }

    /// Declared body length; a body-reading route cannot do without it
    pub fn content_length(&self) -> Result<usize, HandlerError> {
        let value = self
            .headers
            .get(hyper::header::CONTENT_LENGTH)
            .ok_or(HandlerError::MissingContentLength)?;
        let text = value
            .to_str()
            .map_err(|_| HandlerError::InvalidContentLength(format!("{value:?}")))?;
        text.trim()
            .parse()
            .map_err(|_| HandlerError::InvalidContentLength(text.to_string()))
    }

    /// Body bytes up to the declared `Content-Length`
    pub fn read_body(&self) -> Result<Bytes, HandlerError> {
        let len = self.content_length()?.min(self.body.len());
        Ok(self.body.slice(..len))
    }

    pub fn read_text(&self) -> Result<String, HandlerError> {
        Ok(String::from_utf8(self.read_body()?.to_vec())?)
    }

    pub fn json_body<T: DeserializeOwned>(&self) -> Result<T, HandlerError> {
        Ok(serde_json::from_slice(&self.read_body()?)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Payload {
        name: String,
    }

    #[test]
    fn test_body_is_cut_at_content_length() {
        let mut req = WebhookRequest::new(Method::POST, "/v1/debug").with_body("hello world");
        req.headers
            .insert(hyper::header::CONTENT_LENGTH, 5_usize.into());
        assert_eq!(req.read_body().unwrap(), Bytes::from_static(b"hello"));
    }

    #[test]
    fn test_missing_content_length() {
        let mut req = WebhookRequest::new(Method::POST, "/v1/debug").with_body("x");
        req.headers.clear();
        assert!(matches!(
            req.read_body(),
            Err(HandlerError::MissingContentLength)
        ));
    }

    #[test]
    fn test_invalid_content_length() {
        let mut req = WebhookRequest::new(Method::POST, "/v1/debug").with_body("x");
        req.headers.insert(
            hyper::header::CONTENT_LENGTH,
            hyper::header::HeaderValue::from_static("lots"),
        );
        assert!(matches!(
            req.read_body(),
            Err(HandlerError::InvalidContentLength(v)) if v == "lots"
        ));
    }

    #[test]
    fn test_json_body_missing_field_fails() {
        let req = WebhookRequest::new(Method::POST, "/x").with_body(r#"{"other": 1}"#);
        assert!(matches!(
            req.json_body::<Payload>(),
            Err(HandlerError::InvalidJson(_))
        ));

        let req = WebhookRequest::new(Method::POST, "/x").with_body(r#"{"name": "n"}"#);
        assert_eq!(req.json_body::<Payload>().unwrap().name, "n");
    }

    #[test]
    fn test_query_params() {
        let req = WebhookRequest::new(Method::GET, "/v1/debug").with_query("hey=yo&hey=there");
        assert_eq!(req.query_params()["hey"], vec!["yo", "there"]);
    }
}
