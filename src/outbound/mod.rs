//! Outbound notifications
//!
//! Handlers hand a small JSON payload to a [`Notifier`], which triggers a named event
//! on the IFTTT Maker webhooks service and returns whatever body the service answered
//! with. Calls are made once: no retries, no timeout.

use async_trait::async_trait;
use hyper::body::Bytes;
use serde::Serialize;
use thiserror::Error;

use crate::config::OutboundConfig;

#[derive(Debug, Error)]
pub enum OutboundError {
    #[error("Webhook key not set: environment variable {0} is missing")]
    MissingKey(String),

    #[error("Webhook request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Event payload, IFTTT accepts up to three positional values
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventPayload {
    pub value1: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value2: Option<String>,
}

impl EventPayload {
    pub fn new(value1: impl Into<String>) -> Self {
        Self {
            value1: value1.into(),
            value2: None,
        }
    }

    #[must_use]
    pub fn with_value2(mut self, value2: impl Into<String>) -> Self {
        self.value2 = Some(value2.into());
        self
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Trigger `event` with `payload`, returning the upstream response body
    async fn trigger(&self, event: &str, payload: &EventPayload) -> Result<Bytes, OutboundError>;
}

/// IFTTT Maker webhooks client
#[derive(Debug, Clone)]
pub struct IftttClient {
    http: reqwest::Client,
    base_url: String,
    key_var: String,
}

impl IftttClient {
    pub fn new(base_url: &str, key_var: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            key_var: key_var.to_string(),
        }
    }

    pub fn from_config(config: &OutboundConfig) -> Self {
        Self::new(&config.base_url, &config.key_var)
    }

    /// The key is read on every call so a rotated secret is picked up without restart
    fn key(&self) -> Result<String, OutboundError> {
        std::env::var(&self.key_var).map_err(|_| OutboundError::MissingKey(self.key_var.clone()))
    }

    pub fn trigger_url(&self, event: &str, key: &str) -> String {
        format!("{}/trigger/{event}/with/key/{key}", self.base_url)
    }
}

#[async_trait]
impl Notifier for IftttClient {
    async fn trigger(&self, event: &str, payload: &EventPayload) -> Result<Bytes, OutboundError> {
        let url = self.trigger_url(event, &self.key()?);
        crate::logger::log_debug(&format!("Triggering IFTTT event {event}"));
        let response = self
            .http
            .post(url)
            .json(payload)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.bytes().await?)
    }
}
