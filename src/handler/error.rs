//! Handler failures
//!
//! Every way a handler can fail. None of these become a tailored response: the
//! dispatcher logs them and answers with a uniform 500.

use std::path::PathBuf;
use thiserror::Error;

use crate::outbound::OutboundError;

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("Request has no Content-Length header")]
    MissingContentLength,

    #[error("Invalid Content-Length header: {0:?}")]
    InvalidContentLength(String),

    #[error("Failed to read request body: {0}")]
    Body(#[from] hyper::Error),

    #[error("Request body is not valid JSON for this route: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Request body is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    #[error("Invalid {field} {value:?}: {source}")]
    InvalidDate {
        field: &'static str,
        value: String,
        source: chrono::ParseError,
    },

    #[error("Unknown user handle {0:?}")]
    UnknownUser(String),

    #[error("Failed to read log file {}: {source}", path.display())]
    LogFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Outbound(#[from] OutboundError),

    #[error("Deliberate failure from the error diagnostics route")]
    Deliberate,
}

impl HandlerError {
    /// Short type name recorded as `exc_type` in the error log
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::MissingContentLength => "MissingContentLength",
            Self::InvalidContentLength(_) => "InvalidContentLength",
            Self::Body(_) => "Body",
            Self::InvalidJson(_) => "InvalidJson",
            Self::InvalidUtf8(_) => "InvalidUtf8",
            Self::InvalidDate { .. } => "InvalidDate",
            Self::UnknownUser(_) => "UnknownUser",
            Self::LogFile { .. } => "LogFile",
            Self::Outbound(OutboundError::MissingKey(_)) => "MissingKey",
            Self::Outbound(OutboundError::Request(_)) => "OutboundRequest",
            Self::Deliberate => "Deliberate",
        }
    }
}
