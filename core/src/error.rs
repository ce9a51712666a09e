//! Error types for the fleet API client.
//!
//! # Design
//! Every failure of a call surfaces as one `RequestError`. The variants fall
//! into two families: transport failures (the request never produced a
//! response: connection errors and timeouts) and application failures (a
//! response arrived but was unusable: non-2xx statuses, undecodable bodies,
//! unrecognized shapes). `kind()` reports the family so the presentation
//! layer can choose wording without matching on every variant.

use std::fmt;

use serde_json::Value;
use thiserror::Error;

/// Body attached to an application error: parsed JSON when the server sent
/// valid JSON, the raw text otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorPayload {
    Json(Value),
    Text(String),
}

impl ErrorPayload {
    /// Parse `text` as JSON, keeping the raw text when parsing fails.
    /// Returns `None` only for a zero-length body.
    pub fn from_body(text: &str) -> Option<Self> {
        if text.is_empty() {
            return None;
        }
        Some(match serde_json::from_str(text) {
            Ok(value) => ErrorPayload::Json(value),
            Err(_) => ErrorPayload::Text(text.to_string()),
        })
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ErrorPayload::Json(value) => Some(value),
            ErrorPayload::Text(_) => None,
        }
    }
}

impl fmt::Display for ErrorPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorPayload::Json(value) => write!(f, "{value}"),
            ErrorPayload::Text(text) => f.write_str(text),
        }
    }
}

/// Failure family of a `RequestError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    Application,
}

/// Errors returned by the request pipeline and the typed client methods.
#[derive(Debug, Clone, Error)]
pub enum RequestError {
    /// The network call failed before a response arrived.
    #[error("transport failure: {message}")]
    Transport { message: String },

    /// The call was aborted because the timeout elapsed first.
    #[error("request timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {message}")]
    Application {
        message: String,
        status: u16,
        payload: Option<ErrorPayload>,
    },

    /// A 2xx body could not be decoded into the expected type.
    #[error("could not decode response: {message}")]
    Decode { message: String, status: u16 },

    /// A 2xx body decoded as JSON but matched no recognized shape.
    #[error("unrecognized response shape: {message}")]
    UnexpectedShape {
        message: String,
        status: u16,
        payload: Value,
    },

    /// The request payload could not be serialized to JSON.
    #[error("could not serialize request body: {0}")]
    Serialization(String),
}

impl RequestError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RequestError::Transport { .. } | RequestError::Timeout { .. } => ErrorKind::Transport,
            RequestError::Application { .. }
            | RequestError::Decode { .. }
            | RequestError::UnexpectedShape { .. }
            | RequestError::Serialization(_) => ErrorKind::Application,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, RequestError::Timeout { .. })
    }

    /// Human-readable message without the variant prefix.
    pub fn message(&self) -> String {
        match self {
            RequestError::Transport { message }
            | RequestError::Application { message, .. }
            | RequestError::Decode { message, .. }
            | RequestError::UnexpectedShape { message, .. }
            | RequestError::Serialization(message) => message.clone(),
            RequestError::Timeout { timeout_ms } => format!("timed out after {timeout_ms} ms"),
        }
    }

    /// HTTP status of the response, when one arrived.
    pub fn status(&self) -> Option<u16> {
        match self {
            RequestError::Application { status, .. }
            | RequestError::Decode { status, .. }
            | RequestError::UnexpectedShape { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn payload(&self) -> Option<ErrorPayload> {
        match self {
            RequestError::Application { payload, .. } => payload.clone(),
            RequestError::UnexpectedShape { payload, .. } => Some(ErrorPayload::Json(payload.clone())),
            _ => None,
        }
    }
}
