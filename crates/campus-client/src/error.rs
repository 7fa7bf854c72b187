//! The error shape every CMS call site receives.
//!
//! Transport failures, non-success statuses and malformed payloads all end
//! up as a [`CmsError`] with a numeric status, a human-readable message and
//! optional details from the CMS error payload.

use serde::Serialize;
use serde_json::Value;

use campus_core::NormalizeError;

/// Result type alias for CMS operations.
pub type CmsResult<T> = Result<T, CmsError>;

/// Message used when the CMS gives no usable explanation.
pub const FALLBACK_MESSAGE: &str = "Unexpected response from the content service";

/// Status reported for requests that never got a response.
pub const TRANSPORT_STATUS: u16 = 503;

/// Status reported for responses that could not be understood.
pub const MALFORMED_STATUS: u16 = 502;

/// Underlying cause of a [`CmsError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CmsErrorKind {
    /// Connection refused, timeout, DNS failure.
    Transport,
    /// The CMS answered with a non-2xx status.
    Status,
    /// The CMS answered 2xx with a body we could not shape.
    Malformed,
    /// The client could not be built from its configuration.
    Config,
}

/// Normalized CMS error.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[error("{message} (status {status})")]
pub struct CmsError {
    pub status: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    #[serde(skip)]
    pub kind: CmsErrorKind,
}

impl CmsError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status: TRANSPORT_STATUS,
            message: message.into(),
            details: None,
            kind: CmsErrorKind::Transport,
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self {
            status: MALFORMED_STATUS,
            message: message.into(),
            details: None,
            kind: CmsErrorKind::Malformed,
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self {
            status: 500,
            message: message.into(),
            details: None,
            kind: CmsErrorKind::Config,
        }
    }

    /// Builds the error for a non-success response from its raw body.
    ///
    /// Understands `{ error: { message, details } }`, `{ error: "..." }`
    /// and `{ message: "..." }`; anything else gets the fallback message.
    pub fn from_response(status: u16, body: &str) -> Self {
        let (message, details) = match serde_json::from_str::<Value>(body) {
            Ok(json) => extract_message(&json),
            Err(_) => (None, None),
        };

        Self {
            status,
            message: message.unwrap_or_else(|| FALLBACK_MESSAGE.to_string()),
            details,
            kind: CmsErrorKind::Status,
        }
    }

    /// Returns true for a 404 from the CMS.
    pub fn is_not_found(&self) -> bool {
        self.kind == CmsErrorKind::Status && self.status == 404
    }
}

fn extract_message(json: &Value) -> (Option<String>, Option<Value>) {
    let non_empty = |v: &Value| v.as_str().map(str::trim).filter(|s| !s.is_empty()).map(String::from);

    match json.get("error") {
        Some(Value::Object(error)) => {
            let message = error.get("message").and_then(non_empty);
            let details = error
                .get("details")
                .filter(|d| !is_empty_details(d))
                .cloned();
            (message, details)
        }
        Some(error @ Value::String(_)) => (non_empty(error), None),
        _ => (json.get("message").and_then(non_empty), None),
    }
}

fn is_empty_details(details: &Value) -> bool {
    match details {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

impl From<reqwest::Error> for CmsError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            return Self::malformed(format!("could not decode CMS response: {e}"));
        }
        match e.status() {
            Some(status) => Self::from_response(status.as_u16(), ""),
            None => Self::transport(format!("CMS request failed: {e}")),
        }
    }
}

impl From<NormalizeError> for CmsError {
    fn from(e: NormalizeError) -> Self {
        Self::malformed(e.to_string())
    }
}

impl From<serde_json::Error> for CmsError {
    fn from(e: serde_json::Error) -> Self {
        Self::malformed(format!("invalid JSON from CMS: {e}"))
    }
}
