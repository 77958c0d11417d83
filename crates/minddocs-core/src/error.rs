//! Error taxonomy shared by every page of the client.
//!
//! Validation errors never reach the network. Network, server and stream
//! errors come back from the API client and are turned into banner text by
//! the page that issued the request.

use serde::Deserialize;
use serde_json::Value;

pub type Result<T, E = ApiError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("server returned {status}{}", detail_suffix(.detail))]
    Server { status: u16, detail: Option<String> },
    #[error("stream interrupted: {0}")]
    Stream(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not decode response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("could not build report: {0}")]
    Report(String),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    /// HTTP status of a server-reported error.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// Text for the page's error banner: the backend's own message when it
    /// sent one, the validation message for local errors, otherwise `fallback`.
    pub fn banner(&self, fallback: &str) -> String {
        match self {
            ApiError::Validation(message) => message.clone(),
            ApiError::Server {
                detail: Some(detail),
                ..
            } => detail.clone(),
            _ => fallback.to_string(),
        }
    }
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail.as_deref().map(|d| format!(": {d}")).unwrap_or_default()
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: Value,
}

/// Pull the human readable message out of a backend error payload.
///
/// The backend answers with `{"detail": "..."}` for handled errors and with
/// `{"detail": [{"msg": "..."}, ...]}` when request validation fails.
pub(crate) fn detail_from_body(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    match parsed.detail {
        Value::String(s) if !s.trim().is_empty() => Some(s),
        Value::Array(items) => items
            .iter()
            .find_map(|item| item.get("msg").and_then(Value::as_str))
            .map(str::to_string),
        _ => None,
    }
}
