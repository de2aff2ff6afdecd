//! Failures of calls against the IdentityHub backend.

use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, HubError>;

#[derive(Debug, Error)]
pub enum HubError {
    /// Non-2xx answer; `message` is the backend's own text when it sent one.
    #[error("backend answered {status}: {message}")]
    Http {
        status: StatusCode,
        code: Option<String>,
        message: String,
    },
    /// Session cookie or API key missing, expired or revoked.
    #[error("not signed in: {0}")]
    Authentication(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("backend did not answer in time: {0}")]
    Timeout(String),
    #[error("backend unreachable: {0}")]
    Network(String),
    #[error("unexpected response body: {0}")]
    Serialization(String),
    /// Rejected locally before any request was sent.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("{0}")]
    Other(String),
}

impl HubError {
    pub fn http(status: StatusCode, code: Option<String>, message: impl Into<String>) -> Self {
        HubError::Http {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, HubError::Authentication(_))
    }
}

impl From<reqwest::Error> for HubError {
    fn from(err: reqwest::Error) -> Self {
        let detail = err.to_string();
        match err.status() {
            _ if err.is_timeout() => HubError::Timeout(detail),
            Some(status) => HubError::http(status, None, detail),
            None if err.is_connect() => HubError::Network(detail),
            None if err.is_decode() => HubError::Serialization(detail),
            None => HubError::Other(detail),
        }
    }
}

impl From<serde_json::Error> for HubError {
    fn from(err: serde_json::Error) -> Self {
        HubError::Serialization(err.to_string())
    }
}
