//! Common error types for the trust scoring client

use crate::codes::ErrorCode;
use crate::findings::ValidationFinding;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Common result type for trust client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Terminal failure kinds surfaced by the scoring client
///
/// Retries happen below this type: by the time an `Error` reaches the caller
/// every retry budget has already been spent.
#[derive(Error, Debug)]
pub enum Error {
    /// Local pre-flight validation rejected the request (never sent)
    #[error("Validation failed: {0}")]
    Validation(ValidationFailure),

    /// HTTP 429 persisted through every retry
    #[error("Rate limit exceeded after {attempts} attempts")]
    RateLimitExceeded { attempts: u32 },

    /// A single exchange exceeded its deadline (never retried)
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Connection-level fault persisted through every retry
    #[error("Network error: {0}")]
    Network(String),

    /// HTTP error status from the remote service
    #[error("API error {status}: {message}")]
    Transport {
        status: u16,
        message: String,
        payload: Option<serde_json::Value>,
    },

    /// Business rejection inside an otherwise successful response
    #[error("Remote rejected request: {message}")]
    Domain {
        message: String,
        code: Option<String>,
        status: u16,
    },

    /// Response body could not be decoded
    #[error("Invalid response: {0}")]
    Decode(String),

    /// Caller cancelled while the call was waiting
    #[error("Request cancelled")]
    Cancelled,

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Domain code for this failure
    pub fn code(&self) -> Option<String> {
        match self {
            Error::Validation(failure) => failure.code().map(|c| c.as_str().to_string()),
            Error::RateLimitExceeded { .. } => Some(ErrorCode::RateLimitExceeded.to_string()),
            Error::Timeout(_) => Some(ErrorCode::Timeout.to_string()),
            Error::Network(_) => Some(ErrorCode::NetworkError.to_string()),
            Error::Transport { payload, .. } => payload
                .as_ref()
                .and_then(remote_error_code)
                .or_else(|| Some(ErrorCode::TransportError.to_string())),
            Error::Domain { code, .. } => code.clone(),
            Error::Decode(_) => Some(ErrorCode::InvalidResponse.to_string()),
            Error::Cancelled => Some(ErrorCode::Cancelled.to_string()),
            Error::Config(_) => Some(ErrorCode::ConfigError.to_string()),
        }
    }

    /// HTTP status associated with this failure, if any
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Error::RateLimitExceeded { .. } => Some(429),
            Error::Transport { status, .. } | Error::Domain { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether this error was produced locally without reaching the network
    pub fn is_local(&self) -> bool {
        matches!(self, Error::Validation(_) | Error::Config(_))
    }

    /// Uniform three-field shape handed to callers
    pub fn to_shape(&self) -> ErrorShape {
        let message = match self {
            Error::Domain { message, .. } => message.clone(),
            other => other.to_string(),
        };

        ErrorShape {
            message,
            code: self.code(),
            http_status: self.http_status(),
        }
    }
}

/// Extract `error.code` from a remote payload, numeric or string
pub fn remote_error_code(payload: &serde_json::Value) -> Option<String> {
    match payload.get("error")?.get("code")? {
        serde_json::Value::String(code) => Some(code.clone()),
        serde_json::Value::Number(code) => Some(code.to_string()),
        _ => None,
    }
}

/// Extract `error.message` from a remote payload
pub fn remote_error_message(payload: &serde_json::Value) -> Option<String> {
    payload
        .get("error")?
        .get("message")?
        .as_str()
        .map(str::to_string)
}

/// Caller-visible error shape, identical for every failure kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorShape {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(rename = "httpStatus", skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
}

impl From<&Error> for ErrorShape {
    fn from(err: &Error) -> Self {
        err.to_shape()
    }
}

/// Complete findings of a failed validation pass
///
/// Callers receive every error (and the advisory warnings), not only the
/// first failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationFailure {
    pub errors: Vec<ValidationFinding>,
    pub warnings: Vec<ValidationFinding>,
}

impl ValidationFailure {
    /// Failure with a single error finding
    pub fn single(code: ErrorCode, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            errors: vec![ValidationFinding::error(code, field, message)],
            warnings: Vec::new(),
        }
    }

    /// Code of the first error
    pub fn code(&self) -> Option<ErrorCode> {
        self.errors.iter().find_map(ValidationFinding::code)
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.errors.iter().map(|e| e.to_string()).collect();
        write!(f, "{} error(s): {}", self.errors.len(), messages.join("; "))
    }
}

impl From<ValidationFailure> for Error {
    fn from(failure: ValidationFailure) -> Self {
        Error::Validation(failure)
    }
}
