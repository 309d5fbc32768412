//! Domain error codes
//!
//! Local validation reports the same codes the remote service uses when it
//! rejects a request, so callers can handle both sources uniformly.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error code carried by every validation error and every failure shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorCode {
    /// No action supplied
    ActionRequired,
    /// Action present but not an object with a non-empty `type`
    InvalidAction,
    /// A required field or group is missing
    MissingRequiredField,
    /// Feedback batch above the per-call ceiling
    TooManyFeedbacks,
    InvalidName,
    InvalidEmail,
    InvalidPhone,
    InvalidAddress,
    /// Address carries none of the locating keys
    PartialAddress,
    InvalidIp,
    InvalidGender,
    /// Field holds a value of the wrong JSON shape
    InvalidField,
    RateLimitExceeded,
    Timeout,
    NetworkError,
    TransportError,
    InvalidResponse,
    Cancelled,
    ConfigError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ActionRequired => "action-required",
            ErrorCode::InvalidAction => "invalid-action",
            ErrorCode::MissingRequiredField => "missing-required-field",
            ErrorCode::TooManyFeedbacks => "too-many-feedbacks",
            ErrorCode::InvalidName => "invalid-name",
            ErrorCode::InvalidEmail => "invalid-email",
            ErrorCode::InvalidPhone => "invalid-phone",
            ErrorCode::InvalidAddress => "invalid-address",
            ErrorCode::PartialAddress => "partial-address",
            ErrorCode::InvalidIp => "invalid-ip",
            ErrorCode::InvalidGender => "invalid-gender",
            ErrorCode::InvalidField => "invalid-field",
            ErrorCode::RateLimitExceeded => "rate-limit-exceeded",
            ErrorCode::Timeout => "timeout",
            ErrorCode::NetworkError => "network-error",
            ErrorCode::TransportError => "transport-error",
            ErrorCode::InvalidResponse => "invalid-response",
            ErrorCode::Cancelled => "cancelled",
            ErrorCode::ConfigError => "config-error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
