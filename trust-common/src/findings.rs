//! Validation findings produced by the request validator

use crate::codes::ErrorCode;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One result of a validation pass
///
/// Errors block submission and always carry a domain code. Warnings are
/// advisory and never block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "severity", rename_all = "lowercase")]
pub enum ValidationFinding {
    Error {
        code: ErrorCode,
        /// Dotted path of the offending field (e.g. `billing.address`)
        field: String,
        message: String,
    },
    Warning {
        field: String,
        message: String,
    },
}

impl ValidationFinding {
    pub fn error(code: ErrorCode, field: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationFinding::Error {
            code,
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn warning(field: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationFinding::Warning {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ValidationFinding::Error { .. })
    }

    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            ValidationFinding::Error { code, .. } => Some(*code),
            ValidationFinding::Warning { .. } => None,
        }
    }

    pub fn field(&self) -> &str {
        match self {
            ValidationFinding::Error { field, .. } | ValidationFinding::Warning { field, .. } => {
                field
            }
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ValidationFinding::Error { message, .. }
            | ValidationFinding::Warning { message, .. } => message,
        }
    }
}

impl fmt::Display for ValidationFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationFinding::Error {
                code,
                field,
                message,
            } => write!(f, "[{}] {}: {}", code, field, message),
            ValidationFinding::Warning { field, message } => write!(f, "{}: {}", field, message),
        }
    }
}
