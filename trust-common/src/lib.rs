//! # Trust Common Library
//!
//! Shared code for the trust scoring client crates including:
//! - Error taxonomy and the caller-visible error shape
//! - Domain error codes mirrored from the remote scoring service
//! - Validation finding types
//! - Client configuration (TOML)
//! - Tracing subscriber initialisation

pub mod codes;
pub mod config;
pub mod error;
pub mod findings;
pub mod logging;

pub use codes::ErrorCode;
pub use config::{ClientConfig, LoggingConfig};
pub use error::{Error, ErrorShape, Result, ValidationFailure};
pub use findings::ValidationFinding;
