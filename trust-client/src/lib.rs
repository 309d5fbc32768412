//! trust-client library
//!
//! Turns loosely-structured caller input into a canonical scoring request,
//! validates it locally against the remote contract, and delivers it under
//! rate control with bounded retry.
//!
//! Pipeline: input → [`canonical::canonicalize`] → [`validation::RequestValidator`]
//! → [`rate_limiter::RateLimiter`] → [`transport::Transport`] → remote service.

pub mod canonical;
pub mod client;
pub mod fields;
pub mod normalize;
pub mod observer;
pub mod rate_limiter;
pub mod sanitize;
pub mod transport;
pub mod types;
pub mod validation;

pub use canonical::{canonicalize, Action, CanonicalRequest, QueryFlags};
pub use client::{ScoringClient, MAX_FEEDBACKS_PER_CALL};
pub use fields::{FieldKind, GroupKind};
pub use observer::{CallEvent, CallObserver, Operation, RetryReason, TracingObserver};
pub use transport::RetryPolicy;
pub use types::{Decision, FeedbackReceipt, FeedbackResponse, ScoreResponse};
pub use validation::{RequestValidator, ValidationReport};

pub use trust_common::{ClientConfig, Error, ErrorCode, ErrorShape, Result, ValidationFinding};
