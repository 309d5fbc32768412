//! Observability hook
//!
//! Every attempt, retry, outcome and domain error of a call is reported to a
//! [`CallObserver`]. The default [`TracingObserver`] turns events into
//! `tracing` records; embedders can plug in metrics or audit sinks instead.

use std::fmt;
use std::time::Duration;
use trust_common::ErrorShape;
use uuid::Uuid;

/// Remote operation a call performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Score,
    Feedback,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Score => "score",
            Operation::Feedback => "feedback",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why an attempt is being retried
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryReason {
    /// HTTP 429
    RateLimited,
    /// HTTP 5xx
    ServerError(u16),
    /// Connection-level fault
    Network(String),
}

impl fmt::Display for RetryReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetryReason::RateLimited => write!(f, "rate limited (429)"),
            RetryReason::ServerError(status) => write!(f, "server error ({})", status),
            RetryReason::Network(msg) => write!(f, "network fault: {}", msg),
        }
    }
}

/// Lifecycle events of one call
#[derive(Debug, Clone, PartialEq)]
pub enum CallEvent {
    /// A network attempt is starting
    Attempt {
        call_id: Uuid,
        operation: Operation,
        attempt: u32,
    },
    /// An attempt failed transiently; the next one starts after `delay`
    Retry {
        call_id: Uuid,
        operation: Operation,
        attempt: u32,
        delay: Duration,
        reason: RetryReason,
    },
    /// The call produced a response
    Succeeded {
        call_id: Uuid,
        operation: Operation,
        attempts: u32,
        elapsed: Duration,
    },
    /// The remote service rejected the request inside a 2xx response
    DomainError {
        call_id: Uuid,
        operation: Operation,
        message: String,
        code: Option<String>,
    },
    /// The call failed terminally; may follow `Succeeded` when the body
    /// does not match the typed response
    Failed {
        call_id: Uuid,
        operation: Operation,
        attempts: u32,
        error: ErrorShape,
    },
}

impl CallEvent {
    pub fn call_id(&self) -> Uuid {
        match self {
            CallEvent::Attempt { call_id, .. }
            | CallEvent::Retry { call_id, .. }
            | CallEvent::Succeeded { call_id, .. }
            | CallEvent::DomainError { call_id, .. }
            | CallEvent::Failed { call_id, .. } => *call_id,
        }
    }
}

/// Receiver of call lifecycle events
///
/// Called inline on the calling task; implementations must not block.
pub trait CallObserver: Send + Sync {
    fn on_event(&self, event: &CallEvent);
}

/// Observer that emits `tracing` records
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl CallObserver for TracingObserver {
    fn on_event(&self, event: &CallEvent) {
        match event {
            CallEvent::Attempt {
                call_id,
                operation,
                attempt,
            } => {
                tracing::debug!(call_id = %call_id, operation = %operation, attempt, "Sending request");
            }
            CallEvent::Retry {
                call_id,
                operation,
                attempt,
                delay,
                reason,
            } => {
                tracing::warn!(
                    call_id = %call_id,
                    operation = %operation,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    reason = %reason,
                    "Request failed, will retry after backoff"
                );
            }
            CallEvent::Succeeded {
                call_id,
                operation,
                attempts,
                elapsed,
            } => {
                tracing::info!(
                    call_id = %call_id,
                    operation = %operation,
                    attempts,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Request succeeded"
                );
            }
            CallEvent::DomainError {
                call_id,
                operation,
                message,
                code,
            } => {
                tracing::warn!(
                    call_id = %call_id,
                    operation = %operation,
                    code = ?code,
                    "Remote rejected request: {}",
                    message
                );
            }
            CallEvent::Failed {
                call_id,
                operation,
                attempts,
                error,
            } => {
                tracing::error!(
                    call_id = %call_id,
                    operation = %operation,
                    attempts,
                    code = ?error.code,
                    http_status = ?error.http_status,
                    "Request failed: {}",
                    error.message
                );
            }
        }
    }
}
