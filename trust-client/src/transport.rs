//! Resilient HTTP transport
//!
//! One logical call = up to `max_retries + 1` attempts. Each attempt passes
//! the rate limiter, performs a single JSON exchange and is classified:
//!
//! | Outcome | Action |
//! |---|---|
//! | 2xx, no `error` key | success |
//! | 2xx with `error` | domain error, not retried |
//! | 2xx, body not JSON | decode error, not retried |
//! | 429 | retry after `Retry-After` or backoff, then `RateLimitExceeded` |
//! | 5xx | retry after backoff, then `Transport` |
//! | other status | `Transport`, not retried |
//! | timeout | `Timeout`, not retried |
//! | request cannot be built (bad URL) | `Config`, not retried |
//! | connection fault | retry after backoff, then `Network` |
//!
//! Backoff is linear: `base_delay * attempt`. Waits (rate limiter and
//! backoff) end early when the call's cancellation token fires.

use crate::observer::{CallEvent, CallObserver, Operation, RetryReason};
use crate::rate_limiter::RateLimiter;
use reqwest::header::{ACCEPT, CONTENT_TYPE, RETRY_AFTER};
use reqwest::{Method, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use trust_common::error::{remote_error_code, remote_error_message};
use trust_common::{ClientConfig, Error, Result};
use uuid::Uuid;

const USER_AGENT: &str = concat!("trust-client/", env!("CARGO_PKG_VERSION"));
const JSON: &str = "application/json";

/// Retry budget of one call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay before the attempt following `attempt`
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }
}

/// Classified result of one exchange
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Outcome {
    Success(Value),
    Domain {
        status: u16,
        message: String,
        code: Option<String>,
    },
    RateLimited {
        retry_after: Option<Duration>,
    },
    ServerError {
        status: u16,
        message: String,
        payload: Option<Value>,
    },
    Rejected {
        status: u16,
        message: String,
        payload: Option<Value>,
    },
    Malformed(String),
    /// No response: connection refused, reset, DNS failure
    Unreachable(String),
}

/// Classify a completed exchange from its status, `Retry-After` header and body
pub(crate) fn classify(status: u16, retry_after: Option<&str>, body: &str) -> Outcome {
    let payload = serde_json::from_str::<Value>(body).ok();

    if (200..300).contains(&status) {
        let Some(payload) = payload else {
            return Outcome::Malformed(format!(
                "HTTP {} response body is not JSON ({} bytes)",
                status,
                body.len()
            ));
        };

        if payload.get("error").map_or(true, Value::is_null) {
            return Outcome::Success(payload);
        }

        return Outcome::Domain {
            status,
            message: remote_error_message(&payload)
                .or_else(|| payload["error"].as_str().map(str::to_string))
                .unwrap_or_else(|| "Unknown error".to_string()),
            code: remote_error_code(&payload),
        };
    }

    if status == 429 {
        return Outcome::RateLimited {
            retry_after: retry_after.and_then(parse_retry_after),
        };
    }

    let message = payload
        .as_ref()
        .and_then(remote_error_message)
        .or_else(|| {
            StatusCode::from_u16(status)
                .ok()
                .and_then(|s| s.canonical_reason())
                .map(str::to_string)
        })
        .unwrap_or_else(|| format!("HTTP {}", status));

    if status >= 500 {
        Outcome::ServerError {
            status,
            message,
            payload,
        }
    } else {
        Outcome::Rejected {
            status,
            message,
            payload,
        }
    }
}

/// `Retry-After` in delta-seconds form; HTTP dates are not honoured
pub(crate) fn parse_retry_after(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}

/// Successful call with the bookkeeping needed to report later failures
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub call_id: Uuid,
    pub attempts: u32,
    pub body: Value,
}

/// HTTP transport shared by every call of one client
pub struct Transport {
    http: reqwest::Client,
    limiter: Arc<RateLimiter>,
    policy: RetryPolicy,
    timeout: Duration,
    observer: Arc<dyn CallObserver>,
}

impl Transport {
    pub fn new(config: &ClientConfig, observer: Arc<dyn CallObserver>) -> Result<Self> {
        let timeout = config.timeout();

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            limiter: Arc::new(RateLimiter::new(
                config.requests_per_second,
                config.rate_limit_jitter(),
            )),
            policy: RetryPolicy {
                max_retries: config.max_retries,
                base_delay: config.retry_base_delay(),
            },
            timeout,
            observer,
        })
    }

    /// Perform one logical call, retrying transient failures
    pub async fn send(
        &self,
        operation: Operation,
        method: Method,
        url: &str,
        payload: &Value,
        cancel: &CancellationToken,
    ) -> Result<Delivery> {
        let call_id = Uuid::new_v4();
        let started = Instant::now();
        let max_attempts = self.policy.max_attempts();
        let mut attempt = 0u32;

        loop {
            attempt += 1;

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return Err(self.fail(call_id, operation, attempt - 1, Error::Cancelled));
                }
                _ = self.limiter.acquire() => {}
            }

            self.observer.on_event(&CallEvent::Attempt {
                call_id,
                operation,
                attempt,
            });

            let outcome = match self.exchange(method.clone(), url, payload).await {
                Ok(outcome) => outcome,
                Err(e) if e.is_timeout() => {
                    return Err(self.fail(call_id, operation, attempt, Error::Timeout(self.timeout)));
                }
                Err(e) if e.is_builder() => {
                    let err = Error::Config(format!("Cannot build request for {}: {}", url, e));
                    return Err(self.fail(call_id, operation, attempt, err));
                }
                Err(e) => Outcome::Unreachable(e.to_string()),
            };

            let (reason, delay, exhausted) = match outcome {
                Outcome::Success(body) => {
                    self.observer.on_event(&CallEvent::Succeeded {
                        call_id,
                        operation,
                        attempts: attempt,
                        elapsed: started.elapsed(),
                    });
                    return Ok(Delivery {
                        call_id,
                        attempts: attempt,
                        body,
                    });
                }
                Outcome::Domain {
                    status,
                    message,
                    code,
                } => {
                    self.observer.on_event(&CallEvent::DomainError {
                        call_id,
                        operation,
                        message: message.clone(),
                        code: code.clone(),
                    });
                    return Err(Error::Domain {
                        message,
                        code,
                        status,
                    });
                }
                Outcome::Malformed(message) => {
                    return Err(self.fail(call_id, operation, attempt, Error::Decode(message)));
                }
                Outcome::Rejected {
                    status,
                    message,
                    payload,
                } => {
                    let err = Error::Transport {
                        status,
                        message,
                        payload,
                    };
                    return Err(self.fail(call_id, operation, attempt, err));
                }
                Outcome::RateLimited { retry_after } => (
                    RetryReason::RateLimited,
                    retry_after.unwrap_or_else(|| self.policy.backoff(attempt)),
                    Error::RateLimitExceeded { attempts: attempt },
                ),
                Outcome::Unreachable(message) => (
                    RetryReason::Network(message.clone()),
                    self.policy.backoff(attempt),
                    Error::Network(message),
                ),
                Outcome::ServerError {
                    status,
                    message,
                    payload,
                } => (
                    RetryReason::ServerError(status),
                    self.policy.backoff(attempt),
                    Error::Transport {
                        status,
                        message,
                        payload,
                    },
                ),
            };

            if attempt >= max_attempts {
                return Err(self.fail(call_id, operation, attempt, exhausted));
            }

            self.retry(call_id, operation, attempt, delay, reason, cancel)
                .await?;
        }
    }

    async fn exchange(&self, method: Method, url: &str, payload: &Value) -> reqwest::Result<Outcome> {
        let response = self
            .http
            .request(method, url)
            .header(CONTENT_TYPE, JSON)
            .header(ACCEPT, JSON)
            .json(payload)
            .send()
            .await?;

        let status = response.status().as_u16();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await?;

        tracing::debug!(status, bytes = body.len(), "Received response");

        Ok(classify(status, retry_after.as_deref(), &body))
    }

    /// Report the retry and sleep, unless cancelled first
    async fn retry(
        &self,
        call_id: Uuid,
        operation: Operation,
        attempt: u32,
        delay: Duration,
        reason: RetryReason,
        cancel: &CancellationToken,
    ) -> Result<()> {
        self.observer.on_event(&CallEvent::Retry {
            call_id,
            operation,
            attempt,
            delay,
            reason,
        });

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(self.fail(call_id, operation, attempt, Error::Cancelled)),
            _ = tokio::time::sleep(delay) => Ok(()),
        }
    }

    fn fail(&self, call_id: Uuid, operation: Operation, attempts: u32, error: Error) -> Error {
        self.observer.on_event(&CallEvent::Failed {
            call_id,
            operation,
            attempts,
            error: error.to_shape(),
        });
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<CallEvent>>);

    impl CallObserver for Recorder {
        fn on_event(&self, event: &CallEvent) {
            self.0.lock().unwrap().push(event.clone());
        }
    }

    #[test]
    fn test_backoff_is_linear() {
        let policy = RetryPolicy {
            max_retries: 3,
            base_delay: Duration::from_millis(100),
        };
        assert_eq!(policy.max_attempts(), 4);
        assert_eq!(policy.backoff(1), Duration::from_millis(100));
        assert_eq!(policy.backoff(3), Duration::from_millis(300));
    }

    #[test]
    fn test_classify_success_and_domain() {
        assert_eq!(
            classify(200, None, r#"{"score": 10}"#),
            Outcome::Success(json!({"score": 10}))
        );

        assert_eq!(
            classify(200, None, r#"{"error": {"message": "Invalid API key", "code": 101}}"#),
            Outcome::Domain {
                status: 200,
                message: "Invalid API key".to_string(),
                code: Some("101".to_string()),
            }
        );

        assert_eq!(
            classify(200, None, r#"{"error": "quota exhausted"}"#),
            Outcome::Domain {
                status: 200,
                message: "quota exhausted".to_string(),
                code: None,
            }
        );

        assert_eq!(
            classify(200, None, r#"{"error": null, "score": 1}"#),
            Outcome::Success(json!({"error": null, "score": 1}))
        );
    }

    #[test]
    fn test_classify_malformed_success_body() {
        assert!(matches!(classify(200, None, "<html>"), Outcome::Malformed(_)));
        assert!(matches!(classify(204, None, ""), Outcome::Malformed(_)));
    }

    #[test]
    fn test_classify_rate_limited() {
        assert_eq!(
            classify(429, Some("2"), ""),
            Outcome::RateLimited {
                retry_after: Some(Duration::from_secs(2))
            }
        );
        assert_eq!(
            classify(429, Some("Wed, 21 Oct 2015 07:28:00 GMT"), ""),
            Outcome::RateLimited { retry_after: None }
        );
    }

    #[test]
    fn test_classify_error_statuses() {
        match classify(503, None, "") {
            Outcome::ServerError {
                status,
                message,
                payload,
            } => {
                assert_eq!(status, 503);
                assert_eq!(message, "Service Unavailable");
                assert!(payload.is_none());
            }
            other => panic!("unexpected outcome {:?}", other),
        }

        match classify(400, None, r#"{"error": {"message": "bad field"}}"#) {
            Outcome::Rejected { status, message, .. } => {
                assert_eq!(status, 400);
                assert_eq!(message, "bad field");
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_parse_retry_after() {
        assert_eq!(parse_retry_after(" 5 "), Some(Duration::from_secs(5)));
        assert_eq!(parse_retry_after("soon"), None);
        assert_eq!(parse_retry_after("-1"), None);
    }

    #[tokio::test]
    async fn test_unbuildable_request_is_terminal() {
        let recorder = Arc::new(Recorder::default());
        let config = ClientConfig::new("k")
            .with_max_retries(3)
            .with_retry_base_delay(Duration::from_secs(5));
        let transport = Transport::new(&config, recorder.clone()).unwrap();

        let started = Instant::now();
        let err = transport
            .send(
                Operation::Score,
                Method::POST,
                "http://exa mple.com/score",
                &json!({}),
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Config(_)), "got {:?}", err);
        assert!(started.elapsed() < Duration::from_secs(1));

        let events = recorder.0.lock().unwrap();
        assert!(!events.iter().any(|e| matches!(e, CallEvent::Retry { .. })));
        assert!(matches!(events.last(), Some(CallEvent::Failed { attempts: 1, .. })));
    }
}
