//! Scoring client facade
//!
//! `score`: canonicalize → validate (errors block, warnings logged) →
//! rate-limited, retried POST → typed response.
//! `submit_feedback`: local batch bounds → rate-limited, retried PUT.
//!
//! The client is cheap to clone; clones share one rate window and one HTTP
//! connection pool.

use crate::canonical::{canonicalize, CanonicalRequest};
use crate::fields::CREDENTIAL_KEY;
use crate::observer::{CallEvent, CallObserver, Operation, TracingObserver};
use crate::transport::{Delivery, Transport};
use crate::types::{FeedbackResponse, ScoreResponse};
use crate::validation::{RequestValidator, ValidationReport};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use trust_common::{ClientConfig, Error, ErrorCode, Result, ValidationFailure};
use uuid::Uuid;

/// Largest feedback batch accepted in one call
pub const MAX_FEEDBACKS_PER_CALL: usize = 1000;

const SCORE_PATH: &str = "score";
const FEEDBACK_PATH: &str = "feedback";

struct Inner {
    config: ClientConfig,
    validator: RequestValidator,
    transport: Transport,
    observer: Arc<dyn CallObserver>,
}

/// Client for the remote trust scoring service
#[derive(Clone)]
pub struct ScoringClient {
    inner: Arc<Inner>,
}

impl ScoringClient {
    /// Client reporting call events through `tracing`
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::with_observer(config, Arc::new(TracingObserver))
    }

    pub fn with_observer(config: ClientConfig, observer: Arc<dyn CallObserver>) -> Result<Self> {
        config.validate()?;

        let transport = Transport::new(&config, Arc::clone(&observer))?;

        debug!(
            base_url = %config.base_url(),
            max_retries = config.max_retries,
            requests_per_second = config.requests_per_second,
            "Scoring client created"
        );

        Ok(Self {
            inner: Arc::new(Inner {
                config,
                validator: RequestValidator::new(),
                transport,
                observer,
            }),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Canonicalize and validate without touching the network
    pub fn validate_input(&self, input: &Value) -> (CanonicalRequest, ValidationReport) {
        let mut request = canonicalize(input);
        request.ensure_action();
        let report = self.inner.validator.validate(&request);
        (request, report)
    }

    /// Score an event
    pub async fn score(&self, input: &Value) -> Result<ScoreResponse> {
        self.score_cancellable(input, &CancellationToken::new()).await
    }

    pub async fn score_cancellable(
        &self,
        input: &Value,
        cancel: &CancellationToken,
    ) -> Result<ScoreResponse> {
        let delivery = self.deliver_score(input, cancel).await?;
        self.decode(Operation::Score, delivery)
    }

    /// Score an event, returning the response body untyped
    pub async fn score_raw(&self, input: &Value) -> Result<Value> {
        self.score_raw_cancellable(input, &CancellationToken::new()).await
    }

    pub async fn score_raw_cancellable(&self, input: &Value, cancel: &CancellationToken) -> Result<Value> {
        Ok(self.deliver_score(input, cancel).await?.body)
    }

    async fn deliver_score(&self, input: &Value, cancel: &CancellationToken) -> Result<Delivery> {
        let (request, report) = self.validate_input(input);

        let warnings = report
            .into_result()
            .map_err(|failure| self.reject(Operation::Score, failure))?;

        for warning in &warnings {
            warn!(field = %warning.field(), "Request warning: {}", warning.message());
        }

        let payload = request.to_payload(&self.inner.config.api_key);
        self.inner
            .transport
            .send(
                Operation::Score,
                Method::POST,
                &self.endpoint(SCORE_PATH),
                &payload,
                cancel,
            )
            .await
    }

    /// Report outcomes of previously scored events
    pub async fn submit_feedback(&self, feedbacks: Vec<Value>) -> Result<FeedbackResponse> {
        self.submit_feedback_cancellable(feedbacks, &CancellationToken::new())
            .await
    }

    pub async fn submit_feedback_cancellable(
        &self,
        feedbacks: Vec<Value>,
        cancel: &CancellationToken,
    ) -> Result<FeedbackResponse> {
        if feedbacks.is_empty() {
            return Err(self.reject(
                Operation::Feedback,
                ValidationFailure::single(
                    ErrorCode::MissingRequiredField,
                    "feedbacks",
                    "at least one feedback item is required",
                ),
            ));
        }

        if feedbacks.len() > MAX_FEEDBACKS_PER_CALL {
            return Err(self.reject(
                Operation::Feedback,
                ValidationFailure::single(
                    ErrorCode::TooManyFeedbacks,
                    "feedbacks",
                    format!(
                        "{} feedback items exceed the limit of {} per call",
                        feedbacks.len(),
                        MAX_FEEDBACKS_PER_CALL
                    ),
                ),
            ));
        }

        debug!(count = feedbacks.len(), "Submitting feedback");

        let payload = json!({
            CREDENTIAL_KEY: self.inner.config.api_key,
            "feedbacks": feedbacks,
        });

        let delivery = self
            .inner
            .transport
            .send(
                Operation::Feedback,
                Method::PUT,
                &self.endpoint(FEEDBACK_PATH),
                &payload,
                cancel,
            )
            .await?;

        self.decode(Operation::Feedback, delivery)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.inner.config.base_url(), path)
    }

    /// Report a locally rejected call and build its error
    fn reject(&self, operation: Operation, failure: ValidationFailure) -> Error {
        let error = Error::Validation(failure);
        self.inner.observer.on_event(&CallEvent::Failed {
            call_id: Uuid::new_v4(),
            operation,
            attempts: 0,
            error: error.to_shape(),
        });
        error
    }

    /// Type a delivered body; a shape mismatch fails the call it came from
    fn decode<T: DeserializeOwned>(&self, operation: Operation, delivery: Delivery) -> Result<T> {
        serde_json::from_value(delivery.body).map_err(|e| {
            let error = Error::Decode(format!("Unexpected {} response shape: {}", operation, e));
            self.inner.observer.on_event(&CallEvent::Failed {
                call_id: delivery.call_id,
                operation,
                attempts: delivery.attempts,
                error: error.to_shape(),
            });
            error
        })
    }
}

impl std::fmt::Debug for ScoringClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoringClient")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}
