//! Response wire types
//!
//! Only the fields callers commonly branch on are typed; every other key the
//! service mirrors back is kept verbatim in `extra`.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Treat an explicit `null` like a missing key
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Recommended decision for a scored event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approve,
    Review,
    Decline,
    /// Any decision this client does not know yet
    #[serde(other)]
    Unknown,
}

/// Scoring response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_id: Option<String>,

    /// Risk score, 0 to 1000
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decision: Option<Decision>,

    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub warnings: Vec<Value>,

    /// Mirrored sub-objects (account, device, signals, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ScoreResponse {
    /// Mirrored sub-object by key
    pub fn section(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }
}

/// Acknowledgement of one feedback item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackReceipt {
    #[serde(default, deserialize_with = "null_as_default")]
    pub received: bool,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Feedback submission response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub feedbacks: Vec<FeedbackReceipt>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FeedbackResponse {
    /// Number of items the service acknowledged
    pub fn received_count(&self) -> usize {
        self.feedbacks.iter().filter(|f| f.received).count()
    }
}
