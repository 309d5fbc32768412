//! Request canonicalization
//!
//! Builds a [`CanonicalRequest`] from permissive caller input:
//! 1. Action carried over verbatim, default `{type: "purchase"}`
//! 2. sender/recipient/metadata decoded from embedded JSON strings, sanitized
//! 3. account/billing/shipping members normalized, group sanitized
//! 4. Root name/email/phone/address folded into a synthesized `account`
//!    group only when the caller supplied no `account` group
//! 5. Other recognized fields normalized and kept at the root
//! 6. Unrecognized keys and the credential dropped
//! 7. Boolean flags copied only when present
//!
//! Known limitation: embedded pseudo-JSON is decoded after replacing every
//! single quote with a double quote, which corrupts values containing
//! apostrophes (`{'name': 'O'Brien'}` fails to decode and stays a string).

use crate::fields::{is_recognized_key, FieldKind, GroupKind, ACTION_KEY, CREDENTIAL_KEY};
use crate::normalize::{normalize, normalize_group};
use crate::sanitize::sanitize;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::debug;

/// Action type used when the caller supplies none
pub const DEFAULT_ACTION_TYPE: &str = "purchase";

/// Well-known action types
pub mod action_types {
    pub const PURCHASE: &str = "purchase";
    pub const LOGIN: &str = "login";
    pub const SIGNUP: &str = "signup";
    pub const ACCOUNT_UPDATE: &str = "account_update";
    pub const PAYMENT: &str = "payment";
    pub const EMAIL_SECURITY: &str = "email_security";
}

/// Typed action for callers building requests programmatically
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
}

impl Action {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: None,
            organization: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("type".to_string(), Value::String(self.kind.clone()));
        if let Some(id) = &self.id {
            map.insert("id".to_string(), Value::String(id.clone()));
        }
        if let Some(organization) = &self.organization {
            map.insert("organization".to_string(), Value::String(organization.clone()));
        }
        Value::Object(map)
    }
}

impl Default for Action {
    fn default() -> Self {
        Action::new(DEFAULT_ACTION_TYPE)
    }
}

/// Boolean query flags; `None` means "not supplied"
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryFlags {
    pub echo: Option<bool>,
    pub connectivity: Option<bool>,
    pub signals: Option<bool>,
}

/// Normalized, sanitized request ready for validation and submission
///
/// No slot ever holds an empty container, empty string or null sentinel.
/// The action is kept as raw JSON so the validator can report malformed
/// caller actions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CanonicalRequest {
    pub action: Option<Value>,
    pub groups: BTreeMap<GroupKind, Value>,
    pub fields: BTreeMap<FieldKind, Value>,
    pub flags: QueryFlags,
}

impl CanonicalRequest {
    pub fn group(&self, kind: GroupKind) -> Option<&Value> {
        self.groups.get(&kind)
    }

    pub fn field(&self, kind: FieldKind) -> Option<&Value> {
        self.fields.get(&kind)
    }

    /// Whether the request carries any data field or group
    pub fn has_data(&self) -> bool {
        !self.groups.is_empty() || !self.fields.is_empty()
    }

    /// Set the action unless one is already present
    pub fn ensure_action(&mut self) {
        if self.action.is_none() {
            self.action = Some(Action::default().to_value());
        }
    }

    /// Flat JSON object as sent on the wire (without credential)
    pub fn to_json(&self) -> Map<String, Value> {
        let mut map = Map::new();

        if let Some(action) = &self.action {
            map.insert(ACTION_KEY.to_string(), action.clone());
        }
        for (kind, value) in &self.groups {
            map.insert(kind.as_str().to_string(), value.clone());
        }
        for (kind, value) in &self.fields {
            map.insert(kind.as_str().to_string(), value.clone());
        }

        let flags = [
            ("echo", self.flags.echo),
            ("connectivity", self.flags.connectivity),
            ("signals", self.flags.signals),
        ];
        for (key, flag) in flags {
            if let Some(flag) = flag {
                map.insert(key.to_string(), Value::Bool(flag));
            }
        }

        map
    }

    /// Wire payload with the credential injected
    pub fn to_payload(&self, api_key: &str) -> Value {
        let mut map = self.to_json();
        map.insert(CREDENTIAL_KEY.to_string(), Value::String(api_key.to_string()));
        Value::Object(map)
    }
}

impl Serialize for CanonicalRequest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// Best-effort decode of JSON smuggled inside a string
///
/// Strings starting with `{` or `[` are parsed after substituting single
/// quotes with double quotes. On failure the original string is returned.
pub fn decode_embedded_json(value: Value) -> Value {
    let Value::String(text) = &value else {
        return value;
    };

    let trimmed = text.trim_start();
    if !(trimmed.starts_with('{') || trimmed.starts_with('[')) {
        return value;
    }

    match serde_json::from_str::<Value>(&trimmed.replace('\'', "\"")) {
        Ok(decoded) => decoded,
        Err(e) => {
            debug!(error = %e, "Embedded JSON did not decode, keeping raw string");
            value
        }
    }
}

/// Canonicalize caller input
///
/// Non-object input yields a request holding only the default action.
pub fn canonicalize(raw: &Value) -> CanonicalRequest {
    let mut request = CanonicalRequest::default();

    let Some(input) = raw.as_object() else {
        debug!("Request input is not an object, nothing to canonicalize");
        request.ensure_action();
        return request;
    };

    // Step 1: action
    request.action = match input.get(ACTION_KEY) {
        Some(Value::Null) | None => Some(Action::default().to_value()),
        Some(action) => Some(action.clone()),
    };

    // Steps 2-3: groups
    for kind in GroupKind::ALL {
        let Some(value) = input.get(kind.as_str()) else {
            continue;
        };

        let decoded = decode_embedded_json(value.clone());
        let shaped = if kind.is_identity() {
            normalize_group(decoded)
        } else {
            decoded
        };

        if let Some(clean) = sanitize(shaped) {
            request.groups.insert(kind, clean);
        }
    }

    // Step 4: root identity fields
    let explicit_account = matches!(input.get(GroupKind::Account.as_str()), Some(v) if !v.is_null());
    let mut synthesized = Map::new();

    for kind in FieldKind::IDENTITY {
        let Some(value) = input.get(kind.as_str()) else {
            continue;
        };
        let normalized = normalize(kind, value.clone());

        if explicit_account {
            if let Some(clean) = sanitize(normalized) {
                request.fields.insert(kind, clean);
            }
        } else {
            synthesized.insert(kind.as_str().to_string(), normalized);
        }
    }

    if !explicit_account {
        if let Some(account) = sanitize(Value::Object(synthesized)) {
            request.groups.insert(GroupKind::Account, account);
        }
    }

    // Step 5: other recognized fields
    for kind in FieldKind::ATTRIBUTES {
        let Some(value) = input.get(kind.as_str()) else {
            continue;
        };
        if let Some(clean) = sanitize(normalize(kind, value.clone())) {
            request.fields.insert(kind, clean);
        }
    }

    // Step 6: report dropped keys (never their values)
    let dropped: Vec<&str> = input
        .keys()
        .map(String::as_str)
        .filter(|key| *key != CREDENTIAL_KEY && !is_recognized_key(key))
        .collect();
    if !dropped.is_empty() {
        debug!(dropped = ?dropped, "Dropping unrecognized request keys");
    }

    // Step 7: flags
    request.flags = QueryFlags {
        echo: input.get("echo").and_then(Value::as_bool),
        connectivity: input.get("connectivity").and_then(Value::as_bool),
        signals: input.get("signals").and_then(Value::as_bool),
    };

    request
}
