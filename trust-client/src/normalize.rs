//! Field normalization
//!
//! Coerces one field's caller representation into the canonical shape.
//! Pure and total: every input produces an output, deeper shape problems
//! are left for the validator to report.

use crate::fields::FieldKind;
use serde_json::{Map, Value};

/// Caller representation of a single field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldForm {
    /// Bare string (e.g. `"Jo Doe"`, `"1.2.3.4"`)
    Raw(String),
    /// Already-structured object
    Structured(Map<String, Value>),
    /// Anything else (numbers, arrays, booleans, null)
    Other(Value),
}

impl From<Value> for FieldForm {
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => FieldForm::Raw(text),
            Value::Object(map) => FieldForm::Structured(map),
            other => FieldForm::Other(other),
        }
    }
}

impl From<FieldForm> for Value {
    fn from(form: FieldForm) -> Self {
        match form {
            FieldForm::Raw(text) => Value::String(text),
            FieldForm::Structured(map) => Value::Object(map),
            FieldForm::Other(value) => value,
        }
    }
}

fn wrap(key: &str, text: String) -> Value {
    let mut map = Map::new();
    map.insert(key.to_string(), Value::String(text));
    Value::Object(map)
}

/// Normalize a value for a recognized field kind
///
/// - string name/email/phone/address → `{raw: value}`
/// - string device → `{ip: value}`
/// - everything else unchanged
pub fn normalize(kind: FieldKind, value: Value) -> Value {
    match (kind, FieldForm::from(value)) {
        (FieldKind::Device, FieldForm::Raw(text)) => wrap("ip", text),
        (kind, FieldForm::Raw(text)) if kind.accepts_raw_string() => wrap("raw", text),
        (_, form) => form.into(),
    }
}

/// Normalize a value keyed by its field name
///
/// Keys that are not field kinds (e.g. `created`, `ip_history`) pass through.
pub fn normalize_key(key: &str, value: Value) -> Value {
    match key.parse::<FieldKind>() {
        Ok(kind) => normalize(kind, value),
        Err(()) => value,
    }
}

/// Normalize every member of an identity group object
pub fn normalize_group(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, member)| {
                    let normalized = normalize_key(&key, member);
                    (key, normalized)
                })
                .collect(),
        ),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_identity_strings_wrap_as_raw() {
        assert_eq!(normalize(FieldKind::Email, json!("a@b.com")), json!({"raw": "a@b.com"}));
        assert_eq!(normalize(FieldKind::Name, json!("Jo Doe")), json!({"raw": "Jo Doe"}));
        assert_eq!(normalize(FieldKind::Phone, json!("555-1234")), json!({"raw": "555-1234"}));
        assert_eq!(
            normalize(FieldKind::Address, json!("1 Main St")),
            json!({"raw": "1 Main St"})
        );
    }

    #[test]
    fn test_device_string_is_ip() {
        assert_eq!(normalize(FieldKind::Device, json!("1.2.3.4")), json!({"ip": "1.2.3.4"}));
    }

    #[test]
    fn test_objects_pass_through() {
        let phone = json!({"country_code": "1", "number": "5551234567"});
        assert_eq!(normalize(FieldKind::Phone, phone.clone()), phone);
    }

    #[test]
    fn test_other_kinds_and_shapes_unchanged() {
        assert_eq!(normalize(FieldKind::Locale, json!("en-US")), json!("en-US"));
        assert_eq!(normalize(FieldKind::Email, json!(42)), json!(42));
        assert_eq!(normalize_key("created", json!("2024-01-01")), json!("2024-01-01"));
    }

    #[test]
    fn test_normalize_group_members() {
        let group = json!({
            "name": "Jo Doe",
            "email": {"address": "jo@doe.com"},
            "ip_history": ["1.1.1.1"]
        });
        assert_eq!(
            normalize_group(group),
            json!({
                "name": {"raw": "Jo Doe"},
                "email": {"address": "jo@doe.com"},
                "ip_history": ["1.1.1.1"]
            })
        );
    }
}
