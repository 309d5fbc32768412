//! Device, person, personal identifier and group metadata rules

use super::formats::{
    is_full_date, is_valid_cpf, is_valid_dob, is_valid_ip, is_valid_timestamp, scalar_text,
};
use super::{path, present, text, Findings};
use serde_json::{Map, Value};
use trust_common::ErrorCode;

/// Device keys holding an IP address
const DEVICE_IP_KEYS: [&str; 2] = ["ip", "true_ip"];
/// Device risk flags worth surfacing when set
const DEVICE_RISK_FLAGS: [&str; 3] = ["is_emulator", "is_virtual_machine", "is_rooted"];

pub(crate) fn validate_device(value: &Value, field: &str, findings: &mut Findings) {
    let Some(obj) = value.as_object() else {
        findings.error(
            ErrorCode::InvalidField,
            field,
            "device must be an IP string or an object",
        );
        return;
    };

    for key in DEVICE_IP_KEYS {
        if !present(obj, key) {
            continue;
        }
        let valid = obj.get(key).and_then(Value::as_str).map(is_valid_ip).unwrap_or(false);
        if !valid {
            findings.error(
                ErrorCode::InvalidIp,
                path(field, key),
                format!("{} is not a valid IPv4 or IPv6 address", key),
            );
        }
    }

    if present(obj, "battery_level") {
        match obj.get("battery_level").and_then(Value::as_f64) {
            Some(level) if (0.0..=100.0).contains(&level) => {}
            Some(_) => findings.warning(path(field, "battery_level"), "battery_level should be 0-100"),
            None => findings.warning(path(field, "battery_level"), "battery_level should be a number"),
        }
    }

    for flag in DEVICE_RISK_FLAGS {
        if obj.get(flag) == Some(&Value::Bool(true)) {
            findings.warning(path(field, flag), format!("device reports {}", flag));
        }
    }
}

pub(crate) fn validate_person(value: &Value, field: &str, findings: &mut Findings) {
    let Some(obj) = value.as_object() else {
        findings.error(ErrorCode::InvalidField, field, "person must be an object");
        return;
    };

    if present(obj, "gender") && !matches!(text(obj, "gender"), Some("M" | "F")) {
        findings.error(
            ErrorCode::InvalidGender,
            path(field, "gender"),
            "gender must be \"M\" or \"F\"",
        );
    }

    if let Some(dob) = obj.get("dob").filter(|v| !v.is_null()) {
        if !is_valid_dob(dob) {
            findings.warning(
                path(field, "dob"),
                "dob should be YYYY-MM-DD, YYYY-MM, YYYY or an age",
            );
        }
    }
}

pub(crate) fn validate_personal_identifier(value: &Value, field: &str, findings: &mut Findings) {
    let Some(obj) = value.as_object() else {
        findings.error(
            ErrorCode::InvalidField,
            field,
            "personal_identifier must be an object",
        );
        return;
    };

    let kind = obj.get("type").and_then(scalar_text).filter(|s| !s.is_empty());
    let identifier = obj.get("value").and_then(scalar_text).filter(|s| !s.is_empty());

    if kind.is_none() {
        findings.error(
            ErrorCode::MissingRequiredField,
            path(field, "type"),
            "personal_identifier type is required",
        );
    }
    if identifier.is_none() {
        findings.error(
            ErrorCode::MissingRequiredField,
            path(field, "value"),
            "personal_identifier value is required",
        );
    }

    for key in ["issue_date", "expiry_date"] {
        if present(obj, key) && !text(obj, key).map(is_full_date).unwrap_or(false) {
            findings.warning(path(field, key), format!("{} should be YYYY-MM-DD", key));
        }
    }

    if let (Some(kind), Some(identifier)) = (kind, identifier) {
        if kind.eq_ignore_ascii_case("cpf") && !is_valid_cpf(&identifier) {
            findings.warning(path(field, "value"), "CPF check digits do not match");
        }
    }
}

/// `created`, `ip_created`, `ip_last`, `ip_history` on an identity group
pub(crate) fn validate_group_metadata(obj: &Map<String, Value>, prefix: &str, findings: &mut Findings) {
    if let Some(created) = obj.get("created").filter(|v| !v.is_null()) {
        if !is_valid_timestamp(created) {
            findings.warning(path(prefix, "created"), "created should be a date or timestamp");
        }
    }

    for key in ["ip_created", "ip_last"] {
        if present(obj, key) && !obj.get(key).and_then(Value::as_str).map(is_valid_ip).unwrap_or(false) {
            findings.warning(path(prefix, key), format!("{} is not a valid IP address", key));
        }
    }

    let Some(history) = obj.get("ip_history").filter(|v| !v.is_null()) else {
        return;
    };

    let Some(entries) = history.as_array() else {
        findings.warning(path(prefix, "ip_history"), "ip_history should be a list");
        return;
    };

    for (index, entry) in entries.iter().enumerate() {
        let ip = entry
            .as_str()
            .or_else(|| entry.get("ip").and_then(Value::as_str));
        if !ip.map(is_valid_ip).unwrap_or(false) {
            findings.warning(
                format!("{}.ip_history[{}]", prefix, index),
                "ip_history entry is not a valid IP address",
            );
        }
    }
}
