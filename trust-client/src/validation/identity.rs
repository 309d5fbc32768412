//! Name, email, phone and address rules
//!
//! Each identity field takes either a `raw` string or its parsed parts,
//! never both.

use super::formats::{digit_count, is_placeholder_email, is_two_letters, is_valid_email, scalar_text};
use super::{path, present, text, Findings};
use serde_json::{Map, Value};
use trust_common::ErrorCode;

/// Shortest first/last name not flagged as suspicious
const MIN_NAME_PART_LEN: usize = 2;
/// Fewest digits a raw phone number should contain
const MIN_RAW_PHONE_DIGITS: usize = 7;

/// Keys that locate an address; at least one is required
const ADDRESS_LOCATORS: [&str; 5] = ["raw", "country", "state", "city", "zip_code"];

fn as_object<'a>(
    value: &'a Value,
    field: &str,
    code: ErrorCode,
    findings: &mut Findings,
) -> Option<&'a Map<String, Value>> {
    let obj = value.as_object();
    if obj.is_none() {
        findings.error(code, field, format!("{} must be a string or an object", field));
    }
    obj
}

/// raw XOR (first_name AND last_name)
pub(crate) fn validate_name(value: &Value, field: &str, findings: &mut Findings) {
    let Some(obj) = as_object(value, field, ErrorCode::InvalidName, findings) else {
        return;
    };

    let has_raw = present(obj, "raw");
    let has_first = present(obj, "first_name");
    let has_last = present(obj, "last_name");

    if has_raw && (has_first || has_last) {
        findings.error(
            ErrorCode::InvalidName,
            field,
            "raw name cannot be combined with first_name/last_name",
        );
        return;
    }

    if has_raw {
        if text(obj, "raw").is_none() {
            findings.error(ErrorCode::InvalidName, path(field, "raw"), "raw name must be a string");
        }
        return;
    }

    if !(has_first && has_last) {
        findings.error(
            ErrorCode::InvalidName,
            field,
            "name requires raw or both first_name and last_name",
        );
        return;
    }

    for key in ["first_name", "last_name"] {
        match text(obj, key) {
            Some(part) if part.chars().count() < MIN_NAME_PART_LEN => {
                findings.warning(path(field, key), format!("{} is unusually short", key));
            }
            Some(_) => {}
            None => {
                findings.error(ErrorCode::InvalidName, path(field, key), format!("{} must be a string", key));
            }
        }
    }
}

/// `address` (or normalized `raw`) must look like `local@domain.tld`
pub(crate) fn validate_email(value: &Value, field: &str, findings: &mut Findings) {
    let Some(obj) = as_object(value, field, ErrorCode::InvalidEmail, findings) else {
        return;
    };

    let candidate = obj.get("address").or_else(|| obj.get("raw"));
    let Some(candidate) = candidate else {
        findings.error(ErrorCode::InvalidEmail, field, "email address is required");
        return;
    };

    let Some(address) = candidate.as_str().map(str::trim) else {
        findings.error(ErrorCode::InvalidEmail, field, "email address must be a string");
        return;
    };

    if !is_valid_email(address) {
        findings.error(
            ErrorCode::InvalidEmail,
            field,
            format!("{:?} is not a valid email address", address),
        );
        return;
    }

    if is_placeholder_email(address) {
        findings.warning(field, format!("{} looks like a placeholder address", address));
    }
}

/// raw XOR (country_code AND number)
pub(crate) fn validate_phone(value: &Value, field: &str, findings: &mut Findings) {
    let Some(obj) = as_object(value, field, ErrorCode::InvalidPhone, findings) else {
        return;
    };

    let has_raw = present(obj, "raw");
    let has_code = present(obj, "country_code");
    let has_number = present(obj, "number");

    if has_raw && (has_code || has_number) {
        findings.error(
            ErrorCode::InvalidPhone,
            field,
            "raw phone cannot be combined with country_code/number",
        );
        return;
    }

    if has_raw {
        match obj.get("raw").and_then(scalar_text) {
            Some(raw) if digit_count(&raw) < MIN_RAW_PHONE_DIGITS => {
                findings.warning(path(field, "raw"), "raw phone has fewer than 7 digits");
            }
            Some(_) => {}
            None => {
                findings.error(ErrorCode::InvalidPhone, path(field, "raw"), "raw phone must be a string");
            }
        }
        return;
    }

    if !(has_code && has_number) {
        findings.error(
            ErrorCode::InvalidPhone,
            field,
            "phone requires raw or both country_code and number",
        );
        return;
    }

    match obj.get("country_code").and_then(scalar_text) {
        Some(code) => {
            let digits = code.trim_start_matches('+');
            if digits.is_empty() || digits.len() > 3 || !digits.chars().all(|c| c.is_ascii_digit()) {
                findings.warning(path(field, "country_code"), "country_code should be 1-3 digits");
            }
        }
        None => findings.error(
            ErrorCode::InvalidPhone,
            path(field, "country_code"),
            "country_code must be a string or number",
        ),
    }

    match obj.get("number").and_then(scalar_text) {
        Some(number) => {
            let separators_only = number
                .chars()
                .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '-' | '.' | '(' | ')'));
            let digits = digit_count(&number);
            if !separators_only || !(7..=15).contains(&digits) {
                findings.warning(path(field, "number"), "number should be 7-15 digits");
            }
        }
        None => findings.error(
            ErrorCode::InvalidPhone,
            path(field, "number"),
            "number must be a string or number",
        ),
    }
}

/// raw alone, or parsed parts with at least one locator
pub(crate) fn validate_address(value: &Value, field: &str, findings: &mut Findings) {
    let Some(obj) = as_object(value, field, ErrorCode::InvalidAddress, findings) else {
        return;
    };

    let has_raw = present(obj, "raw");
    if has_raw && obj.iter().any(|(key, v)| key != "raw" && !v.is_null()) {
        findings.error(
            ErrorCode::InvalidAddress,
            field,
            "raw address cannot be combined with other address fields",
        );
        return;
    }

    if !ADDRESS_LOCATORS.iter().any(|key| present(obj, key)) {
        findings.error(
            ErrorCode::PartialAddress,
            field,
            "address requires raw, country, state, city or zip_code",
        );
        return;
    }

    if has_raw {
        if text(obj, "raw").is_none() {
            findings.error(ErrorCode::InvalidAddress, path(field, "raw"), "raw address must be a string");
        }
        return;
    }

    let country = text(obj, "country");
    let has_country = present(obj, "country");
    let has_state = present(obj, "state");

    if has_country && !country.map(is_two_letters).unwrap_or(false) {
        findings.warning(path(field, "country"), "country should be a 2-letter ISO code");
    }

    if has_state && !has_country {
        findings.warning(path(field, "state"), "state given without country");
    } else if has_state
        && country.map(|c| c.eq_ignore_ascii_case("US")).unwrap_or(false)
        && !text(obj, "state").map(is_two_letters).unwrap_or(false)
    {
        findings.warning(path(field, "state"), "US state should be a 2-letter code");
    }

    if present(obj, "city") && !has_state && !has_country {
        findings.warning(path(field, "city"), "city given without state or country");
    }
}
