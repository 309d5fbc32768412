//! Request validation
//!
//! Walks a [`CanonicalRequest`] and reports structural problems the remote
//! service would reject, using the same error codes. Stateless, single pass,
//! never mutates the request.
//!
//! # Checks
//! - Global: action object with non-empty `type`; at least one data field
//! - Identity fields (name/email/phone/address/person/personal_identifier)
//!   wherever they occur: root, account, billing, shipping
//! - Device at the root
//! - Group metadata (`created`, `ip_created`, `ip_last`, `ip_history`)
//!
//! When an error and a warning concern the same field (or a sub-field of an
//! errored field) only the error is kept.

mod attributes;
pub mod formats;
mod identity;

use crate::canonical::CanonicalRequest;
use crate::fields::{FieldKind, GroupKind};
use serde::Serialize;
use serde_json::{Map, Value};
use trust_common::{ErrorCode, ValidationFailure, ValidationFinding};

/// Outcome of one validation pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<ValidationFinding>,
    pub warnings: Vec<ValidationFinding>,
}

impl ValidationReport {
    /// Split into warnings (on success) or the full failure
    pub fn into_result(self) -> Result<Vec<ValidationFinding>, ValidationFailure> {
        if self.valid {
            Ok(self.warnings)
        } else {
            Err(ValidationFailure {
                errors: self.errors,
                warnings: self.warnings,
            })
        }
    }

    pub fn has_error_code(&self, code: ErrorCode) -> bool {
        self.errors.iter().any(|e| e.code() == Some(code))
    }
}

/// Accumulates findings during a pass
#[derive(Debug, Default)]
pub(crate) struct Findings {
    errors: Vec<ValidationFinding>,
    warnings: Vec<ValidationFinding>,
}

impl Findings {
    pub(crate) fn error(&mut self, code: ErrorCode, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ValidationFinding::error(code, field, message));
    }

    pub(crate) fn warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ValidationFinding::warning(field, message));
    }

    /// Finish the pass, dropping warnings shadowed by an error
    pub(crate) fn into_report(self) -> ValidationReport {
        let Findings { errors, warnings } = self;

        let warnings: Vec<ValidationFinding> = warnings
            .into_iter()
            .filter(|warning| !errors.iter().any(|error| covers(error.field(), warning.field())))
            .collect();

        ValidationReport {
            valid: errors.is_empty(),
            errors,
            warnings,
        }
    }
}

/// Whether `outer` names the same field as `inner` or one of its parents
fn covers(outer: &str, inner: &str) -> bool {
    inner == outer
        || (inner.starts_with(outer) && inner[outer.len()..].starts_with(['.', '[']))
}

/// Dotted path of `key` under `prefix`
pub(crate) fn path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

/// Key is present with a non-null value
pub(crate) fn present(obj: &Map<String, Value>, key: &str) -> bool {
    obj.get(key).map(|v| !v.is_null()).unwrap_or(false)
}

/// Non-empty trimmed string at `key`
pub(crate) fn text<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    obj.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Stateless validator for canonical requests
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestValidator;

impl RequestValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, request: &CanonicalRequest) -> ValidationReport {
        let mut findings = Findings::default();

        validate_action(request.action.as_ref(), &mut findings);

        if !request.has_data() {
            findings.error(
                ErrorCode::MissingRequiredField,
                "request",
                "at least one data field is required",
            );
        }

        for (kind, value) in &request.fields {
            validate_field(*kind, value, kind.as_str(), &mut findings);
        }

        for kind in GroupKind::IDENTITY {
            if let Some(group) = request.group(kind) {
                validate_identity_group(kind, group, &mut findings);
            }
        }

        let report = findings.into_report();

        tracing::debug!(
            valid = report.valid,
            errors = report.errors.len(),
            warnings = report.warnings.len(),
            "Request validated"
        );

        report
    }
}

fn validate_action(action: Option<&Value>, findings: &mut Findings) {
    let Some(action) = action else {
        findings.error(ErrorCode::ActionRequired, "action", "action is required");
        return;
    };

    let Some(obj) = action.as_object() else {
        findings.error(ErrorCode::InvalidAction, "action", "action must be an object");
        return;
    };

    if text(obj, "type").is_none() {
        findings.error(
            ErrorCode::InvalidAction,
            "action.type",
            "action type must be a non-empty string",
        );
    }
}

/// Dispatch one field value to its kind's rules
fn validate_field(kind: FieldKind, value: &Value, field_path: &str, findings: &mut Findings) {
    match kind {
        FieldKind::Name => identity::validate_name(value, field_path, findings),
        FieldKind::Email => identity::validate_email(value, field_path, findings),
        FieldKind::Phone => identity::validate_phone(value, field_path, findings),
        FieldKind::Address => identity::validate_address(value, field_path, findings),
        FieldKind::Device => attributes::validate_device(value, field_path, findings),
        FieldKind::Person => attributes::validate_person(value, field_path, findings),
        FieldKind::PersonalIdentifier => {
            attributes::validate_personal_identifier(value, field_path, findings)
        }
        FieldKind::Browser
        | FieldKind::Card
        | FieldKind::Order
        | FieldKind::Payment
        | FieldKind::Session
        | FieldKind::Locale
        | FieldKind::Custom
        | FieldKind::Page => {}
    }
}

fn validate_identity_group(kind: GroupKind, group: &Value, findings: &mut Findings) {
    let prefix = kind.as_str();

    let Some(obj) = group.as_object() else {
        findings.error(
            ErrorCode::InvalidField,
            prefix,
            format!("{} must be an object", prefix),
        );
        return;
    };

    for (key, value) in obj {
        if let Ok(field) = key.parse::<FieldKind>() {
            validate_field(field, value, &path(prefix, key), findings);
        }
    }

    attributes::validate_group_metadata(obj, prefix, findings);
}
