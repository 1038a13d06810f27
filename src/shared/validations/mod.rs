//! User payload validation
//!
//! Runs the `validator` rules declared on [`UserPayload`] and flattens the
//! result into a deterministic, field-sorted report.

use std::fmt;

use thiserror::Error;
use validator::Validate;

use crate::domain::UserPayload;

/// A single failed field constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: String,
    /// Validator rule code (`length`, `email`, ...)
    pub code: String,
    pub message: String,
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every failing constraint of a payload, sorted by field name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", render(.violations))]
pub struct UserValidationError {
    pub violations: Vec<FieldViolation>,
}

impl UserValidationError {
    pub fn has_field(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }
}

fn render(violations: &[FieldViolation]) -> String {
    if violations.is_empty() {
        return "Validation failed".to_string();
    }
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<validator::ValidationErrors> for UserValidationError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut violations: Vec<FieldViolation> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                let field = field.to_string();
                errs.iter().map(move |e| FieldViolation {
                    field: field.clone(),
                    code: e.code.to_string(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("failed '{}' rule", e.code)),
                })
            })
            .collect();

        violations.sort_by(|a, b| a.field.cmp(&b.field).then_with(|| a.code.cmp(&b.code)));
        Self { violations }
    }
}

/// Checks `name` length in [3, 32] and `email` format.
///
/// Pure: no I/O, the payload is not modified.
pub fn validate_user(user: &UserPayload) -> Result<(), UserValidationError> {
    user.validate().map_err(UserValidationError::from)
}
