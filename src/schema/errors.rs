//! Structural-violation error raised by schema validation.

use thiserror::Error;

/// A single structural violation: the first one found wins, and the save
/// that triggered validation is aborted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("document validation failed at field '{field}': expected {expected}, got {actual}")]
pub struct ValidationError {
    /// Dotted field path, e.g. `"address.city"` or `"tags[1]"`
    pub field: String,
    /// Expected type or condition
    pub expected: String,
    /// What was actually found
    pub actual: String,
}

impl ValidationError {
    pub fn new(
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::new(field, "field to be present", "missing")
    }

    pub fn unknown_field(field: impl Into<String>) -> Self {
        Self::new(field, "no undeclared fields", "undeclared field present")
    }

    pub fn type_mismatch(
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::new(field, expected, actual)
    }

    pub fn null_value(field: impl Into<String>) -> Self {
        Self::new(field, "non-null value", "null")
    }
}
