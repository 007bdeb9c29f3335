use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One rejected input field and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// A string that is not one of an enumerated field's allowed values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {field} {value:?}, expected one of {expected}")]
pub struct InvalidEnumValue {
    pub field: &'static str,
    pub value: String,
    pub expected: &'static str,
}
