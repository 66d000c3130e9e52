use thiserror::Error;

use crate::value::ValueError;

/// A validated model rejected a value.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("validation failed for `{model}`{}: {message}", field_suffix(.field))]
pub struct ValidationError {
    pub model: &'static str,
    pub field: Option<&'static str>,
    pub message: String,
}

impl ValidationError {
    pub fn new(model: &'static str, message: impl Into<String>) -> Self {
        Self {
            model,
            field: None,
            message: message.into(),
        }
    }

    pub fn field(model: &'static str, field: &'static str, message: impl Into<String>) -> Self {
        Self {
            model,
            field: Some(field),
            message: message.into(),
        }
    }

    pub(crate) fn from_value_error(model: &'static str, error: ValueError) -> Self {
        Self {
            model,
            field: error.field,
            message: format!("cannot convert {} into {}", error.found, error.expected),
        }
    }
}

fn field_suffix(field: &Option<&'static str>) -> String {
    field.map(|f| format!(".{f}")).unwrap_or_default()
}
