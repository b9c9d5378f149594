//! Core error types

use thiserror::Error;

/// Errors raised while converting, validating or serializing attribute values
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValueError {
    #[error("cannot represent {value} as {target} without losing precision")]
    PrecisionLoss { value: String, target: &'static str },

    #[error("invalid number literal: {0}")]
    InvalidNumber(String),

    #[error("{path}: expected {expected}, found {found}")]
    TypeMismatch {
        path: String,
        expected: String,
        found: String,
    },

    #[error("{path}: required attribute is missing")]
    MissingRequired { path: String },

    #[error("{path}: {message}")]
    Validation { path: String, message: String },

    #[error("invalid duration '{value}': {message}")]
    InvalidDuration { value: String, message: String },
}

impl ValueError {
    /// Create a validation error for the attribute at `path`
    pub fn validation(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Attribute path this error refers to, if any
    pub fn path(&self) -> Option<&str> {
        match self {
            ValueError::TypeMismatch { path, .. }
            | ValueError::MissingRequired { path }
            | ValueError::Validation { path, .. } => Some(path),
            _ => None,
        }
    }
}

/// Errors raised while loading attribute values from text
#[derive(Error, Debug)]
pub enum CoreError {
    #[error(transparent)]
    Value(#[from] ValueError),

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ValueError>;
