//! CLI error types with exit code handling
//!
//! Every failure is mapped onto a [`CliError`] variant, which decides the
//! process exit code.

use crdform_core::CoreError;
use crdform_kube::{Operation, ProviderError, WaitError};
use miette::Diagnostic;
use thiserror::Error;

use crate::exit_codes;

#[derive(Error, Debug, Diagnostic, Clone)]
pub enum CliError {
    /// Configuration or attribute values rejected
    #[error("{summary}: {message}")]
    #[diagnostic(code(crdform::cli::validation))]
    Validation {
        summary: String,
        message: String,
        #[help]
        help: Option<String>,
    },

    /// The Kubernetes API refused the request or could not be reached
    #[error("{summary}: {message}")]
    #[diagnostic(code(crdform::cli::kube))]
    Kube {
        summary: String,
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("{summary}: {message}")]
    #[diagnostic(code(crdform::cli::timeout))]
    Timeout { summary: String, message: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(crdform::cli::io))]
    Io { message: String },

    /// Unknown type names and similar command line mistakes
    #[error("{message}")]
    #[diagnostic(code(crdform::cli::usage))]
    Usage {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("{summary}: {message}")]
    #[diagnostic(code(crdform::cli::error))]
    Other { summary: String, message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Validation { .. } => exit_codes::VALIDATION_ERROR,
            CliError::Kube { .. } => exit_codes::KUBE_ERROR,
            CliError::Timeout { .. } => exit_codes::TIMEOUT_ERROR,
            CliError::Io { .. } => exit_codes::IO_ERROR,
            CliError::Usage { .. } => exit_codes::USAGE_ERROR,
            CliError::Other { .. } => exit_codes::ERROR,
        }
    }

    pub fn validation(summary: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            summary: summary.into(),
            message: message.into(),
            help: None,
        }
    }

    pub fn usage(message: impl Into<String>, help: Option<String>) -> Self {
        Self::Usage {
            message: message.into(),
            help,
        }
    }

    /// Classify a handler error raised during `operation`
    pub fn provider(err: &ProviderError, operation: Operation) -> Self {
        let diag = err.to_diagnostic(operation);
        let summary = diag.summary;
        let message = diag.detail;
        let help = diag.attribute.map(|path| format!("check attribute `{path}`"));

        match err {
            ProviderError::Wait(WaitError::Fetch(inner)) => Self::provider(inner, Operation::Read),
            ProviderError::Value(_)
            | ProviderError::InvalidImportId { .. }
            | ProviderError::InvalidConfig(_)
            | ProviderError::Wait(WaitError::InvalidCondition(_)) => Self::Validation {
                summary,
                message,
                help,
            },
            ProviderError::UnknownType(_) => Self::Usage {
                message,
                help: Some("run `crdform types` to list the available types".to_string()),
            },
            ProviderError::Wait(WaitError::Timeout { .. }) => Self::Timeout { summary, message },
            ProviderError::Api(_)
            | ProviderError::NotFound { .. }
            | ProviderError::Conflict { .. }
            | ProviderError::NotConfigured => Self::Kube {
                summary,
                message,
                help,
            },
            _ => Self::Other { summary, message },
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io {
            message: err.to_string(),
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        CliError::validation("Invalid configuration file", err.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::validation("Invalid state file", err.to_string())
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Attach the operation to handler errors
pub trait ProviderResultExt<T> {
    fn during(self, operation: Operation) -> Result<T>;
}

impl<T> ProviderResultExt<T> for crdform_kube::Result<T> {
    fn during(self, operation: Operation) -> Result<T> {
        self.map_err(|err| CliError::provider(&err, operation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crdform_core::ValueError;
    use std::time::Duration;

    #[test]
    fn test_exit_codes() {
        let timeout = ProviderError::Wait(WaitError::Timeout {
            condition: "deletion of Certificate default/web".to_string(),
            waited: Duration::from_secs(30),
            attempts: 7,
        });
        assert_eq!(
            CliError::provider(&timeout, Operation::Delete).exit_code(),
            exit_codes::TIMEOUT_ERROR
        );

        let invalid = ProviderError::Value(ValueError::validation("metadata.name", "bad"));
        let err = CliError::provider(&invalid, Operation::Create);
        assert_eq!(err.exit_code(), exit_codes::VALIDATION_ERROR);
        match err {
            CliError::Validation { help, .. } => {
                assert_eq!(help.as_deref(), Some("check attribute `metadata.name`"))
            }
            other => panic!("unexpected: {other:?}"),
        }

        let missing = ProviderError::NotFound {
            target: "Certificate default/web".to_string(),
        };
        assert_eq!(
            CliError::provider(&missing, Operation::Read).exit_code(),
            exit_codes::KUBE_ERROR
        );
        assert_eq!(
            CliError::provider(&ProviderError::UnknownType("x".into()), Operation::Read)
                .exit_code(),
            exit_codes::USAGE_ERROR
        );
    }

    #[test]
    fn test_fetch_error_classified_by_cause() {
        let err = ProviderError::Wait(WaitError::Fetch(Box::new(ProviderError::NotConfigured)));
        assert_eq!(
            CliError::provider(&err, Operation::Create).exit_code(),
            exit_codes::KUBE_ERROR
        );
    }
}
