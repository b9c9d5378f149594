//! Error types for crdform-kube

use crdform_core::ValueError;
use thiserror::Error;

use crate::wait::WaitError;

/// Result type for crdform-kube operations
pub type Result<T> = std::result::Result<T, ProviderError>;

/// Errors that can occur while serving a data source or resource
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProviderError {
    /// Kubernetes API error
    #[error("Kubernetes API error: {0}")]
    Api(#[from] kube::Error),

    /// Object does not exist
    #[error("{target} not found")]
    NotFound { target: String },

    /// Server-side apply refused because another field manager owns the fields
    #[error("apply conflict on {target}: {message}\nHint: set force_conflicts = true to take ownership of the conflicting fields")]
    Conflict { target: String, message: String },

    /// Serializing an object for the API or for YAML output failed
    #[error("failed to marshal {target}: {message}")]
    Marshal { target: String, message: String },

    /// Reading an API response back into attribute values failed
    #[error("failed to unmarshal {target}: {message}")]
    Unmarshal { target: String, message: String },

    /// Attribute value conversion or validation error
    #[error(transparent)]
    Value(#[from] ValueError),

    /// Import identifier could not be parsed
    #[error("invalid import ID '{id}': {reason}")]
    InvalidImportId { id: String, reason: String },

    /// No data source or resource with this name
    #[error("unknown type '{0}'")]
    UnknownType(String),

    /// Provider has no cluster client
    #[error("provider is not configured with a Kubernetes client")]
    NotConfigured,

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Waiting after apply or delete failed
    #[error(transparent)]
    Wait(#[from] WaitError),
}

impl ProviderError {
    /// Check if this is a Kubernetes 404 Not Found error
    pub fn is_not_found(&self) -> bool {
        match self {
            ProviderError::NotFound { .. } => true,
            ProviderError::Api(kube::Error::Api(resp)) => resp.code == 404,
            _ => false,
        }
    }

    /// Check if this is a conflict error (409)
    pub fn is_conflict(&self) -> bool {
        match self {
            ProviderError::Conflict { .. } => true,
            ProviderError::Api(kube::Error::Api(resp)) => resp.code == 409,
            _ => false,
        }
    }

    /// Check if this is a wait timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, ProviderError::Wait(WaitError::Timeout { .. }))
    }

    pub(crate) fn marshal(target: impl Into<String>, err: impl std::fmt::Display) -> Self {
        ProviderError::Marshal {
            target: target.into(),
            message: err.to_string(),
        }
    }

    pub(crate) fn unmarshal(target: impl Into<String>, err: impl std::fmt::Display) -> Self {
        ProviderError::Unmarshal {
            target: target.into(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kube::core::ErrorResponse;

    fn api_error(code: u16) -> ProviderError {
        ProviderError::Api(kube::Error::Api(ErrorResponse {
            status: "Failure".to_string(),
            message: "boom".to_string(),
            reason: "Whatever".to_string(),
            code,
        }))
    }

    #[test]
    fn test_not_found_detection() {
        assert!(api_error(404).is_not_found());
        assert!(
            ProviderError::NotFound {
                target: "Certificate default/web".to_string()
            }
            .is_not_found()
        );
        assert!(!api_error(500).is_not_found());
    }

    #[test]
    fn test_conflict_detection() {
        assert!(api_error(409).is_conflict());
        assert!(!api_error(404).is_conflict());
    }

    #[test]
    fn test_conflict_message_has_hint() {
        let err = ProviderError::Conflict {
            target: "Certificate default/web".to_string(),
            message: "field managed by kubectl".to_string(),
        };
        assert!(err.to_string().contains("force_conflicts"));
    }

    #[test]
    fn test_value_error_is_transparent() {
        let err: ProviderError = ValueError::MissingRequired {
            path: "spec.secret_name".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "spec.secret_name: required attribute is missing");
    }
}
