//! User-facing diagnostics
//!
//! Handlers return [`ProviderError`]; this module turns those into the
//! summary/detail pairs shown to users, in the shape of Terraform
//! diagnostics.

use serde::Serialize;

use crate::error::ProviderError;
use crate::wait::WaitError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// The handler operation that produced an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Read,
    Create,
    Update,
    Delete,
    Import,
    Render,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub summary: String,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
}

impl Diagnostic {
    pub fn error(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            summary: summary.into(),
            detail: detail.into(),
            attribute: None,
        }
    }

    pub fn warning(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(summary, detail)
        }
    }

    pub fn with_attribute(mut self, path: impl Into<String>) -> Self {
        self.attribute = Some(path.into());
        self
    }
}

impl ProviderError {
    /// Describe this error for users
    pub fn to_diagnostic(&self, operation: Operation) -> Diagnostic {
        let detail = self.to_string();
        match self {
            ProviderError::NotFound { .. } => Diagnostic::error("Unable to find resource", detail),
            ProviderError::Conflict { .. } => {
                Diagnostic::error("Server-side apply conflict", detail)
            }
            ProviderError::Marshal { .. } => Diagnostic::error("Unable to marshal resource", detail),
            ProviderError::Unmarshal { .. } => {
                Diagnostic::error("Unable to unmarshal resource", detail)
            }
            ProviderError::Value(err) => {
                let diag = Diagnostic::error("Invalid attribute value", detail);
                match err.path() {
                    Some(path) => diag.with_attribute(path),
                    None => diag,
                }
            }
            ProviderError::InvalidImportId { .. } => {
                Diagnostic::error("Unexpected import identifier", detail)
            }
            ProviderError::UnknownType(_) => Diagnostic::error("Unknown type", detail),
            ProviderError::NotConfigured => {
                Diagnostic::error("Unconfigured Kubernetes client", detail)
            }
            ProviderError::InvalidConfig(_) => Diagnostic::error("Invalid configuration", detail),
            ProviderError::Wait(WaitError::Fetch(inner)) => inner.to_diagnostic(Operation::Read),
            ProviderError::Wait(WaitError::Timeout { .. }) => {
                Diagnostic::error("Timed out waiting for resource", detail)
            }
            ProviderError::Wait(WaitError::Cancelled { .. }) => {
                Diagnostic::error("Operation cancelled", detail)
            }
            ProviderError::Wait(WaitError::InvalidCondition(_)) => {
                Diagnostic::error("Invalid wait condition", detail)
            }
            ProviderError::Api(_) => {
                let summary = match operation {
                    Operation::Read | Operation::Import | Operation::Render => {
                        "Unable to GET resource"
                    }
                    Operation::Create | Operation::Update => "Unable to PATCH resource",
                    Operation::Delete => "Unable to DELETE resource",
                };
                Diagnostic::error(summary, detail)
            }
        }
    }
}
