//! crdform Kube - data sources and resources for Kubernetes custom resources
//!
//! Every CRD is exposed three ways:
//! - a manifest data source that renders YAML offline
//! - a data source that reads an existing object
//! - a resource that manages the object with server-side apply, optionally
//!   waiting for conditions after apply and for removal after delete
//!
//! All cluster access goes through the [`DynamicClient`] trait.

pub mod client;
pub mod crd;
pub mod crds;
pub mod data_source;
pub mod diagnostics;
pub mod error;
pub mod jsonpath;
pub mod manifest;
pub mod mock;
pub mod provider;
pub mod resource;
mod state;
pub mod wait;

pub use client::{ApplyParams, DeletionPropagation, DynamicClient, KubeDynamicClient, ObjectRef};
pub use crd::CrdDescriptor;
pub use data_source::DataSource;
pub use diagnostics::{Diagnostic, Operation, Severity};
pub use error::{ProviderError, Result};
pub use jsonpath::{JsonPath, JsonPathError};
pub use manifest::ManifestDataSource;
pub use mock::MockDynamicClient;
pub use provider::{HandlerKind, Provider};
pub use resource::{DEFAULT_FIELD_MANAGER, Resource, ResourceSettings};
pub use wait::{PollConfig, WaitCondition, WaitError};
