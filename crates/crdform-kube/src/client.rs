//! Dynamic access to custom resources
//!
//! Handlers never talk to `kube` directly: they go through [`DynamicClient`],
//! which works on untyped JSON objects addressed by an [`ObjectRef`]. The
//! production implementation is [`KubeDynamicClient`]; tests use
//! [`crate::mock::MockDynamicClient`].

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use kube::{
    Client,
    api::{Api, DeleteParams, DynamicObject, Patch, PatchParams, PropagationPolicy},
    config::KubeConfigOptions,
    discovery::ApiResource,
};
use serde_json::Value;

use crate::error::{ProviderError, Result};

/// Address of a single custom resource object
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectRef {
    pub group: String,
    pub version: String,
    pub kind: String,
    pub plural: String,
    /// None for cluster-scoped kinds
    pub namespace: Option<String>,
    pub name: String,
}

impl ObjectRef {
    /// `group/version`, or just `version` for the core group
    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }

    /// Terraform ID: `namespace/name` or `name`
    pub fn id(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{}/{}", ns, self.name),
            None => self.name.clone(),
        }
    }

    pub fn api_resource(&self) -> ApiResource {
        ApiResource {
            group: self.group.clone(),
            version: self.version.clone(),
            api_version: self.api_version(),
            kind: self.kind.clone(),
            plural: self.plural.clone(),
        }
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.id())
    }
}

/// Server-side apply settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyParams {
    pub field_manager: String,
    pub force: bool,
}

/// What happens to dependents when an object is deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeletionPropagation {
    Orphan,
    Background,
    #[default]
    Foreground,
}

impl DeletionPropagation {
    pub const ALL: [DeletionPropagation; 3] = [
        DeletionPropagation::Orphan,
        DeletionPropagation::Background,
        DeletionPropagation::Foreground,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DeletionPropagation::Orphan => "Orphan",
            DeletionPropagation::Background => "Background",
            DeletionPropagation::Foreground => "Foreground",
        }
    }

    pub fn to_policy(self) -> PropagationPolicy {
        match self {
            DeletionPropagation::Orphan => PropagationPolicy::Orphan,
            DeletionPropagation::Background => PropagationPolicy::Background,
            DeletionPropagation::Foreground => PropagationPolicy::Foreground,
        }
    }
}

impl fmt::Display for DeletionPropagation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeletionPropagation {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| format!("must be one of Orphan, Background, Foreground; got '{s}'"))
    }
}

/// Untyped CRUD over custom resource objects
#[async_trait]
pub trait DynamicClient: Send + Sync {
    /// Fetch an object. Missing objects yield an error for which
    /// [`ProviderError::is_not_found`] holds.
    async fn get(&self, target: &ObjectRef) -> Result<Value>;

    /// Server-side apply `object` and return the object as stored
    async fn apply(&self, target: &ObjectRef, object: &Value, params: &ApplyParams)
    -> Result<Value>;

    /// Request deletion. Returns once the API server accepted the request.
    async fn delete(&self, target: &ObjectRef, propagation: DeletionPropagation) -> Result<()>;
}

/// [`DynamicClient`] backed by a real cluster
#[derive(Clone)]
pub struct KubeDynamicClient {
    client: Client,
}

impl KubeDynamicClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Connect using the local kubeconfig, optionally selecting a context
    pub async fn connect(context: Option<&str>) -> Result<Self> {
        let client = match context {
            None => Client::try_default().await?,
            Some(context) => {
                let options = KubeConfigOptions {
                    context: Some(context.to_string()),
                    ..Default::default()
                };
                let config = kube::Config::from_kubeconfig(&options)
                    .await
                    .map_err(|e| {
                        ProviderError::InvalidConfig(format!(
                            "failed to load kubeconfig context '{context}': {e}"
                        ))
                    })?;
                Client::try_from(config)?
            }
        };
        Ok(Self::new(client))
    }

    fn api(&self, target: &ObjectRef) -> Api<DynamicObject> {
        let resource = target.api_resource();
        match &target.namespace {
            Some(ns) => Api::namespaced_with(self.client.clone(), ns, &resource),
            None => Api::all_with(self.client.clone(), &resource),
        }
    }
}

/// Map API status codes onto the errors handlers branch on
fn classify(err: kube::Error, target: &ObjectRef) -> ProviderError {
    match &err {
        kube::Error::Api(resp) if resp.code == 404 => ProviderError::NotFound {
            target: target.to_string(),
        },
        kube::Error::Api(resp) if resp.code == 409 => ProviderError::Conflict {
            target: target.to_string(),
            message: resp.message.clone(),
        },
        _ => ProviderError::Api(err),
    }
}

fn to_json(object: DynamicObject, target: &ObjectRef) -> Result<Value> {
    serde_json::to_value(object).map_err(|e| ProviderError::unmarshal(target.to_string(), e))
}

#[async_trait]
impl DynamicClient for KubeDynamicClient {
    async fn get(&self, target: &ObjectRef) -> Result<Value> {
        tracing::debug!(object = %target, "GET");
        let object = self
            .api(target)
            .get(&target.name)
            .await
            .map_err(|e| classify(e, target))?;
        to_json(object, target)
    }

    async fn apply(
        &self,
        target: &ObjectRef,
        object: &Value,
        params: &ApplyParams,
    ) -> Result<Value> {
        tracing::debug!(
            object = %target,
            field_manager = %params.field_manager,
            force = params.force,
            "server-side apply"
        );
        let mut patch_params = PatchParams::apply(&params.field_manager);
        patch_params.force = params.force;

        let applied = self
            .api(target)
            .patch(&target.name, &patch_params, &Patch::Apply(object))
            .await
            .map_err(|e| classify(e, target))?;
        to_json(applied, target)
    }

    async fn delete(&self, target: &ObjectRef, propagation: DeletionPropagation) -> Result<()> {
        tracing::debug!(object = %target, propagation = %propagation, "DELETE");
        let params = DeleteParams {
            propagation_policy: Some(propagation.to_policy()),
            ..Default::default()
        };
        self.api(target)
            .delete(&target.name, &params)
            .await
            .map_err(|e| classify(e, target))?;
        Ok(())
    }
}
