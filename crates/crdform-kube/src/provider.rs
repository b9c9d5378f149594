//! Provider: the registry of data sources and resources

use std::sync::Arc;

use crdform_core::Schema;
use indexmap::IndexMap;

use crate::client::DynamicClient;
use crate::crd::CrdDescriptor;
use crate::crds;
use crate::data_source::DataSource;
use crate::error::{ProviderError, Result};
use crate::manifest::ManifestDataSource;
use crate::resource::Resource;

const MANIFEST_SUFFIX: &str = "_manifest";

/// The three ways a CRD is exposed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerKind {
    Manifest,
    DataSource,
    Resource,
}

pub struct Provider {
    client: Option<Arc<dyn DynamicClient>>,
    crds: IndexMap<String, &'static CrdDescriptor>,
}

impl Provider {
    pub fn new(client: Arc<dyn DynamicClient>) -> Self {
        Self::with_client(Some(client))
    }

    /// A provider without cluster access; only manifest data sources work
    pub fn offline() -> Self {
        Self::with_client(None)
    }

    fn with_client(client: Option<Arc<dyn DynamicClient>>) -> Self {
        let mut provider = Self {
            client,
            crds: IndexMap::new(),
        };
        for crd in crds::ALL {
            provider.register(crd);
        }
        provider
    }

    pub fn register(&mut self, crd: &'static CrdDescriptor) {
        self.crds.insert(crd.type_name(), crd);
    }

    /// Descriptor behind a type name, with or without the `_manifest` suffix
    pub fn crd(&self, type_name: &str) -> Result<&'static CrdDescriptor> {
        let base = type_name.strip_suffix(MANIFEST_SUFFIX).unwrap_or(type_name);
        self.crds
            .get(base)
            .copied()
            .ok_or_else(|| ProviderError::UnknownType(type_name.to_string()))
    }

    /// Registered descriptors, in registration order
    pub fn crds(&self) -> impl Iterator<Item = &'static CrdDescriptor> + '_ {
        self.crds.values().copied()
    }

    /// Names of all data sources, each CRD's plain and manifest variants
    pub fn data_source_names(&self) -> Vec<String> {
        self.crds
            .keys()
            .flat_map(|name| [name.clone(), format!("{name}{MANIFEST_SUFFIX}")])
            .collect()
    }

    pub fn resource_names(&self) -> Vec<String> {
        self.crds.keys().cloned().collect()
    }

    fn client(&self) -> Result<Arc<dyn DynamicClient>> {
        self.client.clone().ok_or(ProviderError::NotConfigured)
    }

    pub fn manifest(&self, type_name: &str) -> Result<ManifestDataSource> {
        if !type_name.ends_with(MANIFEST_SUFFIX) {
            return Err(ProviderError::UnknownType(type_name.to_string()));
        }
        Ok(ManifestDataSource::new(self.crd(type_name)?))
    }

    pub fn data_source(&self, type_name: &str) -> Result<DataSource> {
        let crd = self.plain_crd(type_name)?;
        Ok(DataSource::new(crd, self.client()?))
    }

    pub fn resource(&self, type_name: &str) -> Result<Resource> {
        let crd = self.plain_crd(type_name)?;
        Ok(Resource::new(crd, self.client()?))
    }

    /// Schema of a handler; does not need a cluster client
    pub fn schema(&self, type_name: &str, kind: HandlerKind) -> Result<Schema> {
        match kind {
            HandlerKind::Manifest => Ok(self.manifest(type_name)?.schema().clone()),
            HandlerKind::DataSource => Ok(DataSource::build_schema(self.plain_crd(type_name)?)),
            HandlerKind::Resource => Ok(Resource::build_schema(self.plain_crd(type_name)?)),
        }
    }

    fn plain_crd(&self, type_name: &str) -> Result<&'static CrdDescriptor> {
        if type_name.ends_with(MANIFEST_SUFFIX) {
            return Err(ProviderError::UnknownType(type_name.to_string()));
        }
        self.crd(type_name)
    }
}
