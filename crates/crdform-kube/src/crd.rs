//! CRD descriptors
//!
//! A [`CrdDescriptor`] is everything the handlers need to serve one custom
//! resource kind: its API coordinates, scope and the attribute schema of
//! `spec`. The shared `metadata` schema lives here too.

use crdform_core::{AttrValue, Attribute, ValueError, from_kube, to_kube, validate_metadata};
use serde_json::{Map, Value, json};

use crate::client::ObjectRef;
use crate::error::{ProviderError, Result};

/// One custom resource kind at one version
#[derive(Debug, Clone, Copy)]
pub struct CrdDescriptor {
    pub group: &'static str,
    pub version: &'static str,
    pub kind: &'static str,
    pub plural: &'static str,
    pub namespaced: bool,
    pub description: &'static str,
    /// Whether configurations must set `spec`
    pub spec_required: bool,
    pub spec: fn() -> Vec<Attribute>,
}

impl CrdDescriptor {
    pub fn api_version(&self) -> String {
        format!("{}/{}", self.group, self.version)
    }

    /// `k8s_<group>_<kind>_<version>`, e.g. `k8s_cert_manager_io_certificate_v1`
    pub fn type_name(&self) -> String {
        format!(
            "k8s_{}_{}_{}",
            self.group.replace(['.', '-'], "_"),
            kind_to_snake(self.kind),
            self.version
        )
    }

    pub fn manifest_type_name(&self) -> String {
        format!("{}_manifest", self.type_name())
    }

    pub fn spec_attributes(&self) -> Vec<Attribute> {
        (self.spec)()
    }

    /// Schema of the `metadata` attribute in configurations
    pub fn metadata_attributes(&self) -> Vec<Attribute> {
        let mut attrs = vec![
            Attribute::string("name")
                .required()
                .describe("Unique name of the object within its namespace or the cluster."),
        ];
        if self.namespaced {
            attrs.push(
                Attribute::string("namespace")
                    .required()
                    .describe("Namespace of the object."),
            );
        }
        attrs.push(
            Attribute::string_map("labels")
                .describe("Map of string keys and values used to organize and select objects."),
        );
        attrs.push(
            Attribute::string_map("annotations")
                .describe("Unstructured key value map stored with the object."),
        );
        attrs
    }

    /// Address of the object named in a `metadata` attribute value
    pub fn target(&self, metadata: &AttrValue) -> Result<ObjectRef> {
        let name = metadata.get_str("name").ok_or_else(|| ValueError::MissingRequired {
            path: "metadata.name".to_string(),
        })?;
        let namespace = if self.namespaced {
            let ns = metadata
                .get_str("namespace")
                .ok_or_else(|| ValueError::MissingRequired {
                    path: "metadata.namespace".to_string(),
                })?;
            Some(ns.to_string())
        } else {
            None
        };
        Ok(self.object_ref(namespace, name.to_string()))
    }

    pub fn object_ref(&self, namespace: Option<String>, name: String) -> ObjectRef {
        ObjectRef {
            group: self.group.to_string(),
            version: self.version.to_string(),
            kind: self.kind.to_string(),
            plural: self.plural.to_string(),
            namespace,
            name,
        }
    }

    /// Parse an import ID: `namespace/name`, or `name` for cluster-scoped kinds
    pub fn parse_id(&self, id: &str) -> Result<ObjectRef> {
        let invalid = |reason: &str| ProviderError::InvalidImportId {
            id: id.to_string(),
            reason: reason.to_string(),
        };

        if self.namespaced {
            match id.split_once('/') {
                Some((ns, name)) if !ns.is_empty() && !name.is_empty() && !name.contains('/') => {
                    Ok(self.object_ref(Some(ns.to_string()), name.to_string()))
                }
                _ => Err(invalid("expected <namespace>/<name>")),
            }
        } else if id.is_empty() || id.contains('/') {
            Err(invalid("expected <name> for a cluster-scoped resource"))
        } else {
            Ok(self.object_ref(None, id.to_string()))
        }
    }

    /// Validate `metadata` and `spec` and assemble the Kubernetes object
    pub fn build_object(&self, metadata: &AttrValue, spec: &AttrValue) -> Result<Value> {
        validate_metadata(metadata, self.namespaced)?;

        let mut object = Map::new();
        object.insert("apiVersion".to_string(), json!(self.api_version()));
        object.insert("kind".to_string(), json!(self.kind));
        object.insert(
            "metadata".to_string(),
            to_kube(&self.metadata_attributes(), metadata, "metadata")?,
        );

        if spec.is_null() && self.spec_required {
            return Err(ValueError::MissingRequired {
                path: "spec".to_string(),
            }
            .into());
        }
        if spec.is_known() {
            object.insert(
                "spec".to_string(),
                to_kube(&self.spec_attributes(), spec, "spec")?,
            );
        }
        Ok(Value::Object(object))
    }

    /// Read `metadata` and `spec` back from an object returned by the API
    pub fn read_object(&self, object: &Value) -> Result<(AttrValue, AttrValue)> {
        let metadata = from_kube(&self.metadata_attributes(), &object["metadata"], "metadata")?;
        let spec = if object["spec"].is_null() {
            AttrValue::Null
        } else {
            from_kube(&self.spec_attributes(), &object["spec"], "spec")?
        };
        Ok((metadata, spec))
    }
}

/// `ServiceMonitor` -> `service_monitor`
pub fn kind_to_snake(kind: &str) -> String {
    let mut out = String::with_capacity(kind.len() + 4);
    let chars: Vec<char> = kind.chars().collect();
    for (i, c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev_lower = i > 0 && !chars[i - 1].is_uppercase();
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if i > 0 && (prev_lower || (next_lower && chars[i - 1].is_uppercase())) {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(*c);
        }
    }
    out
}
