//! Manifest data sources (`<type>_manifest`)
//!
//! Render a configuration into Kubernetes YAML without touching a cluster.

use std::collections::BTreeMap;

use crdform_core::{AttrValue, Attribute, Schema};

use crate::crd::CrdDescriptor;
use crate::error::{ProviderError, Result};
use crate::state::{check_config, complete};

pub struct ManifestDataSource {
    crd: &'static CrdDescriptor,
    schema: Schema,
}

impl ManifestDataSource {
    pub fn new(crd: &'static CrdDescriptor) -> Self {
        let mut spec = Attribute::object("spec", crd.spec_attributes())
            .describe("Specification of the desired behavior of the object.");
        if crd.spec_required {
            spec = spec.required();
        }

        let schema = Schema::new(&format!(
            "Creates a manifest for a {}/{} {}. {}",
            crd.group, crd.version, crd.kind, crd.description
        ))
        .with_attribute(
            Attribute::string("id")
                .computed()
                .describe("Contains the value `metadata.namespace/metadata.name`."),
        )
        .with_attribute(
            Attribute::object("metadata", crd.metadata_attributes())
                .required()
                .describe("Data that helps uniquely identify this object."),
        )
        .with_attribute(spec)
        .with_attribute(
            Attribute::string("yaml")
                .computed()
                .describe("The generated manifest in YAML format."),
        );

        Self { crd, schema }
    }

    pub fn type_name(&self) -> String {
        self.crd.manifest_type_name()
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn read(&self, config: &AttrValue) -> Result<AttrValue> {
        check_config(&self.schema, config)?;

        let metadata = config.get("metadata");
        let spec = config.get("spec");
        let object = self.crd.build_object(metadata, spec)?;
        let target = self.crd.target(metadata)?;

        let yaml = serde_yaml::to_string(&object)
            .map_err(|e| ProviderError::marshal(target.to_string(), e))?;
        tracing::debug!(object = %target, "rendered manifest");

        let mut values = BTreeMap::new();
        values.insert("id".to_string(), AttrValue::from(target.id()));
        values.insert("metadata".to_string(), metadata.clone());
        values.insert("spec".to_string(), spec.clone());
        values.insert("yaml".to_string(), AttrValue::from(yaml));
        Ok(complete(&self.schema, values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crds::{cert_manager, flagger};

    fn config(text: &str) -> AttrValue {
        AttrValue::from_yaml_str(text).unwrap()
    }

    #[test]
    fn test_certificate_manifest() {
        let source = ManifestDataSource::new(&cert_manager::CERTIFICATE_V1);
        let state = source
            .read(&config(
                r#"
metadata:
  name: web
  namespace: default
  labels:
    app.kubernetes.io/name: web
spec:
  secret_name: web-tls
  dns_names:
    - web.example.com
  is_ca: false
  issuer_ref:
    name: letsencrypt
    kind: ClusterIssuer
  private_key:
    algorithm: ECDSA
    size: 256
"#,
            ))
            .unwrap();

        assert_eq!(state.get_str("id"), Some("default/web"));
        insta::assert_snapshot!(state.get_str("yaml").unwrap(), @r"
        apiVersion: cert-manager.io/v1
        kind: Certificate
        metadata:
          labels:
            app.kubernetes.io/name: web
          name: web
          namespace: default
        spec:
          dnsNames:
          - web.example.com
          isCA: false
          issuerRef:
            kind: ClusterIssuer
            name: letsencrypt
          privateKey:
            algorithm: ECDSA
            size: 256
          secretName: web-tls
        ");
    }

    #[test]
    fn test_canary_numbers_and_int_or_string() {
        let source = ManifestDataSource::new(&flagger::CANARY_V1BETA1);
        let state = source
            .read(&config(
                r#"
metadata:
  name: podinfo
  namespace: test
spec:
  target_ref:
    api_version: apps/v1
    kind: Deployment
    name: podinfo
  service:
    port: 9898
    target_port: "9898"
  analysis:
    metrics:
      - name: request-success-rate
        threshold_range:
          min: 99
      - name: request-duration
        threshold_range:
          max: 0.5
"#,
            ))
            .unwrap();

        let yaml: serde_json::Value = serde_yaml::from_str(state.get_str("yaml").unwrap()).unwrap();
        let metrics = &yaml["spec"]["analysis"]["metrics"];
        assert_eq!(metrics[0]["thresholdRange"]["min"], serde_json::json!(99));
        assert!(metrics[0]["thresholdRange"]["min"].is_i64());
        assert_eq!(metrics[1]["thresholdRange"]["max"], serde_json::json!(0.5));
        assert_eq!(yaml["spec"]["service"]["targetPort"], serde_json::json!(9898));
        assert_eq!(yaml["spec"]["targetRef"]["apiVersion"], "apps/v1");
    }

    #[test]
    fn test_cluster_scoped_rejects_namespace() {
        let source = ManifestDataSource::new(&cert_manager::CLUSTER_ISSUER_V1);
        let err = source
            .read(&config(
                r#"
metadata:
  name: letsencrypt
  namespace: default
spec:
  self_signed: {}
"#,
            ))
            .unwrap_err();
        assert!(matches!(err, ProviderError::Value(_)));
    }

    #[test]
    fn test_missing_spec() {
        let source = ManifestDataSource::new(&cert_manager::CERTIFICATE_V1);
        let err = source
            .read(&config("metadata:\n  name: web\n  namespace: default\n"))
            .unwrap_err();
        assert_eq!(err.to_string(), "spec: required attribute is missing");
    }

    #[test]
    fn test_schema_shape() {
        let source = ManifestDataSource::new(&cert_manager::CLUSTER_ISSUER_V1);
        assert_eq!(
            source.type_name(),
            "k8s_cert_manager_io_cluster_issuer_v1_manifest"
        );
        let names: Vec<&str> = source
            .schema()
            .attributes
            .iter()
            .map(|a| a.name.as_str())
            .collect();
        assert_eq!(names, vec!["id", "metadata", "spec", "yaml"]);
    }
}
