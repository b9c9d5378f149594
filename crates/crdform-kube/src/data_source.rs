//! Data sources: read an existing object from the cluster

use std::collections::BTreeMap;
use std::sync::Arc;

use crdform_core::{AttrValue, Attribute, Schema, validate_metadata};

use crate::client::DynamicClient;
use crate::crd::CrdDescriptor;
use crate::error::Result;
use crate::state::{check_config, complete};

pub struct DataSource {
    crd: &'static CrdDescriptor,
    client: Arc<dyn DynamicClient>,
    schema: Schema,
}

impl DataSource {
    pub fn new(crd: &'static CrdDescriptor, client: Arc<dyn DynamicClient>) -> Self {
        Self {
            crd,
            client,
            schema: Self::build_schema(crd),
        }
    }

    /// Only the object's name (and namespace) can be configured
    pub fn build_schema(crd: &CrdDescriptor) -> Schema {
        let metadata: Vec<Attribute> = crd
            .metadata_attributes()
            .into_iter()
            .map(|a| if a.mode.is_required() { a } else { a.into_computed() })
            .collect();

        Schema::new(&format!(
            "Reads an existing {}/{} {}. {}",
            crd.group, crd.version, crd.kind, crd.description
        ))
        .with_attribute(Attribute::string("id").computed())
        .with_attribute(Attribute::string("api_version").computed())
        .with_attribute(Attribute::string("kind").computed())
        .with_attribute(Attribute::object("metadata", metadata).required())
        .with_attribute(Attribute::object("spec", crd.spec_attributes()).into_computed())
    }

    pub fn type_name(&self) -> String {
        self.crd.type_name()
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub async fn read(&self, config: &AttrValue) -> Result<AttrValue> {
        check_config(&self.schema, config)?;
        let metadata = config.get("metadata");
        validate_metadata(metadata, self.crd.namespaced)?;
        let target = self.crd.target(metadata)?;

        let object = self.client.get(&target).await?;
        let (metadata, spec) = self.crd.read_object(&object)?;

        let mut values = BTreeMap::new();
        values.insert("id".to_string(), AttrValue::from(target.id()));
        values.insert(
            "api_version".to_string(),
            AttrValue::from(object["apiVersion"].as_str().unwrap_or_default()),
        );
        values.insert(
            "kind".to_string(),
            AttrValue::from(object["kind"].as_str().unwrap_or(self.crd.kind)),
        );
        values.insert("metadata".to_string(), metadata);
        values.insert("spec".to_string(), spec);
        Ok(complete(&self.schema, values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crds::monitoring::SERVICE_MONITOR_V1;
    use crate::diagnostics::Operation;
    use crate::mock::MockDynamicClient;
    use crdform_core::AttrMode;
    use serde_json::json;

    fn config(name: &str) -> AttrValue {
        AttrValue::object([(
            "metadata",
            AttrValue::object([
                ("name", AttrValue::from(name)),
                ("namespace", AttrValue::from("monitoring")),
            ]),
        )])
    }

    #[tokio::test]
    async fn test_read_existing() {
        let client = MockDynamicClient::new();
        let target = SERVICE_MONITOR_V1.object_ref(Some("monitoring".to_string()), "web".to_string());
        client.insert(
            &target,
            json!({
                "metadata": {"labels": {"release": "prometheus"}},
                "spec": {
                    "selector": {"matchLabels": {"app": "web"}},
                    "endpoints": [{"port": "metrics", "targetPort": 8080, "interval": "30s"}]
                }
            }),
        );

        let source = DataSource::new(&SERVICE_MONITOR_V1, Arc::new(client));
        let state = source.read(&config("web")).await.unwrap();

        assert_eq!(state.get_str("id"), Some("monitoring/web"));
        assert_eq!(state.get_str("api_version"), Some("monitoring.coreos.com/v1"));
        assert_eq!(state.get_str("kind"), Some("ServiceMonitor"));
        assert_eq!(
            state.get("metadata").get("labels").get_str("release"),
            Some("prometheus")
        );
        let endpoint = &state.get("spec").get("endpoints").as_sequence().unwrap()[0];
        assert_eq!(endpoint.get_str("port"), Some("metrics"));
        assert_eq!(endpoint.get_str("target_port"), Some("8080"));
    }

    #[tokio::test]
    async fn test_read_missing_is_an_error() {
        let source = DataSource::new(&SERVICE_MONITOR_V1, Arc::new(MockDynamicClient::new()));
        let err = source.read(&config("absent")).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(
            err.to_diagnostic(Operation::Read).summary,
            "Unable to find resource"
        );
    }

    #[tokio::test]
    async fn test_invalid_name_fails_before_request() {
        let client = MockDynamicClient::new();
        let source = DataSource::new(&SERVICE_MONITOR_V1, Arc::new(client.clone()));
        assert!(source.read(&config("Not_Valid")).await.is_err());
        assert_eq!(client.operation_counts().gets, 0);
    }

    #[test]
    fn test_schema_is_computed_except_identity() {
        let schema = DataSource::build_schema(&SERVICE_MONITOR_V1);
        assert_eq!(schema.attribute("spec").unwrap().mode, AttrMode::Computed);
        assert_eq!(schema.attribute("metadata").unwrap().mode, AttrMode::Required);
    }
}
