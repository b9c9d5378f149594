//! Resources: manage an object with server-side apply
//!
//! Besides `metadata` and `spec`, every resource carries bookkeeping
//! attributes that control how it is applied and removed:
//! `field_manager`, `force_conflicts`, `deletion_propagation`,
//! `wait_for_upsert` and `wait_for_delete`.

use std::collections::BTreeMap;
use std::sync::Arc;

use crdform_core::{AttrValue, Attribute, Schema, ValueError, format_duration};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::client::{ApplyParams, DeletionPropagation, DynamicClient, ObjectRef};
use crate::crd::CrdDescriptor;
use crate::error::Result;
use crate::jsonpath::JsonPath;
use crate::state::{check_plan, complete};
use crate::wait::{PollConfig, WaitCondition, wait_for_condition, wait_for_deletion};

/// Field manager used when none is configured
pub const DEFAULT_FIELD_MANAGER: &str = "crdform";

/// Bookkeeping attributes of a resource, with defaults applied
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceSettings {
    pub field_manager: String,
    pub force_conflicts: bool,
    pub deletion_propagation: DeletionPropagation,
    pub wait_for_upsert: Vec<WaitCondition>,
    pub wait_for_delete: Option<PollConfig>,
}

impl Default for ResourceSettings {
    fn default() -> Self {
        Self {
            field_manager: DEFAULT_FIELD_MANAGER.to_string(),
            force_conflicts: false,
            deletion_propagation: DeletionPropagation::default(),
            wait_for_upsert: Vec::new(),
            wait_for_delete: None,
        }
    }
}

fn optional_str<'a>(value: &'a AttrValue, path: &str) -> std::result::Result<Option<&'a str>, ValueError> {
    match value {
        AttrValue::Null | AttrValue::Unknown => Ok(None),
        AttrValue::String(s) => Ok(Some(s.as_str())),
        other => Err(ValueError::TypeMismatch {
            path: path.to_string(),
            expected: "string".to_string(),
            found: other.type_name().to_string(),
        }),
    }
}

fn poll_config(entry: &AttrValue, path: &str) -> std::result::Result<PollConfig, ValueError> {
    let timeout = optional_str(entry.get("timeout"), &format!("{path}.timeout"))?;
    let interval = optional_str(entry.get("poll_interval"), &format!("{path}.poll_interval"))?;
    PollConfig::parse(timeout, interval).map_err(|e| ValueError::validation(path, e.to_string()))
}

impl ResourceSettings {
    /// Read the bookkeeping attributes of a plan or state
    pub fn from_config(config: &AttrValue) -> std::result::Result<Self, ValueError> {
        let mut settings = Self::default();

        if let Some(manager) = optional_str(config.get("field_manager"), "field_manager")? {
            if manager.is_empty() {
                return Err(ValueError::validation("field_manager", "must not be empty"));
            }
            settings.field_manager = manager.to_string();
        }

        match config.get("force_conflicts") {
            AttrValue::Bool(force) => settings.force_conflicts = *force,
            AttrValue::Null | AttrValue::Unknown => {}
            other => {
                return Err(ValueError::TypeMismatch {
                    path: "force_conflicts".to_string(),
                    expected: "bool".to_string(),
                    found: other.type_name().to_string(),
                });
            }
        }

        if let Some(propagation) =
            optional_str(config.get("deletion_propagation"), "deletion_propagation")?
        {
            settings.deletion_propagation = propagation
                .parse()
                .map_err(|msg: String| ValueError::validation("deletion_propagation", msg))?;
        }

        let upsert = config.get("wait_for_upsert");
        if let Some(entries) = upsert.as_sequence() {
            for (i, entry) in entries.iter().enumerate() {
                let path = format!("wait_for_upsert[{i}]");
                let jsonpath = optional_str(entry.get("jsonpath"), &format!("{path}.jsonpath"))?
                    .ok_or_else(|| ValueError::MissingRequired {
                        path: format!("{path}.jsonpath"),
                    })?;
                JsonPath::parse(jsonpath)
                    .map_err(|e| ValueError::validation(format!("{path}.jsonpath"), e.to_string()))?;
                let value = optional_str(entry.get("value"), &format!("{path}.value"))?
                    .ok_or_else(|| ValueError::MissingRequired {
                        path: format!("{path}.value"),
                    })?;

                settings.wait_for_upsert.push(WaitCondition {
                    jsonpath: jsonpath.to_string(),
                    value: value.to_string(),
                    poll: poll_config(entry, &path)?,
                });
            }
        } else if upsert.is_known() {
            return Err(ValueError::TypeMismatch {
                path: "wait_for_upsert".to_string(),
                expected: "list".to_string(),
                found: upsert.type_name().to_string(),
            });
        }

        let delete = config.get("wait_for_delete");
        if delete.as_mapping().is_some() {
            settings.wait_for_delete = Some(poll_config(delete, "wait_for_delete")?);
        } else if delete.is_known() {
            return Err(ValueError::TypeMismatch {
                path: "wait_for_delete".to_string(),
                expected: "object".to_string(),
                found: delete.type_name().to_string(),
            });
        }

        Ok(settings)
    }

    /// Record the effective settings in a state object
    pub fn write_defaults(&self, state: &mut AttrValue) {
        state.set("field_manager", AttrValue::from(self.field_manager.as_str()));
        state.set("force_conflicts", AttrValue::from(self.force_conflicts));
        state.set(
            "deletion_propagation",
            AttrValue::from(self.deletion_propagation.as_str()),
        );

        let Some(entries) = state.as_mapping_mut() else {
            return;
        };

        if let Some(upsert) = entries.get_mut("wait_for_upsert")
            && let Some(items) = upsert.as_sequence()
        {
            let items = items
                .iter()
                .zip(&self.wait_for_upsert)
                .map(|(item, condition)| with_durations(item, &condition.poll))
                .collect();
            *upsert = AttrValue::List(items);
        }

        if let (Some(delete), Some(poll)) = (entries.get_mut("wait_for_delete"), &self.wait_for_delete)
            && delete.as_mapping().is_some()
        {
            *delete = with_durations(delete, poll);
        }
    }
}

fn with_durations(entry: &AttrValue, poll: &PollConfig) -> AttrValue {
    let mut entry = entry.clone();
    if entry.get("timeout").is_null() {
        entry.set("timeout", AttrValue::from(format_duration(poll.timeout)));
    }
    if entry.get("poll_interval").is_null() {
        entry.set("poll_interval", AttrValue::from(format_duration(poll.poll_interval)));
    }
    entry
}

fn poll_attributes() -> Vec<Attribute> {
    vec![
        Attribute::string("timeout")
            .optional_computed()
            .describe("How long to wait, e.g. '30s' or '1m30s'. Defaults to '30s'."),
        Attribute::string("poll_interval")
            .optional_computed()
            .describe("Time between checks. Defaults to '5s'."),
    ]
}

pub struct Resource {
    crd: &'static CrdDescriptor,
    client: Arc<dyn DynamicClient>,
    schema: Schema,
}

impl Resource {
    pub fn new(crd: &'static CrdDescriptor, client: Arc<dyn DynamicClient>) -> Self {
        Self {
            crd,
            client,
            schema: Self::build_schema(crd),
        }
    }

    pub fn build_schema(crd: &CrdDescriptor) -> Schema {
        let mut spec = Attribute::object("spec", crd.spec_attributes())
            .describe("Specification of the desired behavior of the object.");
        if crd.spec_required {
            spec = spec.required();
        }

        let mut wait_condition = vec![
            Attribute::string("jsonpath")
                .required()
                .describe("JSONPath expression selecting a field, e.g. '{.status.phase}'."),
            Attribute::string("value")
                .required()
                .describe("Value the selected field must have."),
        ];
        wait_condition.extend(poll_attributes());

        Schema::new(&format!(
            "Manages a {}/{} {}. {}",
            crd.group, crd.version, crd.kind, crd.description
        ))
        .with_attribute(
            Attribute::string("id")
                .computed()
                .describe("Contains the value `metadata.namespace/metadata.name`."),
        )
        .with_attribute(Attribute::string("api_version").computed())
        .with_attribute(Attribute::string("kind").computed())
        .with_attribute(
            Attribute::object("metadata", crd.metadata_attributes())
                .required()
                .describe("Data that helps uniquely identify this object."),
        )
        .with_attribute(spec)
        .with_attribute(
            Attribute::string("field_manager")
                .optional_computed()
                .describe("The name of the manager used to track field ownership. Defaults to 'crdform'."),
        )
        .with_attribute(
            Attribute::bool("force_conflicts")
                .optional_computed()
                .describe("If true, server-side apply will force the changes against conflicts."),
        )
        .with_attribute(
            Attribute::string("deletion_propagation")
                .optional_computed()
                .describe("Orphan, Background or Foreground. Defaults to 'Foreground'."),
        )
        .with_attribute(
            Attribute::object_list("wait_for_upsert", wait_condition)
                .describe("Conditions to wait for after the object was created or updated."),
        )
        .with_attribute(
            Attribute::object("wait_for_delete", poll_attributes())
                .describe("Wait until the object is gone after requesting deletion."),
        )
    }

    pub fn type_name(&self) -> String {
        self.crd.type_name()
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub async fn create(&self, plan: &AttrValue, cancel: &CancellationToken) -> Result<AttrValue> {
        self.upsert(plan, cancel).await
    }

    pub async fn update(&self, plan: &AttrValue, cancel: &CancellationToken) -> Result<AttrValue> {
        self.upsert(plan, cancel).await
    }

    async fn upsert(&self, plan: &AttrValue, cancel: &CancellationToken) -> Result<AttrValue> {
        check_plan(&self.schema, plan)?;
        let settings = ResourceSettings::from_config(plan)?;

        let metadata = plan.get("metadata");
        let object = self.crd.build_object(metadata, plan.get("spec"))?;
        let target = self.crd.target(metadata)?;

        tracing::info!(
            object = %target,
            field_manager = %settings.field_manager,
            force = settings.force_conflicts,
            "applying"
        );
        let applied = self
            .client
            .apply(
                &target,
                &object,
                &ApplyParams {
                    field_manager: settings.field_manager.clone(),
                    force: settings.force_conflicts,
                },
            )
            .await?;
        // State follows the last object seen, so server-side defaults that
        // appear while waiting are recorded too.
        let mut latest = applied;
        for condition in &settings.wait_for_upsert {
            tracing::info!(
                object = %target,
                jsonpath = %condition.jsonpath,
                value = %condition.value,
                "waiting for condition"
            );
            latest = wait_for_condition(self.client.as_ref(), &target, condition, cancel).await?;
        }

        self.state_from(&target, &latest, plan, &settings)
    }

    /// Refresh state from the cluster. `None` means the object is gone.
    pub async fn read(&self, state: &AttrValue) -> Result<Option<AttrValue>> {
        let settings = ResourceSettings::from_config(state)?;
        let target = self.crd.target(state.get("metadata"))?;

        match self.client.get(&target).await {
            Ok(object) => self
                .state_from(&target, &object, state, &settings)
                .map(Some),
            Err(e) if e.is_not_found() => {
                tracing::info!(object = %target, "object no longer exists");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn delete(&self, state: &AttrValue, cancel: &CancellationToken) -> Result<()> {
        let settings = ResourceSettings::from_config(state)?;
        let target = self.crd.target(state.get("metadata"))?;

        tracing::info!(
            object = %target,
            propagation = %settings.deletion_propagation,
            "deleting"
        );
        match self.client.delete(&target, settings.deletion_propagation).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                tracing::debug!(object = %target, "already deleted");
                return Ok(());
            }
            Err(e) => return Err(e),
        }

        if let Some(poll) = settings.wait_for_delete {
            wait_for_deletion(self.client.as_ref(), &target, poll, cancel).await?;
        }
        Ok(())
    }

    /// Build a full state for an existing object from `namespace/name` (or `name`)
    pub async fn import(&self, id: &str) -> Result<AttrValue> {
        let target = self.crd.parse_id(id)?;
        tracing::info!(object = %target, "importing");
        let object = self.client.get(&target).await?;
        self.state_from(
            &target,
            &object,
            &AttrValue::Object(BTreeMap::new()),
            &ResourceSettings::default(),
        )
    }

    /// Attributes whose change forces the object to be recreated
    pub fn requires_replace(&self, prior: &AttrValue, planned: &AttrValue) -> Vec<String> {
        if !prior.is_known() {
            return Vec::new();
        }
        ["name", "namespace"]
            .into_iter()
            .filter(|key| prior.get("metadata").get(key) != planned.get("metadata").get(key))
            .map(|key| format!("metadata.{key}"))
            .collect()
    }

    fn state_from(
        &self,
        target: &ObjectRef,
        object: &Value,
        base: &AttrValue,
        settings: &ResourceSettings,
    ) -> Result<AttrValue> {
        let (metadata, spec) = self.crd.read_object(object)?;

        let mut values = base.as_mapping().cloned().unwrap_or_default();
        values.insert("id".to_string(), AttrValue::from(target.id()));
        values.insert(
            "api_version".to_string(),
            AttrValue::from(
                object["apiVersion"]
                    .as_str()
                    .map_or_else(|| target.api_version(), str::to_string),
            ),
        );
        values.insert(
            "kind".to_string(),
            AttrValue::from(object["kind"].as_str().unwrap_or(&target.kind)),
        );
        values.insert("metadata".to_string(), metadata);
        values.insert("spec".to_string(), spec);

        let mut state = complete(&self.schema, values);
        settings.write_defaults(&mut state);
        Ok(state)
    }
}
