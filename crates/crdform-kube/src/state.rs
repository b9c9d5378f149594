//! Configuration checks and state assembly shared by the handlers

use std::collections::BTreeMap;

use crdform_core::{AttrMode, AttrValue, Schema, ValueError};

use crate::error::Result;

/// Reject undeclared attributes, set computed attributes and missing required ones
pub(crate) fn check_config(schema: &Schema, config: &AttrValue) -> Result<()> {
    check(schema, config, true)
}

/// Like [`check_config`], but computed attributes may carry prior values.
/// Resource plans for an update hold the previous `id`, `api_version` and `kind`.
pub(crate) fn check_plan(schema: &Schema, plan: &AttrValue) -> Result<()> {
    check(schema, plan, false)
}

fn check(schema: &Schema, config: &AttrValue, reject_computed: bool) -> Result<()> {
    let entries = config.as_mapping().ok_or_else(|| ValueError::TypeMismatch {
        path: String::new(),
        expected: "object".to_string(),
        found: config.type_name().to_string(),
    })?;

    for (key, value) in entries {
        let attr = schema
            .attribute(key)
            .ok_or_else(|| ValueError::validation(key.as_str(), "unsupported attribute"))?;
        if reject_computed && attr.mode == AttrMode::Computed && value.is_known() {
            return Err(ValueError::validation(
                key.as_str(),
                "attribute is computed by the provider and cannot be set",
            )
            .into());
        }
    }

    if let Some(missing) = schema
        .attributes
        .iter()
        .find(|a| a.mode.is_required() && config.get(&a.name).is_null())
    {
        return Err(ValueError::MissingRequired {
            path: missing.name.clone(),
        }
        .into());
    }
    Ok(())
}

/// An object with exactly the schema's attributes; missing ones are null
pub(crate) fn complete(schema: &Schema, mut values: BTreeMap<String, AttrValue>) -> AttrValue {
    AttrValue::Object(
        schema
            .attributes
            .iter()
            .map(|a| (a.name.clone(), values.remove(&a.name).unwrap_or_default()))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crdform_core::Attribute;

    fn schema() -> Schema {
        Schema::new("test")
            .with_attribute(Attribute::string("id").computed())
            .with_attribute(Attribute::object("metadata", vec![]).required())
            .with_attribute(Attribute::string("field_manager").optional_computed())
    }

    #[test]
    fn test_check_config() {
        let ok = AttrValue::object([
            ("metadata", AttrValue::object::<String>([])),
            ("id", AttrValue::Unknown),
        ]);
        assert!(check_config(&schema(), &ok).is_ok());

        let computed = AttrValue::object([
            ("metadata", AttrValue::object::<String>([])),
            ("id", AttrValue::from("x")),
        ]);
        assert!(check_config(&schema(), &computed).is_err());
        assert!(check_plan(&schema(), &computed).is_ok());

        let missing = AttrValue::object([("field_manager", AttrValue::from("me"))]);
        assert_eq!(
            check_config(&schema(), &missing).unwrap_err().to_string(),
            "metadata: required attribute is missing"
        );

        let extra = AttrValue::object([
            ("metadata", AttrValue::object::<String>([])),
            ("bogus", AttrValue::from(true)),
        ]);
        assert!(check_config(&schema(), &extra).is_err());
    }

    #[test]
    fn test_complete_drops_and_fills() {
        let mut values = BTreeMap::new();
        values.insert("id".to_string(), AttrValue::from("default/web"));
        values.insert("stray".to_string(), AttrValue::from(1));

        let state = complete(&schema(), values);
        let entries = state.as_mapping().unwrap();
        assert_eq!(entries.len(), 3);
        assert!(entries["metadata"].is_null());
        assert_eq!(entries["id"].as_str(), Some("default/web"));
    }
}
