//! Values of arbitrary shape
//!
//! Some CRD fields are schemaless (`x-kubernetes-preserve-unknown-fields`) and
//! may hold anything. [`Dynamic`] carries such a value through the attribute
//! model and serializes it back to the JSON/YAML shape it came from.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{CoreError, Result};
use crate::value::AttrValue;

/// An attribute value whose shape is only known at runtime
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dynamic(AttrValue);

impl Dynamic {
    pub fn new(value: AttrValue) -> Self {
        Self(value)
    }

    pub fn null() -> Self {
        Self(AttrValue::Null)
    }

    pub fn unknown() -> Self {
        Self(AttrValue::Unknown)
    }

    pub fn is_null(&self) -> bool {
        self.0.is_null()
    }

    pub fn is_unknown(&self) -> bool {
        self.0.is_unknown()
    }

    pub fn value(&self) -> &AttrValue {
        &self.0
    }

    pub fn into_inner(self) -> AttrValue {
        self.0
    }

    /// Convert to JSON, recursing into sequences and mappings.
    ///
    /// Null and unknown become `null`. Numbers keep their exact integer or
    /// float form and fail with a precision error otherwise.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        value_to_json(&self.0)
    }

    pub fn from_json(json: &serde_json::Value) -> Result<Self> {
        Ok(Self(AttrValue::from_json(json)?))
    }

    /// Render as a YAML document
    pub fn to_yaml(&self) -> std::result::Result<String, CoreError> {
        Ok(serde_yaml::to_string(&self.to_json()?)?)
    }
}

pub(crate) fn value_to_json(value: &AttrValue) -> Result<serde_json::Value> {
    Ok(match value {
        AttrValue::Null | AttrValue::Unknown => serde_json::Value::Null,
        AttrValue::Bool(b) => serde_json::Value::Bool(*b),
        AttrValue::Number(n) => n.to_json()?,
        AttrValue::String(s) => serde_json::Value::String(s.clone()),
        AttrValue::List(items) | AttrValue::Set(items) | AttrValue::Tuple(items) => {
            serde_json::Value::Array(items.iter().map(value_to_json).collect::<Result<_>>()?)
        }
        AttrValue::Map(entries) | AttrValue::Object(entries) => serde_json::Value::Object(
            entries
                .iter()
                .map(|(k, v)| Ok((k.clone(), value_to_json(v)?)))
                .collect::<Result<_>>()?,
        ),
    })
}

impl From<AttrValue> for Dynamic {
    fn from(value: AttrValue) -> Self {
        Self(value)
    }
}

impl Serialize for Dynamic {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json()
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Dynamic {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let json = serde_json::Value::deserialize(deserializer)?;
        Dynamic::from_json(&json).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::number::TfNumber;
    use serde_json::json;

    #[test]
    fn test_null_and_unknown_serialize_as_null() {
        assert_eq!(Dynamic::null().to_json().unwrap(), json!(null));
        assert_eq!(Dynamic::unknown().to_json().unwrap(), json!(null));
        assert!(Dynamic::unknown().is_unknown());
        assert!(!Dynamic::unknown().is_null());
    }

    #[test]
    fn test_nested_structures() {
        let value = Dynamic::new(AttrValue::object([
            (
                "replicaCount",
                AttrValue::from(2),
            ),
            (
                "image",
                AttrValue::object([("tag", AttrValue::from("1.2.3"))]),
            ),
            (
                "ports",
                AttrValue::List(vec![AttrValue::from(80), AttrValue::from(443)]),
            ),
            (
                "flags",
                AttrValue::Set(vec![AttrValue::from("a"), AttrValue::from("b")]),
            ),
        ]));

        assert_eq!(
            value.to_json().unwrap(),
            json!({
                "replicaCount": 2,
                "image": {"tag": "1.2.3"},
                "ports": [80, 443],
                "flags": ["a", "b"]
            })
        );
    }

    #[test]
    fn test_roundtrip_through_json_text() {
        let original = json!({
            "a": [1, 2.5, "three", true, null],
            "b": {"nested": {"deep": -7}},
            "c": ""
        });
        let dynamic = Dynamic::from_json(&original).unwrap();
        let text = serde_json::to_string(&dynamic).unwrap();
        let parsed: Dynamic = serde_json::from_str(&text).unwrap();

        assert_eq!(parsed, dynamic);
        assert_eq!(parsed.to_json().unwrap(), original);
    }

    #[test]
    fn test_roundtrip_through_yaml() {
        let original = json!({"list": [1, 2], "map": {"k": "v"}, "f": 0.25});
        let dynamic = Dynamic::from_json(&original).unwrap();
        let yaml = dynamic.to_yaml().unwrap();
        let parsed: Dynamic = serde_yaml::from_str(&yaml).unwrap();

        assert_eq!(parsed, dynamic);
    }

    #[test]
    fn test_integers_stay_integers() {
        let dynamic = Dynamic::new(AttrValue::Number(TfNumber::parse("3.0").unwrap()));
        let json = dynamic.to_json().unwrap();
        assert!(json.is_i64());
        assert_eq!(serde_json::to_string(&dynamic).unwrap(), "3");
    }

    #[test]
    fn test_precision_loss_fails_loudly() {
        let dynamic = Dynamic::new(AttrValue::List(vec![AttrValue::Number(
            TfNumber::parse("0.1000000000000000000000001").unwrap(),
        )]));
        assert!(dynamic.to_json().is_err());
        assert!(serde_json::to_string(&dynamic).is_err());
    }
}
