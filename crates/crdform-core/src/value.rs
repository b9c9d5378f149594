//! Attribute values
//!
//! [`AttrValue`] mirrors the value model of the Terraform plugin protocol:
//! every attribute is either null, unknown (not yet known at plan time) or a
//! concrete primitive or collection.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::Result;
use crate::number::TfNumber;

/// A Terraform attribute value
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AttrValue {
    #[default]
    Null,
    Unknown,
    Bool(bool),
    Number(TfNumber),
    String(String),
    List(Vec<AttrValue>),
    Set(Vec<AttrValue>),
    Tuple(Vec<AttrValue>),
    Map(BTreeMap<String, AttrValue>),
    Object(BTreeMap<String, AttrValue>),
}

impl AttrValue {
    pub fn is_null(&self) -> bool {
        matches!(self, AttrValue::Null)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, AttrValue::Unknown)
    }

    /// Neither null nor unknown
    pub fn is_known(&self) -> bool {
        !self.is_null() && !self.is_unknown()
    }

    /// Short name of the value's shape, used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            AttrValue::Null => "null",
            AttrValue::Unknown => "unknown",
            AttrValue::Bool(_) => "bool",
            AttrValue::Number(_) => "number",
            AttrValue::String(_) => "string",
            AttrValue::List(_) => "list",
            AttrValue::Set(_) => "set",
            AttrValue::Tuple(_) => "tuple",
            AttrValue::Map(_) => "map",
            AttrValue::Object(_) => "object",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<&TfNumber> {
        match self {
            AttrValue::Number(n) => Some(n),
            _ => None,
        }
    }

    /// Elements of any sequence-shaped value (list, set, tuple)
    pub fn as_sequence(&self) -> Option<&[AttrValue]> {
        match self {
            AttrValue::List(items) | AttrValue::Set(items) | AttrValue::Tuple(items) => {
                Some(items)
            }
            _ => None,
        }
    }

    /// Entries of any mapping-shaped value (map, object)
    pub fn as_mapping(&self) -> Option<&BTreeMap<String, AttrValue>> {
        match self {
            AttrValue::Map(entries) | AttrValue::Object(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn as_mapping_mut(&mut self) -> Option<&mut BTreeMap<String, AttrValue>> {
        match self {
            AttrValue::Map(entries) | AttrValue::Object(entries) => Some(entries),
            _ => None,
        }
    }

    /// Look up a key of a map or object; missing keys read as null
    pub fn get(&self, key: &str) -> &AttrValue {
        static NULL: AttrValue = AttrValue::Null;
        self.as_mapping()
            .and_then(|entries| entries.get(key))
            .unwrap_or(&NULL)
    }

    /// String attribute value, treating null/unknown/empty as absent
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).as_str().filter(|s| !s.is_empty())
    }

    /// Set a key on a map or object; no-op for other shapes
    pub fn set(&mut self, key: impl Into<String>, value: AttrValue) {
        if let Some(entries) = self.as_mapping_mut() {
            entries.insert(key.into(), value);
        }
    }

    pub fn string(value: impl Into<String>) -> Self {
        AttrValue::String(value.into())
    }

    pub fn object<K: Into<String>>(entries: impl IntoIterator<Item = (K, AttrValue)>) -> Self {
        AttrValue::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn map<K: Into<String>>(entries: impl IntoIterator<Item = (K, AttrValue)>) -> Self {
        AttrValue::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Build a value from untyped JSON: arrays become tuples, objects become objects
    pub fn from_json(json: &serde_json::Value) -> Result<Self> {
        Ok(match json {
            serde_json::Value::Null => AttrValue::Null,
            serde_json::Value::Bool(b) => AttrValue::Bool(*b),
            serde_json::Value::Number(n) => AttrValue::Number(TfNumber::from_json_number(n)?),
            serde_json::Value::String(s) => AttrValue::String(s.clone()),
            serde_json::Value::Array(items) => AttrValue::Tuple(
                items
                    .iter()
                    .map(AttrValue::from_json)
                    .collect::<Result<Vec<_>>>()?,
            ),
            serde_json::Value::Object(entries) => AttrValue::Object(
                entries
                    .iter()
                    .map(|(k, v)| Ok((k.clone(), AttrValue::from_json(v)?)))
                    .collect::<Result<BTreeMap<_, _>>>()?,
            ),
        })
    }

    /// Build a value from untyped YAML text
    pub fn from_yaml_str(text: &str) -> std::result::Result<Self, crate::CoreError> {
        let json: serde_json::Value = serde_yaml::from_str(text)?;
        Ok(AttrValue::from_json(&json)?)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::String(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::String(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Number(TfNumber::from_i64(value))
    }
}

impl From<i32> for AttrValue {
    fn from(value: i32) -> Self {
        AttrValue::Number(TfNumber::from_i64(value.into()))
    }
}

impl From<TfNumber> for AttrValue {
    fn from(value: TfNumber) -> Self {
        AttrValue::Number(value)
    }
}

impl<T: Into<AttrValue>> From<Option<T>> for AttrValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(AttrValue::Null)
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Null => f.write_str("null"),
            AttrValue::Unknown => f.write_str("(known after apply)"),
            AttrValue::Bool(b) => write!(f, "{b}"),
            AttrValue::Number(n) => write!(f, "{n}"),
            AttrValue::String(s) => write!(f, "{s:?}"),
            AttrValue::List(items) | AttrValue::Set(items) | AttrValue::Tuple(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            AttrValue::Map(entries) | AttrValue::Object(entries) => {
                f.write_str("{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k} = {v}")?;
                }
                f.write_str("}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_shapes() {
        let value = AttrValue::from_json(&json!({
            "name": "web",
            "replicas": 3,
            "ratio": 0.5,
            "enabled": true,
            "ports": [80, 443],
            "extra": null
        }))
        .unwrap();

        assert_eq!(value.get("name").as_str(), Some("web"));
        assert_eq!(value.get("replicas").as_number(), Some(&TfNumber::from_i64(3)));
        assert_eq!(value.get("enabled").as_bool(), Some(true));
        assert_eq!(value.get("ports").as_sequence().map(|s| s.len()), Some(2));
        assert!(matches!(value.get("ports"), AttrValue::Tuple(_)));
        assert!(value.get("extra").is_null());
        assert!(value.get("missing").is_null());
    }

    #[test]
    fn test_get_str_skips_empty() {
        let value = AttrValue::object([("a", AttrValue::from("")), ("b", AttrValue::from("x"))]);
        assert_eq!(value.get_str("a"), None);
        assert_eq!(value.get_str("b"), Some("x"));
    }

    #[test]
    fn test_set_only_on_mappings() {
        let mut obj = AttrValue::object::<String>([]);
        obj.set("k", AttrValue::from(true));
        assert_eq!(obj.get("k").as_bool(), Some(true));

        let mut scalar = AttrValue::from("x");
        scalar.set("k", AttrValue::from(true));
        assert_eq!(scalar, AttrValue::from("x"));
    }

    #[test]
    fn test_known_states() {
        assert!(AttrValue::Null.is_null());
        assert!(AttrValue::Unknown.is_unknown());
        assert!(!AttrValue::Unknown.is_known());
        assert!(AttrValue::from(1).is_known());
    }

    #[test]
    fn test_from_yaml_str() {
        let value = AttrValue::from_yaml_str("metadata:\n  name: demo\n").unwrap();
        assert_eq!(value.get("metadata").get_str("name"), Some("demo"));
    }

    #[test]
    fn test_display() {
        let value = AttrValue::object([
            ("a", AttrValue::from(1)),
            ("b", AttrValue::List(vec![AttrValue::from("x"), AttrValue::Unknown])),
        ]);
        assert_eq!(value.to_string(), r#"{a = 1, b = ["x", (known after apply)]}"#);
    }
}
