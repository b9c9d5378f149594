//! Kubernetes `IntOrString` fields
//!
//! Ports and rollout percentages are declared `x-kubernetes-int-or-string`.
//! On the Terraform side they are strings; on the wire a canonical 32-bit
//! integer is written as a JSON number and anything else as a JSON string.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::dynamic_number::json_type_name;
use crate::error::{Result, ValueError};
use crate::value::AttrValue;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum IntOrString {
    #[default]
    Null,
    Unknown,
    Value(String),
}

impl IntOrString {
    pub fn new(value: impl Into<String>) -> Self {
        IntOrString::Value(value.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, IntOrString::Null)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, IntOrString::Unknown)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            IntOrString::Value(s) => Some(s),
            _ => None,
        }
    }

    /// The integer this value stands for, when the text is a canonical int32
    pub fn as_int(&self) -> Option<i32> {
        self.as_str().and_then(canonical_int)
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            IntOrString::Null | IntOrString::Unknown => serde_json::Value::Null,
            IntOrString::Value(s) => match canonical_int(s) {
                Some(i) => serde_json::Value::from(i),
                None => serde_json::Value::String(s.clone()),
            },
        }
    }

    pub fn from_json(json: &serde_json::Value) -> Result<Self> {
        match json {
            serde_json::Value::Null => Ok(IntOrString::Null),
            serde_json::Value::String(s) => Ok(IntOrString::Value(s.clone())),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Ok(IntOrString::Value(i.to_string())),
                None => Err(ValueError::TypeMismatch {
                    path: String::new(),
                    expected: "integer or string".to_string(),
                    found: format!("number {n}"),
                }),
            },
            other => Err(ValueError::TypeMismatch {
                path: String::new(),
                expected: "integer or string".to_string(),
                found: json_type_name(other).to_string(),
            }),
        }
    }

    pub fn to_attr(&self) -> AttrValue {
        match self {
            IntOrString::Null => AttrValue::Null,
            IntOrString::Unknown => AttrValue::Unknown,
            IntOrString::Value(s) => AttrValue::String(s.clone()),
        }
    }
}

/// Integers that render back to the same text, so "080" and "+1" stay strings
fn canonical_int(text: &str) -> Option<i32> {
    text.parse::<i32>()
        .ok()
        .filter(|i| i.to_string() == text)
}

impl TryFrom<&AttrValue> for IntOrString {
    type Error = ValueError;

    fn try_from(value: &AttrValue) -> Result<Self> {
        match value {
            AttrValue::Null => Ok(IntOrString::Null),
            AttrValue::Unknown => Ok(IntOrString::Unknown),
            AttrValue::String(s) => Ok(IntOrString::Value(s.clone())),
            // config files may spell ports as bare numbers
            AttrValue::Number(n) if n.is_integer() => Ok(IntOrString::Value(n.to_string())),
            other => Err(ValueError::TypeMismatch {
                path: String::new(),
                expected: "integer or string".to_string(),
                found: other.type_name().to_string(),
            }),
        }
    }
}

impl From<&str> for IntOrString {
    fn from(value: &str) -> Self {
        IntOrString::Value(value.to_string())
    }
}

impl From<i32> for IntOrString {
    fn from(value: i32) -> Self {
        IntOrString::Value(value.to_string())
    }
}

impl fmt::Display for IntOrString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntOrString::Null => f.write_str("null"),
            IntOrString::Unknown => f.write_str("(known after apply)"),
            IntOrString::Value(s) => f.write_str(s),
        }
    }
}

impl Serialize for IntOrString {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            IntOrString::Null | IntOrString::Unknown => serializer.serialize_none(),
            IntOrString::Value(s) => match canonical_int(s) {
                Some(i) => serializer.serialize_i32(i),
                None => serializer.serialize_str(s),
            },
        }
    }
}

impl<'de> Deserialize<'de> for IntOrString {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let json = serde_json::Value::deserialize(deserializer)?;
        IntOrString::from_json(&json).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_integer_text_serializes_as_number() {
        assert_eq!(IntOrString::new("8080").to_json(), json!(8080));
        assert_eq!(serde_json::to_string(&IntOrString::new("-1")).unwrap(), "-1");
        assert_eq!(IntOrString::from(443).as_int(), Some(443));
    }

    #[test]
    fn test_named_port_serializes_as_string() {
        assert_eq!(IntOrString::new("http").to_json(), json!("http"));
        assert_eq!(IntOrString::new("25%").to_json(), json!("25%"));
    }

    #[test]
    fn test_non_canonical_integers_stay_strings() {
        assert_eq!(IntOrString::new("080").to_json(), json!("080"));
        assert_eq!(IntOrString::new("+1").to_json(), json!("+1"));
        assert_eq!(IntOrString::new("1.0").to_json(), json!("1.0"));
        // beyond int32
        assert_eq!(IntOrString::new("4294967296").to_json(), json!("4294967296"));
    }

    #[test]
    fn test_null_unknown() {
        assert_eq!(IntOrString::Null.to_json(), json!(null));
        assert_eq!(IntOrString::Unknown.to_json(), json!(null));
        assert!(IntOrString::default().is_null());
    }

    #[test]
    fn test_from_json() {
        assert_eq!(IntOrString::from_json(&json!(9090)).unwrap(), IntOrString::new("9090"));
        assert_eq!(IntOrString::from_json(&json!("web")).unwrap(), IntOrString::new("web"));
        assert!(IntOrString::from_json(&json!(1.5)).is_err());
        assert!(IntOrString::from_json(&json!([1])).is_err());
    }

    #[test]
    fn test_roundtrip_yaml() {
        for text in ["80", "metrics", "50%"] {
            let value = IntOrString::new(text);
            let yaml = serde_yaml::to_string(&value).unwrap();
            let parsed: IntOrString = serde_yaml::from_str(&yaml).unwrap();
            assert_eq!(parsed, value);
        }
    }

    #[test]
    fn test_try_from_attr_number() {
        let value = IntOrString::try_from(&AttrValue::from(8443)).unwrap();
        assert_eq!(value, IntOrString::new("8443"));
        assert!(IntOrString::try_from(&AttrValue::Bool(true)).is_err());
    }
}
