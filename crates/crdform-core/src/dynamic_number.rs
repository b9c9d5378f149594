//! Numbers that may be integers or floats
//!
//! CRD fields typed `number` accept both `3` and `0.75`. [`DynamicNumber`]
//! keeps the exact value and writes an integer or a float depending on what
//! the value is, refusing any conversion that would round.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Result, ValueError};
use crate::number::TfNumber;
use crate::value::AttrValue;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum DynamicNumber {
    #[default]
    Null,
    Unknown,
    Value(TfNumber),
}

impl DynamicNumber {
    pub fn is_null(&self) -> bool {
        matches!(self, DynamicNumber::Null)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, DynamicNumber::Unknown)
    }

    pub fn number(&self) -> Option<&TfNumber> {
        match self {
            DynamicNumber::Value(n) => Some(n),
            _ => None,
        }
    }

    /// JSON form: `null`, an exact integer, or an exact float
    pub fn to_json(&self) -> Result<serde_json::Value> {
        match self {
            DynamicNumber::Null | DynamicNumber::Unknown => Ok(serde_json::Value::Null),
            DynamicNumber::Value(n) => n.to_json(),
        }
    }

    pub fn from_json(json: &serde_json::Value) -> Result<Self> {
        match json {
            serde_json::Value::Null => Ok(DynamicNumber::Null),
            serde_json::Value::Number(n) => Ok(DynamicNumber::Value(TfNumber::from_json_number(n)?)),
            other => Err(ValueError::TypeMismatch {
                path: String::new(),
                expected: "number".to_string(),
                found: json_type_name(other).to_string(),
            }),
        }
    }

    pub fn to_attr(&self) -> AttrValue {
        match self {
            DynamicNumber::Null => AttrValue::Null,
            DynamicNumber::Unknown => AttrValue::Unknown,
            DynamicNumber::Value(n) => AttrValue::Number(n.clone()),
        }
    }
}

impl TryFrom<&AttrValue> for DynamicNumber {
    type Error = ValueError;

    fn try_from(value: &AttrValue) -> Result<Self> {
        match value {
            AttrValue::Null => Ok(DynamicNumber::Null),
            AttrValue::Unknown => Ok(DynamicNumber::Unknown),
            AttrValue::Number(n) => Ok(DynamicNumber::Value(n.clone())),
            other => Err(ValueError::TypeMismatch {
                path: String::new(),
                expected: "number".to_string(),
                found: other.type_name().to_string(),
            }),
        }
    }
}

impl From<TfNumber> for DynamicNumber {
    fn from(value: TfNumber) -> Self {
        DynamicNumber::Value(value)
    }
}

impl Serialize for DynamicNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            DynamicNumber::Null | DynamicNumber::Unknown => serializer.serialize_none(),
            DynamicNumber::Value(n) => n.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for DynamicNumber {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Ok(Option::<TfNumber>::deserialize(deserializer)?
            .map(DynamicNumber::Value)
            .unwrap_or(DynamicNumber::Null))
    }
}

pub(crate) fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn num(text: &str) -> DynamicNumber {
        DynamicNumber::Value(TfNumber::parse(text).unwrap())
    }

    #[test]
    fn test_integer_output() {
        assert_eq!(serde_json::to_string(&num("42")).unwrap(), "42");
        assert_eq!(serde_json::to_string(&num("4.2e1")).unwrap(), "42");
        assert_eq!(serde_json::to_string(&num("-1")).unwrap(), "-1");
    }

    #[test]
    fn test_float_output() {
        assert_eq!(serde_json::to_string(&num("0.75")).unwrap(), "0.75");
        assert_eq!(num("99.5").to_json().unwrap(), json!(99.5));
    }

    #[test]
    fn test_null_and_unknown() {
        assert_eq!(serde_json::to_string(&DynamicNumber::Null).unwrap(), "null");
        assert_eq!(DynamicNumber::Unknown.to_json().unwrap(), json!(null));
        assert!(DynamicNumber::Unknown.is_unknown());
        assert!(DynamicNumber::default().is_null());
    }

    #[test]
    fn test_lossy_values_error() {
        assert!(num("1e30").to_json().is_err());
        assert!(num("3.14159265358979323846264338327950288").to_json().is_err());
        assert!(serde_yaml::to_string(&num("1e30")).is_err());
    }

    #[test]
    fn test_from_json() {
        assert_eq!(DynamicNumber::from_json(&json!(5)).unwrap(), num("5"));
        assert_eq!(DynamicNumber::from_json(&json!(null)).unwrap(), DynamicNumber::Null);
        assert!(DynamicNumber::from_json(&json!("5")).is_err());
    }

    #[test]
    fn test_try_from_attr() {
        assert_eq!(
            DynamicNumber::try_from(&AttrValue::from(7)).unwrap(),
            num("7")
        );
        assert!(DynamicNumber::try_from(&AttrValue::from("7")).is_err());
    }

    #[test]
    fn test_deserialize() {
        let parsed: DynamicNumber = serde_yaml::from_str("2.5").unwrap();
        assert_eq!(parsed, num("2.5"));
        let null: DynamicNumber = serde_json::from_str("null").unwrap();
        assert!(null.is_null());
    }
}
