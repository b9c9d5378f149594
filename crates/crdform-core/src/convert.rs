//! Conversion between attribute values and Kubernetes JSON
//!
//! [`to_kube`] walks an attribute object with its schema, renames keys to
//! their JSON names and applies the dynamic adapters at the leaves.
//! [`from_kube`] is the inverse and always yields every schema attribute,
//! absent fields reading as null.

use serde_json::{Map, Value};

use crate::dynamic::Dynamic;
use crate::dynamic_number::{DynamicNumber, json_type_name};
use crate::error::{Result, ValueError};
use crate::int_or_string::IntOrString;
use crate::number::TfNumber;
use crate::schema::{AttrKind, AttrMode, Attribute};
use crate::value::AttrValue;

static NULL: AttrValue = AttrValue::Null;

/// Convert an attribute object to a Kubernetes JSON object.
///
/// Null and unknown attributes are omitted, computed-only attributes are
/// never sent, and attributes not declared in the schema are rejected.
pub fn to_kube(attributes: &[Attribute], value: &AttrValue, path: &str) -> Result<Value> {
    object_to_kube(attributes, value, path).map(|map| Value::Object(map.unwrap_or_default()))
}

/// Convert a Kubernetes JSON object to an attribute object
pub fn from_kube(attributes: &[Attribute], json: &Value, path: &str) -> Result<AttrValue> {
    match json {
        Value::Null => Ok(AttrValue::object(
            attributes.iter().map(|a| (a.name.clone(), AttrValue::Null)),
        )),
        Value::Object(fields) => object_from_kube(attributes, fields, path),
        other => Err(mismatch(path, "object", json_type_name(other))),
    }
}

fn join(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{path}.{name}")
    }
}

fn mismatch(path: &str, expected: &str, found: &str) -> ValueError {
    ValueError::TypeMismatch {
        path: path.to_string(),
        expected: expected.to_string(),
        found: found.to_string(),
    }
}

/// Attach `path` to errors raised by the adapters, which do not know where they are
fn locate(err: ValueError, path: &str) -> ValueError {
    match err {
        ValueError::TypeMismatch {
            path: p,
            expected,
            found,
        } if p.is_empty() => ValueError::TypeMismatch {
            path: path.to_string(),
            expected,
            found,
        },
        ValueError::PrecisionLoss { .. } | ValueError::InvalidNumber(_) => {
            ValueError::validation(path, err.to_string())
        }
        other => other,
    }
}

fn object_to_kube(
    attributes: &[Attribute],
    value: &AttrValue,
    path: &str,
) -> Result<Option<Map<String, Value>>> {
    let entries = match value {
        AttrValue::Null | AttrValue::Unknown => return Ok(None),
        AttrValue::Object(entries) | AttrValue::Map(entries) => entries,
        other => return Err(mismatch(path, "object", other.type_name())),
    };

    if let Some(unknown) = entries
        .keys()
        .find(|key| !attributes.iter().any(|a| &a.name == *key))
    {
        return Err(ValueError::validation(
            join(path, unknown),
            "unsupported attribute",
        ));
    }

    // Emit fields in JSON name order whatever the map implementation
    let mut ordered: Vec<&Attribute> = attributes.iter().collect();
    ordered.sort_by(|a, b| a.json_name.cmp(&b.json_name));

    let mut out = Map::new();
    for attr in ordered {
        let attr_path = join(path, &attr.name);
        let child = entries.get(&attr.name).unwrap_or(&NULL);

        if attr.mode == AttrMode::Computed {
            continue;
        }
        if child.is_null() && attr.mode == AttrMode::Required {
            return Err(ValueError::MissingRequired { path: attr_path });
        }
        if let Some(json) = kind_to_kube(&attr.kind, child, &attr_path)? {
            out.insert(attr.json_name.clone(), json);
        }
    }
    Ok(Some(out))
}

fn kind_to_kube(kind: &AttrKind, value: &AttrValue, path: &str) -> Result<Option<Value>> {
    if !value.is_known() {
        return Ok(None);
    }

    let json = match kind {
        AttrKind::String => match value {
            AttrValue::String(s) => Value::String(s.clone()),
            AttrValue::Number(n) => Value::String(n.to_string()),
            AttrValue::Bool(b) => Value::String(b.to_string()),
            other => return Err(mismatch(path, "string", other.type_name())),
        },
        AttrKind::Bool => match value {
            AttrValue::Bool(b) => Value::Bool(*b),
            AttrValue::String(s) if s == "true" || s == "false" => Value::Bool(s == "true"),
            other => return Err(mismatch(path, "bool", other.type_name())),
        },
        AttrKind::Int64 => {
            let n = number_of(value, path)?;
            Value::from(n.to_i64().map_err(|e| locate(e, path))?)
        }
        AttrKind::Float64 => {
            let n = number_of(value, path)?;
            let f = n.to_f64().map_err(|e| locate(e, path))?;
            serde_json::Number::from_f64(f)
                .map(Value::Number)
                .ok_or_else(|| ValueError::validation(path, "not a finite number"))?
        }
        AttrKind::Number => {
            let n = DynamicNumber::try_from(value).map_err(|e| locate(e, path))?;
            n.to_json().map_err(|e| locate(e, path))?
        }
        AttrKind::IntOrString => IntOrString::try_from(value)
            .map_err(|e| locate(e, path))?
            .to_json(),
        AttrKind::Dynamic => Dynamic::new(value.clone())
            .to_json()
            .map_err(|e| locate(e, path))?,
        AttrKind::List(inner) => {
            let items = value
                .as_sequence()
                .ok_or_else(|| mismatch(path, "list", value.type_name()))?;
            let mut out = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                let item_path = format!("{path}[{i}]");
                out.push(kind_to_kube(inner, item, &item_path)?.unwrap_or(Value::Null));
            }
            Value::Array(out)
        }
        AttrKind::Map(inner) => {
            let entries = value
                .as_mapping()
                .ok_or_else(|| mismatch(path, "map", value.type_name()))?;
            let mut out = Map::new();
            for (key, item) in entries {
                let item_path = format!("{path}[{key:?}]");
                out.insert(
                    key.clone(),
                    kind_to_kube(inner, item, &item_path)?.unwrap_or(Value::Null),
                );
            }
            Value::Object(out)
        }
        AttrKind::Object(attributes) => match object_to_kube(attributes, value, path)? {
            Some(map) => Value::Object(map),
            None => return Ok(None),
        },
    };
    Ok(Some(json))
}

/// Numbers may arrive as strings from loosely typed configuration
fn number_of(value: &AttrValue, path: &str) -> Result<TfNumber> {
    match value {
        AttrValue::Number(n) => Ok(n.clone()),
        AttrValue::String(s) => TfNumber::parse(s).map_err(|e| locate(e, path)),
        other => Err(mismatch(path, "number", other.type_name())),
    }
}

fn object_from_kube(
    attributes: &[Attribute],
    fields: &Map<String, Value>,
    path: &str,
) -> Result<AttrValue> {
    let mut out = std::collections::BTreeMap::new();
    for attr in attributes {
        let attr_path = join(path, &attr.name);
        let value = match fields.get(&attr.json_name) {
            Some(json) => kind_from_kube(&attr.kind, json, &attr_path)?,
            None => AttrValue::Null,
        };
        out.insert(attr.name.clone(), value);
    }
    Ok(AttrValue::Object(out))
}

fn kind_from_kube(kind: &AttrKind, json: &Value, path: &str) -> Result<AttrValue> {
    if json.is_null() {
        return Ok(AttrValue::Null);
    }

    Ok(match kind {
        AttrKind::String => match json {
            Value::String(s) => AttrValue::String(s.clone()),
            Value::Number(n) => AttrValue::String(n.to_string()),
            Value::Bool(b) => AttrValue::String(b.to_string()),
            other => return Err(mismatch(path, "string", json_type_name(other))),
        },
        AttrKind::Bool => match json {
            Value::Bool(b) => AttrValue::Bool(*b),
            other => return Err(mismatch(path, "bool", json_type_name(other))),
        },
        AttrKind::Int64 | AttrKind::Float64 | AttrKind::Number => match json {
            Value::Number(n) => {
                AttrValue::Number(TfNumber::from_json_number(n).map_err(|e| locate(e, path))?)
            }
            other => return Err(mismatch(path, "number", json_type_name(other))),
        },
        AttrKind::IntOrString => IntOrString::from_json(json)
            .map_err(|e| locate(e, path))?
            .to_attr(),
        AttrKind::Dynamic => Dynamic::from_json(json)
            .map_err(|e| locate(e, path))?
            .into_inner(),
        AttrKind::List(inner) => match json {
            Value::Array(items) => AttrValue::List(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| kind_from_kube(inner, item, &format!("{path}[{i}]")))
                    .collect::<Result<_>>()?,
            ),
            other => return Err(mismatch(path, "list", json_type_name(other))),
        },
        AttrKind::Map(inner) => match json {
            Value::Object(entries) => AttrValue::Map(
                entries
                    .iter()
                    .map(|(k, item)| {
                        Ok((k.clone(), kind_from_kube(inner, item, &format!("{path}[{k:?}]"))?))
                    })
                    .collect::<Result<_>>()?,
            ),
            other => return Err(mismatch(path, "map", json_type_name(other))),
        },
        AttrKind::Object(attributes) => match json {
            Value::Object(fields) => object_from_kube(attributes, fields, path)?,
            other => return Err(mismatch(path, "object", json_type_name(other))),
        },
    })
}
