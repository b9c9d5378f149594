//! Object metadata validation
//!
//! Mirrors the checks the API server applies to `metadata`, so configuration
//! mistakes surface as attribute errors before any request is made.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Result, ValueError};
use crate::value::AttrValue;

static DNS1123_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?$").expect("valid regex"));

static DNS1123_SUBDOMAIN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?(\.[a-z0-9]([-a-z0-9]*[a-z0-9])?)*$")
        .expect("valid regex")
});

static QUALIFIED_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z0-9][-A-Za-z0-9_.]*)?[A-Za-z0-9]$").expect("valid regex")
});

static LABEL_VALUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(([A-Za-z0-9][-A-Za-z0-9_.]*)?[A-Za-z0-9])?$").expect("valid regex")
});

const DNS1123_LABEL_MAX: usize = 63;
const DNS1123_SUBDOMAIN_MAX: usize = 253;
const QUALIFIED_NAME_MAX: usize = 63;
const LABEL_VALUE_MAX: usize = 63;

pub fn validate_dns_label(path: &str, value: &str) -> Result<()> {
    if value.len() > DNS1123_LABEL_MAX {
        return Err(ValueError::validation(
            path,
            format!("must be no more than {DNS1123_LABEL_MAX} characters"),
        ));
    }
    if !DNS1123_LABEL.is_match(value) {
        return Err(ValueError::validation(
            path,
            format!(
                "'{value}' must consist of lower case alphanumeric characters or '-', \
                 and must start and end with an alphanumeric character"
            ),
        ));
    }
    Ok(())
}

pub fn validate_dns_subdomain(path: &str, value: &str) -> Result<()> {
    if value.len() > DNS1123_SUBDOMAIN_MAX {
        return Err(ValueError::validation(
            path,
            format!("must be no more than {DNS1123_SUBDOMAIN_MAX} characters"),
        ));
    }
    if !DNS1123_SUBDOMAIN.is_match(value) {
        return Err(ValueError::validation(
            path,
            format!(
                "'{value}' must consist of lower case alphanumeric characters, '-' or '.', \
                 and must start and end with an alphanumeric character"
            ),
        ));
    }
    Ok(())
}

/// Label and annotation keys: `[prefix/]name`
pub fn validate_qualified_name(path: &str, key: &str) -> Result<()> {
    let (prefix, name) = match key.rsplit_once('/') {
        Some((prefix, name)) => (Some(prefix), name),
        None => (None, key),
    };

    if let Some(prefix) = prefix {
        if prefix.is_empty() {
            return Err(ValueError::validation(path, format!("'{key}': prefix part must be non-empty")));
        }
        validate_dns_subdomain(path, prefix)
            .map_err(|_| ValueError::validation(path, format!("'{key}': prefix part must be a DNS subdomain")))?;
    }

    if name.is_empty() || name.len() > QUALIFIED_NAME_MAX || !QUALIFIED_NAME.is_match(name) {
        return Err(ValueError::validation(
            path,
            format!(
                "'{key}': name part must be 1-{QUALIFIED_NAME_MAX} alphanumeric characters, \
                 '-', '_' or '.', starting and ending with an alphanumeric character"
            ),
        ));
    }
    Ok(())
}

pub fn validate_label_value(path: &str, value: &str) -> Result<()> {
    if value.len() > LABEL_VALUE_MAX || !LABEL_VALUE.is_match(value) {
        return Err(ValueError::validation(
            path,
            format!(
                "'{value}' must be at most {LABEL_VALUE_MAX} alphanumeric characters, \
                 '-', '_' or '.', starting and ending with an alphanumeric character"
            ),
        ));
    }
    Ok(())
}

/// Validate the `metadata` attribute object of a CRD configuration
pub fn validate_metadata(metadata: &AttrValue, namespaced: bool) -> Result<()> {
    match metadata.get("name") {
        AttrValue::String(name) => validate_dns_subdomain("metadata.name", name)?,
        AttrValue::Unknown => {}
        _ => {
            return Err(ValueError::MissingRequired {
                path: "metadata.name".to_string(),
            });
        }
    }

    match (metadata.get("namespace"), namespaced) {
        (AttrValue::String(ns), true) => validate_dns_label("metadata.namespace", ns)?,
        (AttrValue::Unknown, true) => {}
        (_, true) => {
            return Err(ValueError::MissingRequired {
                path: "metadata.namespace".to_string(),
            });
        }
        (AttrValue::Null, false) => {}
        (_, false) => {
            return Err(ValueError::validation(
                "metadata.namespace",
                "cluster-scoped resources do not have a namespace",
            ));
        }
    }

    if let Some(labels) = metadata.get("labels").as_mapping() {
        for (key, value) in labels {
            let path = format!("metadata.labels[{key:?}]");
            validate_qualified_name(&path, key)?;
            if let AttrValue::String(value) = value {
                validate_label_value(&path, value)?;
            }
        }
    }

    if let Some(annotations) = metadata.get("annotations").as_mapping() {
        for key in annotations.keys() {
            validate_qualified_name(&format!("metadata.annotations[{key:?}]"), key)?;
        }
    }

    Ok(())
}
