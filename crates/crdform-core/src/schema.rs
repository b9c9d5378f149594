//! Attribute schemas
//!
//! A schema lists the attributes of a data source or resource. Every
//! attribute has a Terraform name (snake_case) and the JSON name of the
//! Kubernetes field it maps to, so a single converter can walk any CRD.

use serde_json::json;

/// How an attribute is set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrMode {
    /// Must be set in configuration
    Required,
    /// May be set in configuration
    Optional,
    /// Set by the provider only
    Computed,
    /// May be set; otherwise the provider fills it in
    OptionalComputed,
}

impl AttrMode {
    pub fn is_required(self) -> bool {
        matches!(self, AttrMode::Required)
    }

    /// Whether users may set this attribute
    pub fn is_configurable(self) -> bool {
        !matches!(self, AttrMode::Computed)
    }
}

/// The type of an attribute
#[derive(Debug, Clone, PartialEq)]
pub enum AttrKind {
    String,
    Bool,
    Int64,
    Float64,
    /// Integer or float, see [`crate::DynamicNumber`]
    Number,
    /// See [`crate::IntOrString`]
    IntOrString,
    /// Any shape, see [`crate::Dynamic`]
    Dynamic,
    List(Box<AttrKind>),
    Map(Box<AttrKind>),
    Object(Vec<Attribute>),
}

impl AttrKind {
    pub fn list_of(kind: AttrKind) -> Self {
        AttrKind::List(Box::new(kind))
    }

    pub fn map_of(kind: AttrKind) -> Self {
        AttrKind::Map(Box::new(kind))
    }

    /// Type label in Terraform notation, e.g. `list(string)`
    pub fn label(&self) -> String {
        match self {
            AttrKind::String | AttrKind::IntOrString => "string".to_string(),
            AttrKind::Bool => "bool".to_string(),
            AttrKind::Int64 | AttrKind::Float64 | AttrKind::Number => "number".to_string(),
            AttrKind::Dynamic => "dynamic".to_string(),
            AttrKind::List(inner) => format!("list({})", inner.label()),
            AttrKind::Map(inner) => format!("map({})", inner.label()),
            AttrKind::Object(_) => "object".to_string(),
        }
    }
}

/// A single attribute
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub json_name: String,
    pub kind: AttrKind,
    pub mode: AttrMode,
    pub description: String,
    pub sensitive: bool,
}

impl Attribute {
    /// A new optional attribute whose JSON name is the camelCase form of `name`
    pub fn new(name: &str, kind: AttrKind) -> Self {
        Self {
            name: name.to_string(),
            json_name: snake_to_camel(name),
            kind,
            mode: AttrMode::Optional,
            description: String::new(),
            sensitive: false,
        }
    }

    pub fn string(name: &str) -> Self {
        Self::new(name, AttrKind::String)
    }

    pub fn bool(name: &str) -> Self {
        Self::new(name, AttrKind::Bool)
    }

    pub fn int64(name: &str) -> Self {
        Self::new(name, AttrKind::Int64)
    }

    pub fn float64(name: &str) -> Self {
        Self::new(name, AttrKind::Float64)
    }

    pub fn number(name: &str) -> Self {
        Self::new(name, AttrKind::Number)
    }

    pub fn int_or_string(name: &str) -> Self {
        Self::new(name, AttrKind::IntOrString)
    }

    pub fn dynamic(name: &str) -> Self {
        Self::new(name, AttrKind::Dynamic)
    }

    pub fn string_list(name: &str) -> Self {
        Self::new(name, AttrKind::list_of(AttrKind::String))
    }

    pub fn string_map(name: &str) -> Self {
        Self::new(name, AttrKind::map_of(AttrKind::String))
    }

    pub fn object(name: &str, attributes: Vec<Attribute>) -> Self {
        Self::new(name, AttrKind::Object(attributes))
    }

    pub fn object_list(name: &str, attributes: Vec<Attribute>) -> Self {
        Self::new(name, AttrKind::list_of(AttrKind::Object(attributes)))
    }

    /// Override the JSON field name
    pub fn json(mut self, json_name: &str) -> Self {
        self.json_name = json_name.to_string();
        self
    }

    pub fn required(mut self) -> Self {
        self.mode = AttrMode::Required;
        self
    }

    pub fn computed(mut self) -> Self {
        self.mode = AttrMode::Computed;
        self
    }

    pub fn optional_computed(mut self) -> Self {
        self.mode = AttrMode::OptionalComputed;
        self
    }

    pub fn describe(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    /// Turn every attribute in this subtree computed (data source views)
    pub fn into_computed(mut self) -> Self {
        self.mode = AttrMode::Computed;
        self.kind = computed_kind(self.kind);
        self
    }

    fn describe_json(&self) -> serde_json::Value {
        let mut doc = json!({
            "type": self.kind.label(),
            "json_name": self.json_name,
            "required": self.mode == AttrMode::Required,
            "optional": matches!(self.mode, AttrMode::Optional | AttrMode::OptionalComputed),
            "computed": matches!(self.mode, AttrMode::Computed | AttrMode::OptionalComputed),
        });
        if !self.description.is_empty() {
            doc["description"] = json!(self.description);
        }
        if self.sensitive {
            doc["sensitive"] = json!(true);
        }
        if let Some(nested) = nested_attributes(&self.kind) {
            doc["attributes"] = describe_attributes(nested);
        }
        doc
    }
}

fn computed_kind(kind: AttrKind) -> AttrKind {
    match kind {
        AttrKind::Object(attrs) => {
            AttrKind::Object(attrs.into_iter().map(Attribute::into_computed).collect())
        }
        AttrKind::List(inner) => AttrKind::List(Box::new(computed_kind(*inner))),
        AttrKind::Map(inner) => AttrKind::Map(Box::new(computed_kind(*inner))),
        other => other,
    }
}

fn nested_attributes(kind: &AttrKind) -> Option<&[Attribute]> {
    match kind {
        AttrKind::Object(attrs) => Some(attrs),
        AttrKind::List(inner) | AttrKind::Map(inner) => nested_attributes(inner),
        _ => None,
    }
}

fn describe_attributes(attributes: &[Attribute]) -> serde_json::Value {
    serde_json::Value::Object(
        attributes
            .iter()
            .map(|a| (a.name.clone(), a.describe_json()))
            .collect(),
    )
}

/// Schema of a data source or resource
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Schema {
    pub description: String,
    pub attributes: Vec<Attribute>,
}

impl Schema {
    pub fn new(description: &str) -> Self {
        Self {
            description: description.to_string(),
            attributes: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Human and machine readable description, used by `crdform schema`
    pub fn to_json_description(&self) -> serde_json::Value {
        json!({
            "description": self.description,
            "attributes": describe_attributes(&self.attributes),
        })
    }
}

/// `secret_name` -> `secretName`
pub fn snake_to_camel(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = false;
    for c in name.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snake_to_camel() {
        assert_eq!(snake_to_camel("secret_name"), "secretName");
        assert_eq!(snake_to_camel("name"), "name");
        assert_eq!(snake_to_camel("max_replica_count"), "maxReplicaCount");
    }

    #[test]
    fn test_json_override() {
        let attr = Attribute::string("repo_url").json("repoURL");
        assert_eq!(attr.json_name, "repoURL");
        assert_eq!(attr.mode, AttrMode::Optional);
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(AttrKind::list_of(AttrKind::String).label(), "list(string)");
        assert_eq!(AttrKind::map_of(AttrKind::Int64).label(), "map(number)");
        assert_eq!(AttrKind::IntOrString.label(), "string");
    }

    #[test]
    fn test_into_computed_recurses() {
        let attr = Attribute::object(
            "spec",
            vec![Attribute::object_list("items", vec![Attribute::string("x").required()])],
        )
        .required()
        .into_computed();

        assert_eq!(attr.mode, AttrMode::Computed);
        let AttrKind::Object(children) = &attr.kind else {
            panic!("expected object");
        };
        let AttrKind::List(inner) = &children[0].kind else {
            panic!("expected list");
        };
        let AttrKind::Object(leaves) = inner.as_ref() else {
            panic!("expected object");
        };
        assert_eq!(leaves[0].mode, AttrMode::Computed);
    }

    #[test]
    fn test_description_json() {
        let schema = Schema::new("demo")
            .with_attribute(Attribute::string("id").computed())
            .with_attribute(
                Attribute::object("spec", vec![Attribute::string_list("dns_names")]).required(),
            );

        let doc = schema.to_json_description();
        assert_eq!(doc["description"], "demo");
        assert_eq!(doc["attributes"]["id"]["computed"], true);
        assert_eq!(doc["attributes"]["spec"]["required"], true);
        assert_eq!(
            doc["attributes"]["spec"]["attributes"]["dns_names"]["type"],
            "list(string)"
        );
        assert_eq!(
            doc["attributes"]["spec"]["attributes"]["dns_names"]["json_name"],
            "dnsNames"
        );
    }
}
