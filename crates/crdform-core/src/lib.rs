//! crdform Core - value model shared by every crdform crate
//!
//! This crate provides:
//! - `AttrValue`: Terraform attribute values (null, unknown, primitives, collections)
//! - `TfNumber`: exact decimals with loss-free integer/float conversion
//! - `Dynamic`, `DynamicNumber`, `IntOrString`: adapters for untyped Kubernetes fields
//! - `Schema`: attribute schemas carrying both Terraform and JSON field names
//! - `convert`: schema-driven conversion between attribute values and Kubernetes JSON
//! - `validate`: object metadata checks
//! - `duration`: Go-style duration strings

pub mod convert;
pub mod duration;
pub mod dynamic;
pub mod dynamic_number;
pub mod error;
pub mod int_or_string;
pub mod number;
pub mod schema;
pub mod validate;
pub mod value;

pub use convert::{from_kube, to_kube};
pub use duration::{format_duration, parse_duration, parse_duration_or};
pub use dynamic::Dynamic;
pub use dynamic_number::DynamicNumber;
pub use error::{CoreError, Result, ValueError};
pub use int_or_string::IntOrString;
pub use number::TfNumber;
pub use schema::{AttrKind, AttrMode, Attribute, Schema};
pub use validate::validate_metadata;
pub use value::AttrValue;
