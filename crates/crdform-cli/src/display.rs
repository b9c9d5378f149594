//! Display formatting for CLI output
//!
//! Progress lines and warnings go to stderr so that stdout carries only
//! the command's payload (YAML, JSON state, schema).

use console::style;
use crdform_core::{AttrKind, AttrMode, Attribute, Schema};
use crdform_kube::{Diagnostic, Severity};

/// An action about to happen
pub fn step(message: impl std::fmt::Display) {
    eprintln!("{} {}", style("→").blue().bold(), message);
}

pub fn success(message: impl std::fmt::Display) {
    eprintln!("{} {}", style("✓").green().bold(), message);
}

pub fn warning(message: impl std::fmt::Display) {
    eprintln!("{} {}", style("⚠").yellow(), message);
}

/// Print a handler diagnostic in the same shape as CLI errors
pub fn diagnostic(diag: &Diagnostic) {
    let icon = match diag.severity {
        Severity::Error => style("✗").red().bold(),
        Severity::Warning => style("⚠").yellow(),
    };
    eprintln!("{icon} {}", style(&diag.summary).bold());
    eprintln!("  {}", diag.detail);
    if let Some(attribute) = &diag.attribute {
        eprintln!("  {} {}", style("at").dim(), attribute);
    }
}

/// Print a list under a bold heading
pub fn section(title: &str, items: &[String]) {
    println!("{}", style(title).bold());
    for item in items {
        println!("  {item}");
    }
}

/// Print a schema as an indented attribute tree
pub fn schema_tree(type_name: &str, schema: &Schema) {
    println!("{}", style(type_name).cyan().bold());
    if !schema.description.is_empty() {
        println!("{}", style(&schema.description).dim());
    }
    println!();
    for attribute in &schema.attributes {
        attribute_line(attribute, 1);
    }
}

fn attribute_line(attribute: &Attribute, depth: usize) {
    let indent = "  ".repeat(depth);
    let mode = match attribute.mode {
        AttrMode::Required => style("required").red(),
        AttrMode::Optional => style("optional").dim(),
        AttrMode::Computed => style("computed").blue(),
        AttrMode::OptionalComputed => style("optional, computed").dim(),
    };
    println!(
        "{indent}{} {} ({mode})",
        style(&attribute.name).bold(),
        style(attribute.kind.label()).yellow(),
    );

    if let Some(nested) = nested(&attribute.kind) {
        for child in nested {
            attribute_line(child, depth + 1);
        }
    }
}

fn nested(kind: &AttrKind) -> Option<&[Attribute]> {
    match kind {
        AttrKind::Object(attrs) => Some(attrs),
        AttrKind::List(inner) | AttrKind::Map(inner) => nested(inner),
        _ => None,
    }
}
