//! Schema command - print the attributes of a data source or resource

use crdform_kube::{HandlerKind, Operation, Provider};

use crate::display;
use crate::error::{ProviderResultExt, Result};

pub fn run(type_name: &str, data_source: bool, json: bool) -> Result<()> {
    let kind = if type_name.ends_with("_manifest") {
        HandlerKind::Manifest
    } else if data_source {
        HandlerKind::DataSource
    } else {
        HandlerKind::Resource
    };

    let schema = Provider::offline()
        .schema(type_name, kind)
        .during(Operation::Read)?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&schema.to_json_description())?
        );
    } else {
        display::schema_tree(type_name, &schema);
    }
    Ok(())
}
