//! Types command - list data sources and resources

use crdform_kube::Provider;

use crate::display;
use crate::error::Result;

pub fn run(json: bool) -> Result<()> {
    let provider = Provider::offline();
    let data_sources = provider.data_source_names();
    let resources = provider.resource_names();

    if json {
        let doc = serde_json::json!({
            "data_sources": data_sources,
            "resources": resources,
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    display::section("Data sources", &data_sources);
    println!();
    let resources: Vec<String> = provider
        .crds()
        .map(|crd| format!("{}  ({} {})", crd.type_name(), crd.api_version(), crd.kind))
        .collect();
    display::section("Resources", &resources);
    Ok(())
}
