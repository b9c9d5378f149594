//! Import command - adopt an existing object into a state document

use std::path::Path;

use console::style;
use crdform_kube::Operation;

use crate::commands::{connect, write_state};
use crate::display;
use crate::error::{ProviderResultExt, Result};

pub async fn run(
    type_name: &str,
    id: &str,
    state_path: Option<&Path>,
    context: Option<&str>,
) -> Result<()> {
    let provider = connect(context).await?;
    let resource = provider.resource(type_name).during(Operation::Import)?;

    display::step(format!("Importing {} {}", style(type_name).cyan(), id));
    let state = resource.import(id).await.during(Operation::Import)?;
    write_state(&state, state_path)?;

    if let Some(path) = state_path {
        display::success(format!("Imported {id} into {}", path.display()));
    }
    Ok(())
}
