//! Destroy command - delete a managed object

use std::path::Path;

use console::style;
use crdform_kube::Operation;

use crate::commands::{cancel_on_ctrl_c, connect, load_config, load_state};
use crate::display;
use crate::error::{CliError, ProviderResultExt, Result};

/// Delete the object described by a configuration or state file.
///
/// The state file, when given, is removed once the object is gone.
pub async fn run(
    type_name: &str,
    file: Option<&Path>,
    state_path: Option<&Path>,
    context: Option<&str>,
) -> Result<()> {
    let target = match (file, state_path) {
        (Some(file), _) => load_config(file)?,
        (None, Some(path)) => load_state(path)?,
        (None, None) => {
            return Err(CliError::usage(
                "nothing to destroy",
                Some("pass a configuration with -f or a state file with --state".to_string()),
            ));
        }
    };

    let provider = connect(context).await?;
    let resource = provider.resource(type_name).during(Operation::Delete)?;
    let cancel = cancel_on_ctrl_c();

    display::step(format!("Deleting {}", style(type_name).cyan()));
    resource.delete(&target, &cancel).await.during(Operation::Delete)?;

    if let Some(path) = state_path
        && path.exists()
    {
        std::fs::remove_file(path)?;
    }
    display::success(format!("Deleted {}", style(type_name).cyan()));
    Ok(())
}
