//! Refresh command - re-read a managed object into its state document

use std::path::Path;

use crdform_kube::{Diagnostic, Operation};

use crate::commands::{connect, load_state, write_state};
use crate::display;
use crate::error::{ProviderResultExt, Result};

pub async fn run(type_name: &str, state_path: &Path, context: Option<&str>) -> Result<()> {
    let prior = load_state(state_path)?;
    let provider = connect(context).await?;
    let resource = provider.resource(type_name).during(Operation::Read)?;

    match resource.read(&prior).await.during(Operation::Read)? {
        Some(state) => {
            write_state(&state, Some(state_path))?;
            display::success(format!("Refreshed {}", state_path.display()));
        }
        None => {
            std::fs::remove_file(state_path)?;
            display::diagnostic(&Diagnostic::warning(
                "Resource no longer exists",
                format!(
                    "{} {} was not found in the cluster; removed {}",
                    type_name,
                    prior.get_str("id").unwrap_or_default(),
                    state_path.display()
                ),
            ));
        }
    }
    Ok(())
}
