//! Apply command - create or update an object with server-side apply

use std::path::Path;

use console::style;
use crdform_kube::Operation;

use crate::commands::{cancel_on_ctrl_c, connect, load_config, load_state, write_state};
use crate::display;
use crate::error::{ProviderResultExt, Result};

/// Create the object, or update it when `state_path` holds a prior state.
///
/// A change of name or namespace replaces the object: the prior one is
/// deleted before the new one is created.
pub async fn run(
    type_name: &str,
    file: &Path,
    state_path: Option<&Path>,
    context: Option<&str>,
) -> Result<()> {
    let config = load_config(file)?;
    let prior = match state_path {
        Some(path) if path.exists() => Some(load_state(path)?),
        _ => None,
    };

    let provider = connect(context).await?;
    let resource = provider.resource(type_name).during(Operation::Create)?;
    let cancel = cancel_on_ctrl_c();

    let state = match prior {
        Some(prior) => {
            let replace = resource.requires_replace(&prior, &config);
            if replace.is_empty() {
                display::step(format!("Updating {}", style(type_name).cyan()));
                resource.update(&config, &cancel).await.during(Operation::Update)?
            } else {
                display::warning(format!(
                    "{} changed, replacing the object",
                    replace.join(", ")
                ));
                resource.delete(&prior, &cancel).await.during(Operation::Delete)?;
                resource.create(&config, &cancel).await.during(Operation::Create)?
            }
        }
        None => {
            display::step(format!("Creating {}", style(type_name).cyan()));
            resource.create(&config, &cancel).await.during(Operation::Create)?
        }
    };

    write_state(&state, state_path)?;
    display::success(format!(
        "Applied {} {}",
        style(type_name).cyan(),
        state.get_str("id").unwrap_or_default()
    ));
    Ok(())
}
