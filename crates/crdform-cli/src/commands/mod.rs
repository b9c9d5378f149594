//! CLI commands

use std::path::Path;
use std::sync::Arc;

use crdform_core::{AttrValue, Dynamic};
use crdform_kube::{KubeDynamicClient, Operation, Provider};
use tokio_util::sync::CancellationToken;

use crate::error::{CliError, ProviderResultExt, Result};

pub mod apply;
pub mod destroy;
pub mod import;
pub mod read;
pub mod refresh;
pub mod render;
pub mod schema;
pub mod types;

/// Connect to the cluster of the current (or given) kubeconfig context
pub async fn connect(context: Option<&str>) -> Result<Provider> {
    let client = KubeDynamicClient::connect(context)
        .await
        .during(Operation::Read)?;
    Ok(Provider::new(Arc::new(client)))
}

/// Load a YAML configuration file into an attribute value
pub fn load_config(path: &Path) -> Result<AttrValue> {
    let text = read_file(path)?;
    let config = AttrValue::from_yaml_str(&text)?;
    if config.as_mapping().is_none() {
        return Err(CliError::validation(
            "Invalid configuration file",
            format!("{} must contain a YAML mapping", path.display()),
        ));
    }
    Ok(config)
}

/// Load a JSON state document written by an earlier command
pub fn load_state(path: &Path) -> Result<AttrValue> {
    let text = read_file(path)?;
    let json: serde_json::Value = serde_json::from_str(&text)?;
    AttrValue::from_json(&json)
        .map_err(|e| CliError::validation("Invalid state file", e.to_string()))
}

/// Write a state document to `path`, or to stdout when no path is given
pub fn write_state(state: &AttrValue, path: Option<&Path>) -> Result<()> {
    let json = Dynamic::new(state.clone())
        .to_json()
        .map_err(|e| CliError::validation("Unable to encode state", e.to_string()))?;
    let text = serde_json::to_string_pretty(&json)?;
    match path {
        Some(path) => std::fs::write(path, format!("{text}\n"))?,
        None => println!("{text}"),
    }
    Ok(())
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| CliError::Io {
        message: format!("{}: {e}", path.display()),
    })
}

/// A token cancelled on Ctrl-C, so waits stop between polls
pub fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted, cancelling");
            trigger.cancel();
        }
    });
    token
}
