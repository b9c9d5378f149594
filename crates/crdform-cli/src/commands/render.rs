//! Render command - evaluate a manifest data source without a cluster

use std::path::Path;

use crdform_kube::{Operation, Provider};

use crate::commands::{load_config, write_state};
use crate::error::{ProviderResultExt, Result};

pub fn run(type_name: &str, file: &Path, state: bool) -> Result<()> {
    let source = Provider::offline()
        .manifest(type_name)
        .during(Operation::Render)?;
    let config = load_config(file)?;
    let result = source.read(&config).during(Operation::Render)?;

    if state {
        return write_state(&result, None);
    }
    print!("{}", result.get_str("yaml").unwrap_or_default());
    Ok(())
}
