//! Read command - look up an existing object through a data source

use std::path::Path;

use crdform_kube::Operation;

use crate::commands::{connect, load_config, write_state};
use crate::error::{ProviderResultExt, Result};

pub async fn run(type_name: &str, file: &Path, context: Option<&str>) -> Result<()> {
    let config = load_config(file)?;
    let provider = connect(context).await?;
    let source = provider.data_source(type_name).during(Operation::Read)?;

    let state = source.read(&config).await.during(Operation::Read)?;
    write_state(&state, None)
}
