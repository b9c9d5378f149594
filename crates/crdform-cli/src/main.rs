//! crdform CLI - manage Kubernetes custom resources from YAML configuration

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod commands;
mod display;
mod error;
mod exit_codes;

use error::Result;

#[derive(Parser)]
#[command(name = "crdform")]
#[command(author = "crdform Contributors")]
#[command(version)]
#[command(about = "Render, read and manage Kubernetes custom resources", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Kubeconfig context to use instead of the current one
    #[arg(long, global = true, env = "CRDFORM_CONTEXT")]
    context: Option<String>,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List data sources and resources
    Types {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the schema of a data source or resource
    Schema {
        /// Type name, e.g. k8s_cert_manager_io_certificate_v1
        type_name: String,

        /// Show the data source schema instead of the resource schema
        #[arg(long)]
        data_source: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Render a manifest data source to YAML (no cluster needed)
    Render {
        /// Manifest type name, e.g. k8s_cert_manager_io_certificate_v1_manifest
        type_name: String,

        /// Configuration file
        #[arg(short = 'f', long = "file")]
        file: PathBuf,

        /// Print the full data source state as JSON instead of the YAML
        #[arg(long)]
        state: bool,
    },

    /// Read an existing object through a data source
    Read {
        type_name: String,

        /// Configuration file
        #[arg(short = 'f', long = "file")]
        file: PathBuf,
    },

    /// Create or update an object
    Apply {
        type_name: String,

        /// Configuration file
        #[arg(short = 'f', long = "file")]
        file: PathBuf,

        /// State file, read as prior state if it exists and written afterwards
        #[arg(long)]
        state: Option<PathBuf>,
    },

    /// Re-read an object into its state file
    Refresh {
        type_name: String,

        /// State file
        #[arg(long)]
        state: PathBuf,
    },

    /// Delete an object
    Destroy {
        type_name: String,

        /// Configuration file
        #[arg(short = 'f', long = "file", required_unless_present = "state")]
        file: Option<PathBuf>,

        /// State file, removed after deletion
        #[arg(long)]
        state: Option<PathBuf>,
    },

    /// Import an existing object by `namespace/name` (or `name`)
    Import {
        type_name: String,

        id: String,

        /// Write the imported state here instead of stdout
        #[arg(long)]
        state: Option<PathBuf>,
    },
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let context = cli.context.as_deref();

    match cli.command {
        Commands::Types { json } => commands::types::run(json),

        Commands::Schema {
            type_name,
            data_source,
            json,
        } => commands::schema::run(&type_name, data_source, json),

        Commands::Render {
            type_name,
            file,
            state,
        } => commands::render::run(&type_name, &file, state),

        Commands::Read { type_name, file } => commands::read::run(&type_name, &file, context).await,

        Commands::Apply {
            type_name,
            file,
            state,
        } => commands::apply::run(&type_name, &file, state.as_deref(), context).await,

        Commands::Refresh { type_name, state } => {
            commands::refresh::run(&type_name, &state, context).await
        }

        Commands::Destroy {
            type_name,
            file,
            state,
        } => commands::destroy::run(&type_name, file.as_deref(), state.as_deref(), context).await,

        Commands::Import {
            type_name,
            id,
            state,
        } => commands::import::run(&type_name, &id, state.as_deref(), context).await,
    }
}

#[tokio::main]
async fn main() {
    miette::set_panic_hook();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if !err.use_stderr() => err.exit(),
        Err(err) => {
            let _ = err.print();
            std::process::exit(exit_codes::USAGE_ERROR);
        }
    };
    init_tracing(cli.debug);

    let code = match run(cli).await {
        Ok(()) => exit_codes::SUCCESS,
        Err(err) => {
            let code = err.exit_code();
            eprintln!("{:?}", miette::Report::new(err));
            code
        }
    };
    std::process::exit(code);
}
