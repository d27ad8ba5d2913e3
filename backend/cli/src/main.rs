mod config_cmd;
mod load_cmd;
mod selector;
mod sheets_cmd;
mod terminal_output;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use docfill_config::{config_dir, config_file_path, load_and_prepare, DocfillConfig, PreparedConfig};
use docfill_logging::{init_logger, AuditLogger};
use docfill_tabular::ReaderOptions;

use config_cmd::ConfigAction;
use load_cmd::LoadArgs;
use terminal_output::note_error;

#[derive(Parser)]
#[command(name = "docfill")]
#[command(about = "DocFill: reconcile key/value spreadsheet data for document filling")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ~/.docfill/config.yaml)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the sheets in a data file
    Sheets {
        file: PathBuf,
    },
    /// Load and reconcile sheets, then preview and optionally save the result
    Load {
        #[command(flatten)]
        args: LoadArgs,
        /// Save the reconciled data (.csv, .tsv/.txt or .json)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
        /// Print the mapping as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Print the form-ready field values as JSON
    Fields {
        #[command(flatten)]
        args: LoadArgs,
    },
    /// Show or create the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        note_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = cli
        .config
        .unwrap_or_else(|| config_file_path(&config_dir()));
    let PreparedConfig { config, warnings } = load_and_prepare(&config_path).await?;
    init_logging(&config)?;
    for warning in &warnings {
        warn!(path = %warning.path, message = %warning.message, "Config warning");
    }

    let audit = AuditLogger::for_now();
    info!(config = %config_path.display(), "DocFill starting");

    match cli.command {
        Commands::Sheets { file } => {
            let reader = config.reader.clone().unwrap_or_default();
            let options = ReaderOptions {
                skip_header: reader.skip_header.unwrap_or(false),
                delimiter: reader.delimiter_byte(),
            };
            sheets_cmd::run(&file, options)?;
        }
        Commands::Load { args, output, json } => {
            load_cmd::run_load(&args, output, json, &config, &audit)?;
        }
        Commands::Fields { args } => {
            load_cmd::run_fields(&args, &config, &audit)?;
        }
        Commands::Config { action } => {
            config_cmd::run(action, &config_path, &config).await?;
        }
    }
    Ok(())
}

fn init_logging(config: &DocfillConfig) -> Result<()> {
    let logging = config.logging.clone().unwrap_or_default();
    let dir = logging
        .dir
        .map(PathBuf::from)
        .unwrap_or_else(|| config_dir().join("logs"));
    let level = logging.level.unwrap_or_else(|| "info".to_string());
    init_logger(&dir, &level).context("Failed to initialize logging")
}
