//! `docfill config`: inspect or create the config file.

use std::path::Path;

use anyhow::{bail, Result};
use clap::Subcommand;

use docfill_config::{apply_all_defaults, write_config, DocfillConfig};

use crate::terminal_output::{note_success, note_warn};

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective config (file, env substitution and defaults)
    Show,
    /// Write a config file populated with the defaults
    Init {
        /// Overwrite an existing file (the old one is kept as a backup)
        #[arg(long)]
        force: bool,
    },
}

pub async fn run(action: ConfigAction, path: &Path, effective: &DocfillConfig) -> Result<()> {
    match action {
        ConfigAction::Show => {
            if !path.exists() {
                note_warn(&format!("No config at {}; showing defaults", path.display()));
            }
            print!("{}", serde_yaml::to_string(effective)?);
        }
        ConfigAction::Init { force } => {
            if path.exists() && !force {
                bail!("Config already exists at {} (use --force to overwrite)", path.display());
            }
            write_config(&apply_all_defaults(DocfillConfig::default()), path).await?;
            note_success(&format!("Wrote config to {}", path.display()));
        }
    }
    Ok(())
}
