//! `docfill-config`: DocFill configuration management.
//!
//! Provides:
//! - Typed config schema (reader, output, logging, forms)
//! - YAML read and atomic write, keeping one backup
//! - `${ENV_VAR}` substitution
//! - Default value application
//! - Schema validation

pub mod defaults;
pub mod env;
pub mod io;
pub mod schema;
pub mod validation;

pub use defaults::apply_all_defaults;
pub use env::{resolve_env_vars, resolve_env_vars_with, MissingEnvVarError};
pub use io::{config_dir, config_file_path, load_config, write_config};
pub use schema::{DocfillConfig, FormsConfig, LoggingConfig, OutputConfig, ReaderConfig};
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::path::Path;

/// A config ready for use, plus the validation warnings it produced.
///
/// Loading happens before the logger exists; callers report `warnings`
/// once logging is up.
#[derive(Debug)]
pub struct PreparedConfig {
    pub config: DocfillConfig,
    pub warnings: Vec<ConfigValidationError>,
}

/// Load, apply env substitution and defaults, then validate a config file.
///
/// This is the main entry point for loading a config at runtime.
pub async fn load_and_prepare(path: &Path) -> Result<PreparedConfig> {
    let raw_config = load_config(path).await?;

    let value: Value =
        serde_json::to_value(&raw_config).context("Failed to serialize config for processing")?;
    let value = resolve_env_vars(&value).context("Failed to resolve env vars in config")?;
    let config: DocfillConfig =
        serde_json::from_value(value).context("Failed to deserialize config after processing")?;

    let config = apply_all_defaults(config);

    let report = validate(&config);
    if !report.is_valid() {
        let errors: Vec<String> = report.errors.iter().map(ToString::to_string).collect();
        bail!(
            "Config at {} has {} error(s): {}",
            path.display(),
            errors.len(),
            errors.join("; ")
        );
    }

    Ok(PreparedConfig {
        config,
        warnings: report.warnings,
    })
}
