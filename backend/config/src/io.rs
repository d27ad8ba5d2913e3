//! Config file read and atomic write.

use crate::schema::DocfillConfig;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

/// Default config file name within the config directory.
const CONFIG_FILE_NAME: &str = "config.yaml";

/// Extension of the copy kept when `write_config` replaces a file.
const BACKUP_EXTENSION: &str = "yaml.bak";

/// Resolve the DocFill config directory.
/// Priority: `DOCFILL_CONFIG_DIR` env > `~/.docfill/`
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("DOCFILL_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    match dirs::home_dir() {
        Some(home) => home.join(".docfill"),
        None => PathBuf::from(".docfill"),
    }
}

/// Resolve the full path to the main config file.
pub fn config_file_path(config_dir: &Path) -> PathBuf {
    config_dir.join(CONFIG_FILE_NAME)
}

/// Load and parse the config from disk.
///
/// Returns `Ok(Default::default())` if the file doesn't exist (first run).
pub async fn load_config(path: &Path) -> Result<DocfillConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "Config file does not exist; using defaults");
        return Ok(DocfillConfig::default());
    }

    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    // An empty file parses as YAML null.
    if raw.trim().is_empty() {
        return Ok(DocfillConfig::default());
    }

    let config: DocfillConfig = serde_yaml::from_str(&raw)
        .with_context(|| format!("Failed to parse config YAML at: {}", path.display()))?;

    info!(path = %path.display(), "Loaded config");
    Ok(config)
}

/// Replace the config at `path` with `config`.
///
/// An existing file is first copied to `config.yaml.bak`; the new content is
/// written to a temp file and renamed into place.
pub async fn write_config(config: &DocfillConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await.with_context(|| {
            format!("Failed to create config directory: {}", parent.display())
        })?;
    }

    if path.exists() {
        let backup = path.with_extension(BACKUP_EXTENSION);
        if let Err(e) = fs::copy(path, &backup).await {
            warn!(backup = %backup.display(), error = %e, "Failed to back up previous config");
        }
    }

    let yaml = serde_yaml::to_string(config).context("Failed to serialize config to YAML")?;
    let tmp_path = path.with_extension("yaml.tmp");
    fs::write(&tmp_path, yaml)
        .await
        .with_context(|| format!("Failed to write temp config: {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path)
        .await
        .with_context(|| format!("Failed to replace config: {}", path.display()))?;

    info!(path = %path.display(), "Wrote config");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ReaderConfig;

    #[tokio::test]
    async fn missing_file_yields_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("absent.yaml")).await.unwrap();
        assert_eq!(config, DocfillConfig::default());
    }

    #[tokio::test]
    async fn write_then_load_keeps_backup() {
        let dir = tempfile::tempdir().unwrap();
        let path = config_file_path(dir.path());

        let mut config = DocfillConfig::default();
        config.reader = Some(ReaderConfig {
            row_limit: Some(25),
            ..Default::default()
        });
        write_config(&config, &path).await.unwrap();
        write_config(&DocfillConfig::default(), &path).await.unwrap();

        let backup = load_config(&path.with_extension("yaml.bak")).await.unwrap();
        assert_eq!(backup.reader.unwrap().row_limit, Some(25));
        assert_eq!(load_config(&path).await.unwrap(), DocfillConfig::default());
        assert!(!path.with_extension("yaml.tmp").exists());
    }

    #[tokio::test]
    async fn malformed_yaml_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "reader: [not, a, map]").unwrap();
        let err = load_config(&path).await.unwrap_err();
        assert!(err.to_string().contains("config.yaml"));
    }
}
