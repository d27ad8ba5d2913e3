//! Saves a mapping as a two-column table (CSV, tab-separated) or JSON.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use docfill_core::{DataMapping, PersistenceSink};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableFormat {
    Csv,
    Tsv,
    Json,
}

impl TableFormat {
    /// Pick a format from the file extension; defaults to CSV.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("tsv") | Some("txt") => TableFormat::Tsv,
            Some("json") => TableFormat::Json,
            _ => TableFormat::Csv,
        }
    }
}

pub struct TablePersistence {
    path: PathBuf,
    format: TableFormat,
}

impl TablePersistence {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let format = TableFormat::from_path(&path);
        Self { path, format }
    }

    pub fn with_format(mut self, format: TableFormat) -> Self {
        self.format = format;
        self
    }

    fn write_table<W: Write>(&self, mapping: &DataMapping, mut out: W) -> Result<()> {
        match self.format {
            TableFormat::Json => {
                serde_json::to_writer_pretty(&mut out, mapping).context("Failed to serialize mapping")?;
                out.flush()?;
            }
            TableFormat::Csv | TableFormat::Tsv => {
                let delimiter = if self.format == TableFormat::Tsv { b'\t' } else { b',' };
                let mut writer = csv::WriterBuilder::new().delimiter(delimiter).from_writer(out);
                writer.write_record(["Key", "Value"])?;
                for (key, value) in mapping.iter() {
                    writer.write_record([key, value])?;
                }
                writer.flush()?;
            }
        }
        Ok(())
    }
}

impl PersistenceSink for TablePersistence {
    /// Write to a temp file next to the target, then rename over it.
    fn persist(&self, mapping: &DataMapping) -> Result<()> {
        if mapping.is_empty() {
            bail!("No data to save");
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let tmp_path = self.path.with_extension("tmp");
        let file = File::create(&tmp_path)
            .with_context(|| format!("Failed to create: {}", tmp_path.display()))?;
        let written = self.write_table(mapping, BufWriter::new(file)).and_then(|()| {
            fs::rename(&tmp_path, &self.path)
                .with_context(|| format!("Failed to move data into: {}", self.path.display()))
        });
        if let Err(e) = written {
            if let Err(cleanup) = fs::remove_file(&tmp_path) {
                warn!(path = %tmp_path.display(), error = %cleanup, "Failed to remove temp file");
            }
            return Err(e);
        }

        info!(path = %self.path.display(), entries = mapping.len(), format = ?self.format, "Saved data");
        Ok(())
    }
}
