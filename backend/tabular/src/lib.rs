//! `docfill-tabular`: concrete readers and writers for DocFill data tables.
//!
//! Provides:
//! - [`WorkbookSource`]: spreadsheet workbooks through calamine
//! - [`CsvSource`]: a CSV/TSV file, or a directory of them
//! - [`TablePersistence`]: saves a mapping as CSV, tab-separated text or JSON

pub mod csv_source;
pub mod sink;
pub mod workbook;

pub use csv_source::CsvSource;
pub use sink::{TableFormat, TablePersistence};
pub use workbook::WorkbookSource;

use std::path::Path;

use anyhow::{bail, Result};
use docfill_core::TabularSource;
use serde::{Deserialize, Serialize};

const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// How a reader turns a file into rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReaderOptions {
    /// Treat the first row of every sheet as a header and drop it.
    #[serde(default)]
    pub skip_header: bool,
    /// Field delimiter for delimited files; inferred from the extension when unset.
    #[serde(default)]
    pub delimiter: Option<u8>,
}

/// Open `path` with the reader its extension calls for.
pub fn open_source(path: &Path, options: ReaderOptions) -> Result<Box<dyn TabularSource>> {
    if path.is_dir() {
        return Ok(Box::new(CsvSource::open(path, options)?));
    }
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        e if WORKBOOK_EXTENSIONS.contains(&e) => Ok(Box::new(WorkbookSource::open(path, options)?)),
        "csv" | "tsv" | "txt" => Ok(Box::new(CsvSource::open(path, options)?)),
        _ => bail!("Unsupported data file: {}", path.display()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.pdf");
        std::fs::write(&path, b"%PDF").unwrap();
        let err = open_source(&path, ReaderOptions::default()).err().unwrap();
        assert!(err.to_string().contains("Unsupported"));
    }

    #[test]
    fn csv_file_opens_as_csv_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        std::fs::write(&path, "A,1\n").unwrap();
        let source = open_source(&path, ReaderOptions::default()).unwrap();
        assert_eq!(source.sheet_names().unwrap().len(), 1);
    }
}
