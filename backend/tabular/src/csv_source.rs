//! CSV/TSV sources. A file is one sheet named after its stem; a directory
//! is one sheet per delimited file, in file-name order.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::debug;

use docfill_core::{SheetId, SheetRows, TabularSource};

use crate::ReaderOptions;

const DELIMITED_EXTENSIONS: &[&str] = &["csv", "tsv", "txt"];

pub struct CsvSource {
    name: String,
    sheets: Vec<(SheetId, PathBuf)>,
    options: ReaderOptions,
}

impl CsvSource {
    pub fn open(path: &Path, options: ReaderOptions) -> Result<Self> {
        let sheets = if path.is_dir() {
            let mut files: Vec<PathBuf> = std::fs::read_dir(path)
                .with_context(|| format!("Failed to list directory: {}", path.display()))?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| p.is_file() && is_delimited(p))
                .collect();
            files.sort();
            files.into_iter().map(|p| (sheet_id_for(&p), p)).collect()
        } else if path.is_file() {
            vec![(sheet_id_for(path), path.to_path_buf())]
        } else {
            bail!("No such file or directory: {}", path.display());
        };

        debug!(path = %path.display(), sheets = sheets.len(), "Opened delimited source");
        Ok(Self {
            name: path.display().to_string(),
            sheets,
            options,
        })
    }

    fn delimiter_for(&self, path: &Path) -> u8 {
        if let Some(delimiter) = self.options.delimiter {
            return delimiter;
        }
        match extension(path).as_deref() {
            Some("tsv") | Some("txt") => b'\t',
            _ => b',',
        }
    }
}

impl TabularSource for CsvSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn sheet_names(&self) -> Result<Vec<SheetId>> {
        Ok(self.sheets.iter().map(|(id, _)| id.clone()).collect())
    }

    fn read_rows(&mut self, sheet: &SheetId, row_limit: Option<usize>) -> Result<SheetRows> {
        let Some((_, path)) = self.sheets.iter().find(|(id, _)| id == sheet) else {
            bail!("Sheet '{sheet}' not found in {}", self.name);
        };
        let file = File::open(path).with_context(|| format!("Failed to open: {}", path.display()))?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(self.delimiter_for(path))
            .from_reader(file);

        let skip = usize::from(self.options.skip_header);
        let mut out = SheetRows::default();
        for record in reader.records().skip(skip).take(row_limit.unwrap_or(usize::MAX)) {
            let record = record.with_context(|| format!("Malformed row in {}", path.display()))?;
            out.column_count = out.column_count.max(record.len());
            let cell = |i: usize| record.get(i).filter(|s| !s.is_empty()).map(str::to_string);
            out.rows.push((cell(0), cell(1)));
        }
        Ok(out)
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

fn is_delimited(path: &Path) -> bool {
    extension(path).is_some_and(|e| DELIMITED_EXTENSIONS.contains(&e.as_str()))
}

fn sheet_id_for(path: &Path) -> SheetId {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    SheetId::new(stem)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn single_file_is_one_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "client.csv", "Client Name,Acme\nStart Date,2024-03-05\n");
        let mut source = CsvSource::open(&path, ReaderOptions::default()).unwrap();
        let sheets = source.sheet_names().unwrap();
        assert_eq!(sheets, vec![SheetId::from("client")]);

        let rows = source.read_rows(&sheets[0], None).unwrap();
        assert_eq!(rows.column_count, 2);
        assert_eq!(rows.rows[0], (Some("Client Name".into()), Some("Acme".into())));
    }

    #[test]
    fn directory_lists_delimited_files_in_order() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "b.csv", "X,1\n");
        write(dir.path(), "a.tsv", "X\t2\n");
        write(dir.path(), "notes.md", "ignored");
        let source = CsvSource::open(dir.path(), ReaderOptions::default()).unwrap();
        assert_eq!(source.sheet_names().unwrap(), vec![SheetId::from("a"), SheetId::from("b")]);
    }

    #[test]
    fn tab_files_use_tab_delimiter() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "data.tsv", "Client, Inc\tAcme, Inc\n");
        let mut source = CsvSource::open(&path, ReaderOptions::default()).unwrap();
        let rows = source.read_rows(&SheetId::from("data"), None).unwrap();
        assert_eq!(rows.rows[0], (Some("Client, Inc".into()), Some("Acme, Inc".into())));
    }

    #[test]
    fn header_skip_and_row_limit() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "s.csv", "Key,Value\nA,1\nB,2\nC,3\n");
        let options = ReaderOptions {
            skip_header: true,
            ..Default::default()
        };
        let mut source = CsvSource::open(&path, options).unwrap();
        let rows = source.read_rows(&SheetId::from("s"), Some(2)).unwrap();
        let keys: Vec<_> = rows.rows.iter().map(|(k, _)| k.clone().unwrap()).collect();
        assert_eq!(keys, vec!["A", "B"]);
    }

    #[test]
    fn blank_cells_and_narrow_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "s.csv", "OnlyKey\n,orphan\n");
        let mut source = CsvSource::open(&path, ReaderOptions::default()).unwrap();
        let rows = source.read_rows(&SheetId::from("s"), None).unwrap();
        assert_eq!(rows.column_count, 2);
        assert_eq!(rows.rows[0], (Some("OnlyKey".into()), None));
        assert_eq!(rows.rows[1], (None, Some("orphan".into())));
    }

    #[test]
    fn missing_path_fails() {
        assert!(CsvSource::open(Path::new("/definitely/not/here.csv"), ReaderOptions::default()).is_err());
    }
}
