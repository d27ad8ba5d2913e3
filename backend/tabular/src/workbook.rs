//! Spreadsheet workbooks (`.xlsx`, `.xlsm`, `.xlsb`, `.xls`, `.ods`) via calamine.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use calamine::{open_workbook_auto, Data, Range, Reader, Sheets};
use tracing::debug;

use docfill_core::{SheetId, SheetRows, TabularSource};

use crate::ReaderOptions;

/// Layout used for date cells; the normalizer turns it into `MM/DD/YYYY`.
const CELL_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct WorkbookSource {
    name: String,
    workbook: Sheets<BufReader<File>>,
    options: ReaderOptions,
}

impl WorkbookSource {
    pub fn open(path: &Path, options: ReaderOptions) -> Result<Self> {
        let workbook = open_workbook_auto(path)
            .with_context(|| format!("Failed to open workbook: {}", path.display()))?;
        debug!(path = %path.display(), "Opened workbook");
        Ok(Self {
            name: path.display().to_string(),
            workbook,
            options,
        })
    }
}

impl TabularSource for WorkbookSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn sheet_names(&self) -> Result<Vec<SheetId>> {
        Ok(self.workbook.sheet_names().into_iter().map(SheetId::new).collect())
    }

    fn read_rows(&mut self, sheet: &SheetId, row_limit: Option<usize>) -> Result<SheetRows> {
        let range = self
            .workbook
            .worksheet_range(sheet.as_str())
            .with_context(|| format!("Failed to read sheet '{sheet}' from {}", self.name))?;
        Ok(range_rows(&range, self.options.skip_header, row_limit))
    }
}

/// First two absolute columns of `range`, starting at row 1 of the sheet.
fn range_rows(range: &Range<Data>, skip_header: bool, row_limit: Option<usize>) -> SheetRows {
    let Some((end_row, end_col)) = range.end() else {
        return SheetRows::default();
    };

    let cell = |row: u32, col: u32| range.get_value((row, col)).and_then(cell_text);
    let rows = (0..=end_row)
        .skip(usize::from(skip_header))
        .take(row_limit.unwrap_or(usize::MAX))
        .map(|row| (cell(row, 0), cell(row, 1)))
        .collect();

    SheetRows {
        column_count: end_col as usize + 1,
        rows,
    }
}

/// Render a cell the way a string-typed spreadsheet read would.
pub(crate) fn cell_text(value: &Data) -> Option<String> {
    match value {
        Data::Empty => None,
        Data::String(s) if s.is_empty() => None,
        Data::String(s) => Some(s.clone()),
        Data::Int(i) => Some(i.to_string()),
        Data::Float(f) => Some(format_number(*f)),
        Data::Bool(b) => Some(if *b { "True" } else { "False" }.to_string()),
        Data::DateTime(dt) => Some(match dt.as_datetime() {
            Some(dt) => dt.format(CELL_DATETIME_FORMAT).to_string(),
            None => format_number(dt.as_f64()),
        }),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(s.clone()),
        Data::Error(e) => Some(e.to_string()),
    }
}

fn format_number(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        f.to_string()
    }
}
