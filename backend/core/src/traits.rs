use anyhow::Result;

use crate::error::DocfillError;
use crate::types::{ConflictRecord, DataMapping, Resolution, SheetId};

/// The raw first-two-column contents of one sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetRows {
    /// Widest row observed in the sheet, used for the two-column check.
    pub column_count: usize,
    /// `(key cell, value cell)` per row; `None` marks a blank cell.
    pub rows: Vec<(Option<String>, Option<String>)>,
}

/// A readable tabular file (workbook, CSV file, CSV directory).
///
/// Readers decide header handling from their own configuration; every row
/// returned here is treated as data.
pub trait TabularSource {
    /// Human-readable identifier of the source, for logs.
    fn name(&self) -> &str;

    /// Sheets contained in the source, in source order.
    fn sheet_names(&self) -> Result<Vec<SheetId>>;

    /// Read up to `row_limit` rows of the given sheet.
    fn read_rows(&mut self, sheet: &SheetId, row_limit: Option<usize>) -> Result<SheetRows>;
}

/// Strategy that stands in for the interactive sheet picker and conflict dialog.
pub trait Selector {
    /// Choose which sheets to load, in load order. Called only when the
    /// source offers more than one sheet.
    fn select_sheets(&mut self, available: &[SheetId]) -> Result<Vec<SheetId>, DocfillError>;

    /// Decide every eligible conflict. Keys left out default to `Skip`.
    fn resolve(
        &mut self,
        conflicts: &[ConflictRecord],
        mapping: &DataMapping,
    ) -> Result<Resolution, DocfillError>;
}

/// Produces one output document from a template and the finalized mapping.
pub trait DocumentRenderer {
    fn render(&self, template: &str, mapping: &DataMapping) -> Result<()>;
}

/// Serializes the finalized mapping somewhere durable.
pub trait PersistenceSink {
    fn persist(&self, mapping: &DataMapping) -> Result<()>;
}
