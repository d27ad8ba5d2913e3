//! Sheet loader: first two columns of one sheet → normalized entries.

use tracing::{debug, warn};

use crate::error::{DocfillError, Result};
use crate::normalize::{normalize_key, normalize_value};
use crate::traits::{SheetRows, TabularSource};
use crate::types::{Entry, RawEntry, SheetId, SheetLoad};

/// Read one sheet from `source` and normalize it.
pub fn load_sheet(
    source: &mut dyn TabularSource,
    sheet: &SheetId,
    row_limit: Option<usize>,
) -> Result<SheetLoad> {
    let rows = source
        .read_rows(sheet, row_limit)
        .map_err(|e| DocfillError::Source {
            sheet: sheet.clone(),
            message: format!("{e:#}"),
        })?;
    normalize_rows(sheet, rows)
}

/// Validate and normalize already-read rows.
pub fn normalize_rows(sheet: &SheetId, rows: SheetRows) -> Result<SheetLoad> {
    if rows.rows.is_empty() {
        warn!(sheet = %sheet, "Sheet is empty");
        return Ok(SheetLoad {
            sheet: sheet.clone(),
            entries: Vec::new(),
        });
    }
    if rows.column_count < 2 {
        return Err(DocfillError::Schema {
            sheet: sheet.clone(),
            columns: rows.column_count,
        });
    }

    let total = rows.rows.len();
    let entries: Vec<Entry> = raw_entries(sheet, rows)
        .filter_map(|raw| {
            let key = normalize_key(raw.key.as_deref());
            if key.is_empty() {
                return None;
            }
            let value = normalize_value(raw.value.as_deref());
            Some(Entry { key, value })
        })
        .collect();

    debug!(
        sheet = %sheet,
        rows = total,
        entries = entries.len(),
        dropped = total - entries.len(),
        "Loaded sheet"
    );

    Ok(SheetLoad {
        sheet: sheet.clone(),
        entries,
    })
}

fn raw_entries(sheet: &SheetId, rows: SheetRows) -> impl Iterator<Item = RawEntry> + '_ {
    rows.rows
        .into_iter()
        .map(move |(key, value)| RawEntry::new(key, value, sheet.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(pairs: &[(Option<&str>, Option<&str>)]) -> SheetRows {
        SheetRows {
            column_count: 2,
            rows: pairs
                .iter()
                .map(|(k, v)| (k.map(str::to_string), v.map(str::to_string)))
                .collect(),
        }
    }

    #[test]
    fn normalizes_keys_and_values() {
        let sheet = SheetId::from("Sheet1");
        let load = normalize_rows(
            &sheet,
            rows(&[(Some("Start Date"), Some("2024-03-05")), (Some("Client (Name)"), Some("Acme"))]),
        )
        .unwrap();
        assert_eq!(
            load.entries,
            vec![
                Entry { key: "Start_Date".into(), value: "03/05/2024".into() },
                Entry { key: "Client_Name".into(), value: "Acme".into() },
            ]
        );
    }

    #[test]
    fn drops_rows_with_empty_keys() {
        let sheet = SheetId::from("Sheet1");
        let load = normalize_rows(
            &sheet,
            rows(&[(None, Some("orphan")), (Some("()"), Some("x")), (Some("Kept"), None)]),
        )
        .unwrap();
        assert_eq!(load.entries, vec![Entry { key: "Kept".into(), value: String::new() }]);
    }

    #[test]
    fn single_column_sheet_is_schema_error() {
        let sheet = SheetId::from("Narrow");
        let mut narrow = rows(&[(Some("Key"), None)]);
        narrow.column_count = 1;
        let err = normalize_rows(&sheet, narrow).unwrap_err();
        assert!(matches!(err, DocfillError::Schema { columns: 1, .. }));
    }

    #[test]
    fn empty_sheet_loads_nothing() {
        let sheet = SheetId::from("Blank");
        let load = normalize_rows(&sheet, SheetRows::default()).unwrap();
        assert!(load.is_empty());
    }
}
