//! `docfill sheets`: list what a data file offers.

use std::path::Path;

use anyhow::Result;

use docfill_tabular::{open_source, ReaderOptions};

use crate::terminal_output::note_info;

pub fn run(file: &Path, options: ReaderOptions) -> Result<()> {
    let source = open_source(file, options)?;
    let sheets = source.sheet_names()?;
    for (i, sheet) in sheets.iter().enumerate() {
        println!("{:>3}) {}", i + 1, sheet);
    }
    note_info(&format!("{} sheet(s) in {}", sheets.len(), source.name()));
    Ok(())
}
