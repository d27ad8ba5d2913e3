//! `docfill load` and `docfill fields`: read, reconcile, edit and save data.

use std::io;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use tracing::info;

use docfill_config::DocfillConfig;
use docfill_core::{
    prepare_form_fields, DataMapping, FormFieldPolicy, LoadOptions, LoadReport, Selector, Session,
    SheetId, UpsertOutcome,
};
use docfill_logging::{AuditEvent, AuditLogger};
use docfill_tabular::{open_source, ReaderOptions, TableFormat, TablePersistence};

use crate::selector::{DecisionFileSelector, KeepCurrentSelector, PromptSelector};
use crate::terminal_output::{note_info, note_success, note_warn, render_preview};

/// Options shared by every command that loads a data file.
#[derive(Args, Debug, Clone)]
pub struct LoadArgs {
    /// Workbook (.xlsx/.xls/.ods), CSV/TSV file, or directory of CSV files
    pub file: PathBuf,

    /// Sheet to load; repeat to merge several, in the given order
    #[arg(short, long = "sheet", value_name = "NAME")]
    pub sheets: Vec<String>,

    /// Read at most this many rows from each sheet
    #[arg(short = 'n', long)]
    pub rows: Option<usize>,

    /// Treat the first row of each sheet as a header
    #[arg(long)]
    pub skip_header: bool,

    /// YAML file with sheet choices and conflict decisions
    #[arg(long, value_name = "FILE", conflicts_with = "interactive")]
    pub decisions: Option<PathBuf>,

    /// Prompt on the terminal for sheets and conflicts
    #[arg(short, long)]
    pub interactive: bool,

    /// Add or replace an entry after loading
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,

    /// Remove an entry (by canonical key) after loading
    #[arg(long = "unset", value_name = "KEY")]
    pub unset: Vec<String>,
}

impl LoadArgs {
    fn reader_options(&self, config: &DocfillConfig) -> ReaderOptions {
        let reader = config.reader.clone().unwrap_or_default();
        ReaderOptions {
            skip_header: self.skip_header || reader.skip_header.unwrap_or(false),
            delimiter: reader.delimiter_byte(),
        }
    }

    fn load_options(&self, config: &DocfillConfig) -> LoadOptions {
        LoadOptions {
            row_limit: self.rows.or_else(|| config.reader.as_ref().and_then(|r| r.row_limit)),
            sheets: self.sheets.iter().map(|s| SheetId::new(s.as_str())).collect(),
        }
    }

    fn selector(&self) -> Result<Box<dyn Selector>> {
        if let Some(path) = &self.decisions {
            return Ok(Box::new(DecisionFileSelector::from_path(path)?));
        }
        if self.interactive {
            return Ok(Box::new(PromptSelector::new(io::stdin().lock(), io::stderr())));
        }
        Ok(Box::new(KeepCurrentSelector))
    }
}

/// Load, reconcile and apply manual edits.
pub fn build_session(args: &LoadArgs, config: &DocfillConfig, audit: &AuditLogger) -> Result<Session> {
    let mut source = open_source(&args.file, args.reader_options(config))?;
    let mut selector = args.selector()?;

    let (mut session, report) =
        Session::load(source.as_mut(), selector.as_mut(), &args.load_options(config))
            .with_context(|| format!("Failed to load {}", args.file.display()))?;
    record_load(&report, session.mapping(), audit);

    for pair in &args.set {
        let Some((key, value)) = pair.split_once('=') else {
            bail!("--set expects KEY=VALUE, got '{pair}'");
        };
        let outcome = session.overrides().upsert(key, value)?;
        match outcome {
            UpsertOutcome::Unchanged { key } => note_info(&format!("No change detected for {key}")),
            outcome => {
                let key = outcome.key().to_string();
                let value = session.mapping().get(&key).unwrap_or_default().to_string();
                audit.log(AuditEvent::EntryChanged { key, value });
            }
        }
    }
    for key in &args.unset {
        session.overrides().remove(key)?;
        audit.log(AuditEvent::EntryRemoved { key: key.clone() });
    }

    Ok(session)
}

fn record_load(report: &LoadReport, mapping: &DataMapping, audit: &AuditLogger) {
    for (sheet, stats) in &report.sheets {
        audit.log(AuditEvent::SheetLoaded {
            sheet: sheet.to_string(),
            inserted: stats.inserted,
            filled: stats.filled,
            conflicts: stats.conflicts,
        });
    }
    for record in &report.conflicts {
        let chosen = report
            .resolution
            .replaced
            .contains(&record.key)
            .then(|| mapping.get(&record.key).unwrap_or_default().to_string());
        audit.log(AuditEvent::ConflictResolved {
            key: record.key.clone(),
            kept: record.current.clone(),
            chosen,
        });
    }
    if !report.resolution.skipped.is_empty() {
        note_warn(&format!(
            "Kept current value for {} conflicting key(s): {}",
            report.resolution.skipped.len(),
            report.resolution.skipped.join(", ")
        ));
    }
}

/// `docfill load`
pub fn run_load(
    args: &LoadArgs,
    output: Option<PathBuf>,
    json: bool,
    config: &DocfillConfig,
    audit: &AuditLogger,
) -> Result<()> {
    let session = build_session(args, config, audit)?;

    if json {
        println!("{}", serde_json::to_string_pretty(session.mapping())?);
    } else {
        print!("{}", render_preview(session.mapping()));
    }

    let output_config = config.output.clone().unwrap_or_default();
    if let Some(path) = output.or_else(|| output_config.path.map(PathBuf::from)) {
        let mut sink = TablePersistence::new(&path);
        if let Some(format) = output_config.format.as_deref() {
            sink = sink.with_format(parse_format(format)?);
        }
        session.persist(&sink)?;
        audit.log(AuditEvent::DataSaved {
            path: path.display().to_string(),
            entries: session.mapping().len(),
        });
        note_success(&format!("Data saved to: {}", path.display()));
    }

    info!(entries = session.mapping().len(), "Load finished");
    Ok(())
}

/// `docfill fields`: the values a form filler would receive.
pub fn run_fields(args: &LoadArgs, config: &DocfillConfig, audit: &AuditLogger) -> Result<()> {
    let session = build_session(args, config, audit)?;
    let fields: DataMapping = prepare_form_fields(session.mapping(), &form_policy(config))
        .into_iter()
        .collect();
    println!("{}", serde_json::to_string_pretty(&fields)?);
    Ok(())
}

/// Build the check-box policy from the (defaulted) forms section.
pub fn form_policy(config: &DocfillConfig) -> FormFieldPolicy {
    let defaults = FormFieldPolicy::default();
    let Some(forms) = config.forms.clone() else {
        return defaults;
    };
    let lowercase = |values: Vec<String>| -> Vec<String> {
        values.into_iter().map(|v| v.to_lowercase()).collect()
    };
    FormFieldPolicy {
        checkbox_prefixes: forms.checkbox_prefixes.map(lowercase).unwrap_or(defaults.checkbox_prefixes),
        checkbox_markers: forms.checkbox_markers.map(lowercase).unwrap_or(defaults.checkbox_markers),
        truthy_values: forms.truthy_values.map(lowercase).unwrap_or(defaults.truthy_values),
        checked_value: forms.checked_value.unwrap_or(defaults.checked_value),
        unchecked_value: forms.unchecked_value.unwrap_or(defaults.unchecked_value),
    }
}

fn parse_format(format: &str) -> Result<TableFormat> {
    match format.to_ascii_lowercase().as_str() {
        "csv" => Ok(TableFormat::Csv),
        "tsv" => Ok(TableFormat::Tsv),
        "json" => Ok(TableFormat::Json),
        other => bail!("Unknown output format '{other}'"),
    }
}
