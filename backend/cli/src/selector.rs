//! Sheet and conflict selectors for the command line.
//!
//! - [`DecisionFileSelector`]: decisions scripted in a YAML file
//! - [`PromptSelector`]: numbered prompts on a terminal
//! - [`KeepCurrentSelector`]: loads every sheet and keeps every current value

use std::io::{BufRead, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::warn;

use docfill_core::{
    ConflictRecord, DataMapping, DocfillError, Resolution, ResolutionDecision, Selector, SheetId,
};

use crate::terminal_output::render_conflict;

/// Contents of a `--decisions` file.
///
/// ```yaml
/// sheets: [Client, Engagement]
/// decisions:
///   Client_Name: { action: replace, value: "Acme Holdings" }
///   Start_Date: { action: skip }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DecisionFile {
    #[serde(default)]
    pub sheets: Option<Vec<SheetId>>,
    #[serde(default)]
    pub decisions: Resolution,
}

pub struct DecisionFileSelector {
    file: DecisionFile,
}

impl DecisionFileSelector {
    pub fn new(file: DecisionFile) -> Self {
        Self { file }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read decisions file: {}", path.display()))?;
        let file: DecisionFile = serde_yaml::from_str(&raw)
            .with_context(|| format!("Failed to parse decisions file: {}", path.display()))?;
        Ok(Self::new(file))
    }
}

impl Selector for DecisionFileSelector {
    fn select_sheets(&mut self, available: &[SheetId]) -> Result<Vec<SheetId>, DocfillError> {
        Ok(self.file.sheets.clone().unwrap_or_else(|| available.to_vec()))
    }

    /// Only decisions for keys that are actually in conflict are passed on;
    /// stale entries in the file are reported and ignored.
    fn resolve(
        &mut self,
        conflicts: &[ConflictRecord],
        _mapping: &DataMapping,
    ) -> Result<Resolution, DocfillError> {
        let mut resolution = Resolution::new();
        for (key, decision) in self.file.decisions.iter() {
            if conflicts.iter().any(|c| c.key == key) {
                resolution.set(key, decision.clone());
            } else {
                warn!(key, "Decision for a key without a conflict; ignoring");
            }
        }
        Ok(resolution)
    }
}

/// Loads every sheet in source order and keeps all current values.
pub struct KeepCurrentSelector;

impl Selector for KeepCurrentSelector {
    fn select_sheets(&mut self, available: &[SheetId]) -> Result<Vec<SheetId>, DocfillError> {
        Ok(available.to_vec())
    }

    fn resolve(
        &mut self,
        conflicts: &[ConflictRecord],
        _mapping: &DataMapping,
    ) -> Result<Resolution, DocfillError> {
        for record in conflicts {
            warn!(key = %record.key, kept = %record.current, candidates = record.occurrences.len(), "Keeping current value");
        }
        Ok(Resolution::new())
    }
}

/// Interactive numbered prompts. End of input cancels the selection.
pub struct PromptSelector<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> PromptSelector<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn read_line(&mut self) -> Result<Option<String>, DocfillError> {
        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .context("Failed to read from terminal")?;
        Ok((read > 0).then(|| line.trim().to_string()))
    }

    fn say(&mut self, text: &str) -> Result<(), DocfillError> {
        self.output
            .write_all(text.as_bytes())
            .and_then(|_| self.output.flush())
            .context("Failed to write to terminal")?;
        Ok(())
    }

    fn ask_choice(&mut self, record: &ConflictRecord) -> Result<ResolutionDecision, DocfillError> {
        self.say(&render_conflict(record))?;
        loop {
            self.say("Choice [0]: ")?;
            let Some(answer) = self.read_line()? else {
                return Err(DocfillError::NoSelection(format!(
                    "resolution cancelled at key '{}'",
                    record.key
                )));
            };
            if answer.is_empty() || answer == "0" {
                return Ok(ResolutionDecision::Skip);
            }
            match answer.parse::<usize>().ok().and_then(|n| record.occurrences.get(n.wrapping_sub(1))) {
                Some(occ) => return Ok(ResolutionDecision::Replace(occ.value.clone())),
                None => self.say(&format!("Please select a valid option for key '{}'\n", record.key))?,
            }
        }
    }
}

impl<R: BufRead, W: Write> Selector for PromptSelector<R, W> {
    fn select_sheets(&mut self, available: &[SheetId]) -> Result<Vec<SheetId>, DocfillError> {
        let mut menu = String::from("Select sheets (comma-separated numbers, in load order):\n");
        for (i, sheet) in available.iter().enumerate() {
            menu.push_str(&format!("  {}) {}\n", i + 1, sheet));
        }
        self.say(&menu)?;

        loop {
            self.say("Sheets: ")?;
            let Some(answer) = self.read_line()? else {
                return Err(DocfillError::NoSelection("sheet selection cancelled".to_string()));
            };
            let picked: Option<Vec<SheetId>> = answer
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| {
                    s.parse::<usize>()
                        .ok()
                        .and_then(|n| available.get(n.wrapping_sub(1)))
                        .cloned()
                })
                .collect();
            match picked {
                Some(sheets) if !sheets.is_empty() => return Ok(sheets),
                _ => self.say("Please select at least one sheet\n")?,
            }
        }
    }

    fn resolve(
        &mut self,
        conflicts: &[ConflictRecord],
        _mapping: &DataMapping,
    ) -> Result<Resolution, DocfillError> {
        self.say(&format!("{} key(s) have conflicting values.\n", conflicts.len()))?;
        let mut resolution = Resolution::new();
        for record in conflicts {
            let decision = self.ask_choice(record)?;
            resolution.set(record.key.clone(), decision);
        }
        Ok(resolution)
    }
}
