//! One document-generation run: owns the mapping from load to hand-off.

use anyhow::Context;
use tracing::{info, warn};

use crate::error::{DocfillError, Result};
use crate::loader::load_sheet;
use crate::merge::{FoldStats, MergeEngine};
use crate::overrides::OverrideStore;
use crate::resolve::{apply_resolution, ResolutionReport};
use crate::traits::{DocumentRenderer, PersistenceSink, Selector, TabularSource};
use crate::types::{ConflictRecord, DataMapping, SheetId, SheetLoad};

/// Knobs for a single load.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Cap on rows read per sheet.
    pub row_limit: Option<usize>,
    /// Sheets to load, in order. Empty means "ask the selector" when the
    /// source has more than one sheet.
    pub sheets: Vec<SheetId>,
}

/// What happened during [`Session::load`].
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub sheets: Vec<(SheetId, FoldStats)>,
    pub conflicts: Vec<ConflictRecord>,
    pub resolution: ResolutionReport,
}

#[derive(Debug, Default)]
pub struct Session {
    mapping: DataMapping,
}

impl Session {
    /// A session with no loaded data; entries can still be added manually.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_mapping(mapping: DataMapping) -> Self {
        Self { mapping }
    }

    /// Load, merge and resolve the chosen sheets of `source`.
    ///
    /// Any failure aborts the whole load and no session is produced.
    pub fn load(
        source: &mut dyn TabularSource,
        selector: &mut dyn Selector,
        options: &LoadOptions,
    ) -> Result<(Self, LoadReport)> {
        let sheets = choose_sheets(source, selector, options)?;
        info!(source = source.name(), sheets = ?sheets, row_limit = ?options.row_limit, "Loading sheets");

        let loads = sheets
            .iter()
            .map(|sheet| load_sheet(source, sheet, options.row_limit))
            .collect::<Result<Vec<SheetLoad>>>()?;

        let mut engine = MergeEngine::new();
        let mut report = LoadReport::default();
        for load in &loads {
            let stats = engine.fold(load);
            report.sheets.push((load.sheet.clone(), stats));
        }

        let conflicts = engine.eligible_conflicts();
        let mut mapping = engine.into_mapping();
        if !conflicts.is_empty() {
            info!(count = conflicts.len(), "Conflicting keys need resolution");
            let resolution = selector.resolve(&conflicts, &mapping)?;
            report.resolution = apply_resolution(&conflicts, &resolution, &mut mapping)?;
        }
        report.conflicts = conflicts;

        info!(entries = mapping.len(), "Load complete");
        Ok((Self { mapping }, report))
    }

    pub fn mapping(&self) -> &DataMapping {
        &self.mapping
    }

    /// Manual editing handle over this session's mapping.
    pub fn overrides(&mut self) -> OverrideStore<'_> {
        OverrideStore::new(&mut self.mapping)
    }

    /// Hand the mapping to `renderer` once per template, stopping at the
    /// first failure.
    pub fn render_all(
        &self,
        renderer: &dyn DocumentRenderer,
        templates: &[String],
    ) -> anyhow::Result<usize> {
        for template in templates {
            renderer
                .render(template, &self.mapping)
                .with_context(|| format!("Failed to render template: {template}"))?;
        }
        Ok(templates.len())
    }

    pub fn persist(&self, sink: &dyn PersistenceSink) -> anyhow::Result<()> {
        sink.persist(&self.mapping)
    }

    /// Consume the session, yielding the mapping for output collaborators.
    pub fn finalize(self) -> DataMapping {
        self.mapping
    }
}

fn choose_sheets(
    source: &mut dyn TabularSource,
    selector: &mut dyn Selector,
    options: &LoadOptions,
) -> Result<Vec<SheetId>> {
    let available = source.sheet_names()?;
    if available.is_empty() {
        return Err(DocfillError::NoSelection(format!(
            "source '{}' contains no sheets",
            source.name()
        )));
    }

    let chosen = if !options.sheets.is_empty() {
        options.sheets.clone()
    } else if available.len() == 1 {
        available.clone()
    } else {
        selector.select_sheets(&available)?
    };

    if chosen.is_empty() {
        warn!(source = source.name(), "No sheets selected");
        return Err(DocfillError::NoSelection("no sheets selected".to_string()));
    }
    if let Some(missing) = chosen.iter().find(|s| !available.contains(s)) {
        return Err(DocfillError::Source {
            sheet: missing.clone(),
            message: "sheet not found in source".to_string(),
        });
    }
    Ok(chosen)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;

    use super::*;
    use crate::traits::SheetRows;
    use crate::types::{Resolution, ResolutionDecision};

    struct MemorySource {
        sheets: Vec<(SheetId, SheetRows)>,
    }

    impl MemorySource {
        fn new(sheets: &[(&str, &[(&str, &str)])]) -> Self {
            Self {
                sheets: sheets
                    .iter()
                    .map(|(name, rows)| {
                        let rows = SheetRows {
                            column_count: 2,
                            rows: rows
                                .iter()
                                .map(|(k, v)| {
                                    let cell = |s: &str| (!s.is_empty()).then(|| s.to_string());
                                    (cell(*k), cell(*v))
                                })
                                .collect(),
                        };
                        (SheetId::from(*name), rows)
                    })
                    .collect(),
            }
        }
    }

    impl TabularSource for MemorySource {
        fn name(&self) -> &str {
            "memory"
        }

        fn sheet_names(&self) -> anyhow::Result<Vec<SheetId>> {
            Ok(self.sheets.iter().map(|(id, _)| id.clone()).collect())
        }

        fn read_rows(&mut self, sheet: &SheetId, row_limit: Option<usize>) -> anyhow::Result<SheetRows> {
            let (_, rows) = self
                .sheets
                .iter()
                .find(|(id, _)| id == sheet)
                .ok_or_else(|| anyhow::anyhow!("no sheet {sheet}"))?;
            let mut rows = rows.clone();
            if let Some(limit) = row_limit {
                rows.rows.truncate(limit);
            }
            Ok(rows)
        }
    }

    /// Deterministic stand-in for the interactive dialogs.
    #[derive(Default)]
    struct ScriptedSelector {
        sheets: Option<Vec<SheetId>>,
        decisions: HashMap<String, ResolutionDecision>,
        seen_conflicts: Vec<ConflictRecord>,
    }

    impl Selector for ScriptedSelector {
        fn select_sheets(&mut self, available: &[SheetId]) -> Result<Vec<SheetId>> {
            match &self.sheets {
                Some(sheets) => Ok(sheets.clone()),
                None => Ok(available.to_vec()),
            }
        }

        fn resolve(&mut self, conflicts: &[ConflictRecord], _mapping: &DataMapping) -> Result<Resolution> {
            self.seen_conflicts.extend_from_slice(conflicts);
            let mut resolution = Resolution::new();
            for (key, decision) in &self.decisions {
                resolution.set(key.clone(), decision.clone());
            }
            Ok(resolution)
        }
    }

    struct RecordingRenderer {
        rendered: RefCell<Vec<(String, usize)>>,
        fail_on: Option<String>,
    }

    impl DocumentRenderer for RecordingRenderer {
        fn render(&self, template: &str, mapping: &DataMapping) -> anyhow::Result<()> {
            if self.fail_on.as_deref() == Some(template) {
                anyhow::bail!("renderer crashed");
            }
            self.rendered.borrow_mut().push((template.to_string(), mapping.len()));
            Ok(())
        }
    }

    #[test]
    fn single_sheet_source_skips_sheet_selection() {
        let mut source = MemorySource::new(&[("Only", &[("Client Name", "Acme")])]);
        let mut selector = ScriptedSelector {
            sheets: Some(Vec::new()),
            ..Default::default()
        };
        let (session, report) = Session::load(&mut source, &mut selector, &LoadOptions::default()).unwrap();
        assert_eq!(session.mapping().get("Client_Name"), Some("Acme"));
        assert_eq!(report.sheets.len(), 1);
    }

    #[test]
    fn conflicts_are_resolved_through_selector() {
        let mut source = MemorySource::new(&[
            ("A", &[("X", "foo"), ("Date", "2024-03-05")]),
            ("B", &[("X", "bar"), ("Date", "03/05/2024")]),
        ]);
        let mut selector = ScriptedSelector::default();
        selector.decisions.insert("X".into(), ResolutionDecision::Replace("bar".into()));

        let (session, report) = Session::load(&mut source, &mut selector, &LoadOptions::default()).unwrap();
        assert_eq!(session.mapping().get("X"), Some("bar"));
        assert_eq!(session.mapping().get("Date"), Some("03/05/2024"));
        assert_eq!(report.resolution.replaced, vec!["X".to_string()]);
        assert_eq!(selector.seen_conflicts.len(), 1);
    }

    #[test]
    fn invalid_decision_aborts_load() {
        let mut source = MemorySource::new(&[("A", &[("X", "foo")]), ("B", &[("X", "bar")])]);
        let mut selector = ScriptedSelector::default();
        selector.decisions.insert("X".into(), ResolutionDecision::Replace("qux".into()));
        let err = Session::load(&mut source, &mut selector, &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, DocfillError::InvalidSelection { .. }));
    }

    #[test]
    fn empty_sheet_selection_aborts_load() {
        let mut source = MemorySource::new(&[("A", &[("X", "1")]), ("B", &[("Y", "2")])]);
        let mut selector = ScriptedSelector {
            sheets: Some(Vec::new()),
            ..Default::default()
        };
        let err = Session::load(&mut source, &mut selector, &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, DocfillError::NoSelection(_)));
    }

    #[test]
    fn explicit_sheet_order_is_respected() {
        let mut source = MemorySource::new(&[("A", &[("X", "from-a")]), ("B", &[("X", "from-b")])]);
        let mut selector = ScriptedSelector::default();
        let options = LoadOptions {
            sheets: vec![SheetId::from("B"), SheetId::from("A")],
            ..Default::default()
        };
        let (session, report) = Session::load(&mut source, &mut selector, &options).unwrap();
        assert_eq!(session.mapping().get("X"), Some("from-b"));
        assert_eq!(report.conflicts[0].occurrences[0].source, SheetId::from("A"));
    }

    #[test]
    fn unknown_sheet_is_rejected() {
        let mut source = MemorySource::new(&[("A", &[("X", "1")])]);
        let mut selector = ScriptedSelector::default();
        let options = LoadOptions {
            sheets: vec![SheetId::from("Missing")],
            ..Default::default()
        };
        let err = Session::load(&mut source, &mut selector, &options).unwrap_err();
        assert!(matches!(err, DocfillError::Source { .. }));
    }

    #[test]
    fn row_limit_caps_each_sheet() {
        let mut source = MemorySource::new(&[("A", &[("X", "1"), ("Y", "2"), ("Z", "3")])]);
        let mut selector = ScriptedSelector::default();
        let options = LoadOptions {
            row_limit: Some(2),
            ..Default::default()
        };
        let (session, _) = Session::load(&mut source, &mut selector, &options).unwrap();
        assert_eq!(session.mapping().len(), 2);
        assert!(!session.mapping().contains_key("Z"));
    }

    #[test]
    fn overrides_layer_on_loaded_data() {
        let mut source = MemorySource::new(&[("A", &[("Task", "Audit")])]);
        let mut selector = ScriptedSelector::default();
        let (mut session, _) = Session::load(&mut source, &mut selector, &LoadOptions::default()).unwrap();
        session.overrides().upsert("Task", "Review").unwrap();
        session.overrides().upsert("Client Number", "42").unwrap();
        let mapping = session.finalize();
        assert_eq!(mapping.get("Task"), Some("Review"));
        assert_eq!(mapping.get("Client_Number"), Some("42"));
    }

    #[test]
    fn render_all_stops_at_first_failure() {
        let session = Session::from_mapping([("A", "1")].into_iter().collect());
        let renderer = RecordingRenderer {
            rendered: RefCell::new(Vec::new()),
            fail_on: Some("second.docx".into()),
        };
        let templates = vec!["first.docx".to_string(), "second.docx".to_string(), "third.pdf".to_string()];
        let err = session.render_all(&renderer, &templates).unwrap_err();
        assert!(err.to_string().contains("second.docx"));
        assert_eq!(renderer.rendered.borrow().as_slice(), &[("first.docx".to_string(), 1)]);
    }
}
