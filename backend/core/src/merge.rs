//! Merge engine: folds normalized sheets into one mapping and tracks
//! keys whose sheets disagree.
//!
//! Per `(key, value)` in sheet order, then row order:
//! 1. unseen key → insert, even when the value is empty;
//! 2. stored value empty, incoming non-empty → fill in;
//! 3. both non-empty and different → remember `(sheet, value)` once, keep
//!    the stored value;
//! 4. anything else → no change.

use indexmap::IndexMap;
use tracing::debug;

use crate::types::{ConflictRecord, DataMapping, Occurrence, SheetLoad};

#[derive(Debug, Default)]
pub struct MergeEngine {
    mapping: DataMapping,
    occurrences: IndexMap<String, Vec<Occurrence>>,
}

/// Counters for one sheet fold, mostly for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FoldStats {
    pub inserted: usize,
    pub filled: usize,
    pub conflicts: usize,
    pub unchanged: usize,
}

impl MergeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Continue merging on top of an existing mapping.
    pub fn with_mapping(mapping: DataMapping) -> Self {
        Self {
            mapping,
            occurrences: IndexMap::new(),
        }
    }

    pub fn mapping(&self) -> &DataMapping {
        &self.mapping
    }

    /// Fold one sheet into the mapping.
    pub fn fold(&mut self, load: &SheetLoad) -> FoldStats {
        let mut stats = FoldStats::default();
        for entry in &load.entries {
            let current = match self.mapping.get(&entry.key) {
                None => {
                    self.mapping.insert(entry.key.clone(), entry.value.clone());
                    stats.inserted += 1;
                    continue;
                }
                Some(current) => current,
            };

            if current.is_empty() && !entry.value.is_empty() {
                self.mapping.insert(entry.key.clone(), entry.value.clone());
                stats.filled += 1;
            } else if !current.is_empty() && !entry.value.is_empty() && current != entry.value {
                let recorded = self.occurrences.entry(entry.key.clone()).or_default();
                let seen = recorded
                    .iter()
                    .any(|occ| occ.source == load.sheet && occ.value == entry.value);
                if !seen {
                    recorded.push(Occurrence {
                        source: load.sheet.clone(),
                        value: entry.value.clone(),
                    });
                    stats.conflicts += 1;
                }
            } else {
                stats.unchanged += 1;
            }
        }

        debug!(
            sheet = %load.sheet,
            inserted = stats.inserted,
            filled = stats.filled,
            conflicts = stats.conflicts,
            unchanged = stats.unchanged,
            "Folded sheet"
        );
        stats
    }

    /// Every key that picked up at least one disagreeing value, unfiltered.
    pub fn recorded_conflicts(&self) -> impl Iterator<Item = (&str, &[Occurrence])> {
        self.occurrences.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Conflicts worth presenting for resolution.
    ///
    /// A key qualifies only when the mapping holds a non-empty value for it
    /// and every recorded occurrence is non-empty. Occurrences repeating a
    /// value already offered (from another sheet) or equal to the current
    /// value are folded away so each candidate appears once.
    pub fn eligible_conflicts(&self) -> Vec<ConflictRecord> {
        self.occurrences
            .iter()
            .filter_map(|(key, occurrences)| {
                let current = self.mapping.get(key).filter(|v| !v.is_empty())?;
                if occurrences.is_empty() || occurrences.iter().any(|occ| occ.value.is_empty()) {
                    return None;
                }

                let mut offered: Vec<Occurrence> = Vec::with_capacity(occurrences.len());
                for occ in occurrences {
                    if occ.value != current && !offered.iter().any(|o| o.value == occ.value) {
                        offered.push(occ.clone());
                    }
                }
                if offered.is_empty() {
                    return None;
                }

                Some(ConflictRecord {
                    key: key.clone(),
                    current: current.to_string(),
                    occurrences: offered,
                })
            })
            .collect()
    }

    pub fn into_mapping(self) -> DataMapping {
        self.mapping
    }
}

/// Fold every sheet in order and return the mapping with its eligible conflicts.
pub fn merge_sheets(loads: &[SheetLoad]) -> (DataMapping, Vec<ConflictRecord>) {
    let mut engine = MergeEngine::new();
    for load in loads {
        engine.fold(load);
    }
    let conflicts = engine.eligible_conflicts();
    (engine.into_mapping(), conflicts)
}
