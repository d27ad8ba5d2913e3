//! Applies a batch of conflict decisions to the mapping.

use tracing::info;

use crate::error::{DocfillError, Result};
use crate::types::{ConflictRecord, DataMapping, Resolution, ResolutionDecision};

/// What a validated batch did to the mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionReport {
    pub replaced: Vec<String>,
    pub skipped: Vec<String>,
}

/// Validate every decision first, then apply the whole batch.
///
/// A decision for a key that has no conflict record, or a `Replace` whose
/// value was not offered, rejects the batch and leaves `mapping` untouched.
pub fn apply_resolution(
    conflicts: &[ConflictRecord],
    resolution: &Resolution,
    mapping: &mut DataMapping,
) -> Result<ResolutionReport> {
    for (key, decision) in resolution.iter() {
        let record = conflicts.iter().find(|c| c.key == key);
        match (record, decision) {
            (Some(_), ResolutionDecision::Skip) => {}
            (Some(record), ResolutionDecision::Replace(value)) if record.offers(value) => {}
            (_, decision) => {
                let value = match decision {
                    ResolutionDecision::Skip => "skip".to_string(),
                    ResolutionDecision::Replace(value) => value.clone(),
                };
                return Err(DocfillError::InvalidSelection {
                    key: key.to_string(),
                    value,
                });
            }
        }
    }

    let mut report = ResolutionReport::default();
    for record in conflicts {
        match resolution.get(&record.key) {
            ResolutionDecision::Replace(value) => {
                mapping.insert(record.key.clone(), value.clone());
                info!(key = %record.key, from = %record.current, to = %value, "Resolved conflict: replaced");
                report.replaced.push(record.key.clone());
            }
            ResolutionDecision::Skip => {
                info!(key = %record.key, kept = %record.current, "Resolved conflict: kept current");
                report.skipped.push(record.key.clone());
            }
        }
    }
    Ok(report)
}
