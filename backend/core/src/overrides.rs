//! Manual key/value overrides layered on top of loaded data.

use tracing::debug;

use crate::error::{DocfillError, Result};
use crate::normalize::{normalize_key, normalize_value};
use crate::types::DataMapping;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted { key: String },
    Updated { key: String, previous: String },
    /// The normalized pair was already present.
    Unchanged { key: String },
}

impl UpsertOutcome {
    pub fn key(&self) -> &str {
        match self {
            UpsertOutcome::Inserted { key }
            | UpsertOutcome::Updated { key, .. }
            | UpsertOutcome::Unchanged { key } => key,
        }
    }

    pub fn changed(&self) -> bool {
        !matches!(self, UpsertOutcome::Unchanged { .. })
    }
}

/// Editing handle over a session's mapping. Manual entries always win and
/// never produce conflicts.
#[derive(Debug)]
pub struct OverrideStore<'a> {
    mapping: &'a mut DataMapping,
}

impl<'a> OverrideStore<'a> {
    pub fn new(mapping: &'a mut DataMapping) -> Self {
        Self { mapping }
    }

    /// Normalize and insert or replace a pair.
    pub fn upsert(&mut self, raw_key: &str, raw_value: &str) -> Result<UpsertOutcome> {
        let key = normalize_key(Some(raw_key.trim()));
        if key.is_empty() {
            return Err(DocfillError::EmptyKey {
                raw: raw_key.to_string(),
            });
        }
        let value = normalize_value(Some(raw_value.trim()));

        let outcome = match self.mapping.get(&key) {
            Some(existing) if existing == value => return Ok(UpsertOutcome::Unchanged { key }),
            Some(existing) => UpsertOutcome::Updated {
                key: key.clone(),
                previous: existing.to_string(),
            },
            None => UpsertOutcome::Inserted { key: key.clone() },
        };
        debug!(key = %key, value = %value, "Applied manual entry");
        self.mapping.insert(key, value);
        Ok(outcome)
    }

    /// Remove an entry by its canonical key.
    pub fn remove(&mut self, key: &str) -> Result<String> {
        let removed = self
            .mapping
            .remove(key)
            .ok_or_else(|| DocfillError::KeyNotFound(key.to_string()))?;
        debug!(key = %key, "Removed entry");
        Ok(removed)
    }

    pub fn list(&self) -> Vec<(String, String)> {
        self.mapping
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    pub fn clear(&mut self) {
        self.mapping.clear();
    }
}
