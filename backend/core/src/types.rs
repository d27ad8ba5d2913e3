use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Identifier of one sheet inside a tabular source (sheet name or file stem).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SheetId(String);

impl SheetId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SheetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SheetId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for SheetId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// One key/value row as read from a sheet, before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    pub key: Option<String>,
    pub value: Option<String>,
    pub source: SheetId,
}

impl RawEntry {
    pub fn new(key: Option<String>, value: Option<String>, source: SheetId) -> Self {
        Self { key, value, source }
    }
}

/// A normalized key/value pair produced by the sheet loader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub key: String,
    pub value: String,
}

/// The normalized rows of a single sheet, in row order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SheetLoad {
    pub sheet: SheetId,
    pub entries: Vec<Entry>,
}

impl SheetLoad {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Canonical key → canonical value mapping threaded through every stage.
///
/// Keys are unique. Iteration follows first-insertion order so previews and
/// persisted tables are stable, but consumers should index by key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataMapping {
    entries: IndexMap<String, String>,
}

impl DataMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Insert or replace; returns the previous value if any.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.shift_remove(key)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for DataMapping {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut mapping = DataMapping::new();
        for (k, v) in iter {
            mapping.insert(k, v);
        }
        mapping
    }
}

/// A candidate value for a conflicting key, with the sheet it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
    pub source: SheetId,
    pub value: String,
}

/// A key for which sheets disagreed on a non-empty value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictRecord {
    pub key: String,
    pub current: String,
    pub occurrences: Vec<Occurrence>,
}

impl ConflictRecord {
    /// Whether `value` is one of the candidates offered for this key.
    pub fn offers(&self, value: &str) -> bool {
        self.occurrences.iter().any(|occ| occ.value == value)
    }
}

/// What to do with one conflicting key.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "action", content = "value", rename_all = "snake_case")]
pub enum ResolutionDecision {
    /// Keep the value already in the mapping.
    #[default]
    Skip,
    /// Replace with one of the offered occurrence values.
    Replace(String),
}

/// A batch of decisions keyed by canonical key. Missing keys mean `Skip`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Resolution {
    decisions: IndexMap<String, ResolutionDecision>,
}

impl Resolution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn decide(mut self, key: impl Into<String>, decision: ResolutionDecision) -> Self {
        self.decisions.insert(key.into(), decision);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, decision: ResolutionDecision) {
        self.decisions.insert(key.into(), decision);
    }

    pub fn get(&self, key: &str) -> &ResolutionDecision {
        const SKIP: &ResolutionDecision = &ResolutionDecision::Skip;
        self.decisions.get(key).unwrap_or(SKIP)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ResolutionDecision)> {
        self.decisions.iter().map(|(k, d)| (k.as_str(), d))
    }

    pub fn len(&self) -> usize {
        self.decisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decisions.is_empty()
    }
}
