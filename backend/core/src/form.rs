//! Preparing a finalized mapping for fillable-form renderers.
//!
//! Form check boxes only accept their export values, so any key that looks
//! like a check box is coerced to the checked/unchecked state name.

use serde::{Deserialize, Serialize};

use crate::types::DataMapping;

/// Rules for recognizing check-box fields and coercing their values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormFieldPolicy {
    /// Lowercase key prefixes marking a check box (e.g. `check_box`).
    pub checkbox_prefixes: Vec<String>,
    /// Lowercase substrings marking a check box anywhere in the key.
    pub checkbox_markers: Vec<String>,
    /// Lowercase values that mean "checked".
    pub truthy_values: Vec<String>,
    pub checked_value: String,
    pub unchecked_value: String,
}

impl Default for FormFieldPolicy {
    fn default() -> Self {
        Self {
            checkbox_prefixes: vec!["check_box".to_string()],
            checkbox_markers: vec!["checkbox".to_string()],
            truthy_values: ["yes", "true", "on", "1"].iter().map(|s| s.to_string()).collect(),
            checked_value: "Yes".to_string(),
            unchecked_value: "Off".to_string(),
        }
    }
}

impl FormFieldPolicy {
    pub fn is_checkbox(&self, key: &str) -> bool {
        let key = key.to_lowercase();
        self.checkbox_prefixes.iter().any(|p| key.starts_with(p.as_str()))
            || self.checkbox_markers.iter().any(|m| key.contains(m.as_str()))
    }

    pub fn coerce(&self, key: &str, value: &str) -> String {
        if !self.is_checkbox(key) {
            return value.to_string();
        }
        let value = value.to_lowercase();
        if self.truthy_values.iter().any(|t| *t == value) {
            self.checked_value.clone()
        } else {
            self.unchecked_value.clone()
        }
    }
}

/// Field name → value pairs ready for a form filler, in mapping order.
pub fn prepare_form_fields(mapping: &DataMapping, policy: &FormFieldPolicy) -> Vec<(String, String)> {
    mapping
        .iter()
        .map(|(key, value)| (key.to_string(), policy.coerce(key, value)))
        .collect()
}
