//! Config validation: deep schema checks with user-friendly error messages.

use crate::schema::DocfillConfig;
use thiserror::Error;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];
const OUTPUT_FORMATS: &[&str] = &["csv", "tsv", "json"];

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// A collection of validation errors found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &DocfillConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_reader(config, &mut report);
    validate_output(config, &mut report);
    validate_logging(config, &mut report);
    validate_forms(config, &mut report);
    report
}

fn validate_reader(config: &DocfillConfig, report: &mut ValidationReport) {
    let Some(reader) = &config.reader else { return };
    if reader.row_limit == Some(0) {
        report.error("reader.rowLimit", "rowLimit must be >= 1 (omit it to read every row)");
    }
    if reader.delimiter.is_some() && reader.delimiter_byte().is_none() {
        report.error("reader.delimiter", "delimiter must be a single ASCII character");
    }
}

fn validate_output(config: &DocfillConfig, report: &mut ValidationReport) {
    let Some(output) = &config.output else { return };
    if let Some(format) = &output.format {
        if !OUTPUT_FORMATS.contains(&format.to_ascii_lowercase().as_str()) {
            report.error(
                "output.format",
                format!("Unknown output format '{format}'. Use 'csv', 'tsv', or 'json'"),
            );
        }
    }
    if output.path.as_deref().is_some_and(|p| p.trim().is_empty()) {
        report.error("output.path", "path cannot be empty");
    }
}

fn validate_logging(config: &DocfillConfig, report: &mut ValidationReport) {
    let Some(logging) = &config.logging else { return };
    if let Some(level) = &logging.level {
        if !LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
            report.warn(
                "logging.level",
                format!("'{level}' is not a plain level; it will be used as a filter directive"),
            );
        }
    }
}

fn validate_forms(config: &DocfillConfig, report: &mut ValidationReport) {
    let Some(forms) = &config.forms else { return };
    if forms.truthy_values.as_ref().is_some_and(Vec::is_empty) {
        report.warn("forms.truthyValues", "No truthy values; every check box will be unchecked");
    }
    for (field, value) in [("checkedValue", &forms.checked_value), ("uncheckedValue", &forms.unchecked_value)] {
        if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
            report.error(format!("forms.{field}"), "check box state name cannot be empty");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FormsConfig, OutputConfig, ReaderConfig};

    #[test]
    fn empty_config_is_valid() {
        let report = validate(&DocfillConfig::default());
        assert!(report.is_valid(), "errors: {:?}", report.errors);
    }

    #[test]
    fn zero_row_limit_is_error() {
        let mut cfg = DocfillConfig::default();
        cfg.reader = Some(ReaderConfig {
            row_limit: Some(0),
            ..Default::default()
        });
        let report = validate(&cfg);
        assert!(!report.is_valid());
        assert_eq!(report.errors[0].path, "reader.rowLimit");
    }

    #[test]
    fn unknown_output_format_is_error() {
        let mut cfg = DocfillConfig::default();
        cfg.output = Some(OutputConfig {
            format: Some("xlsx".into()),
            ..Default::default()
        });
        let report = validate(&cfg);
        assert!(report.errors[0].message.contains("xlsx"));
    }

    #[test]
    fn empty_truthy_list_is_warning() {
        let mut cfg = DocfillConfig::default();
        cfg.forms = Some(FormsConfig {
            truthy_values: Some(Vec::new()),
            ..Default::default()
        });
        let report = validate(&cfg);
        assert!(report.is_valid());
        assert_eq!(report.warnings.len(), 1);
    }
}
