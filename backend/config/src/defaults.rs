//! Config defaults: applies sensible default values to parsed config.

use crate::schema::{DocfillConfig, FormsConfig, LoggingConfig, ReaderConfig};

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default check-box key prefixes.
pub const DEFAULT_CHECKBOX_PREFIXES: &[&str] = &["check_box"];

/// Default check-box key markers.
pub const DEFAULT_CHECKBOX_MARKERS: &[&str] = &["checkbox"];

/// Values treated as a ticked check box.
pub const DEFAULT_TRUTHY_VALUES: &[&str] = &["yes", "true", "on", "1"];

/// Apply all defaults to a freshly loaded config.
pub fn apply_all_defaults(config: DocfillConfig) -> DocfillConfig {
    let config = apply_reader_defaults(config);
    let config = apply_logging_defaults(config);
    apply_forms_defaults(config)
}

fn apply_reader_defaults(mut config: DocfillConfig) -> DocfillConfig {
    let reader = config.reader.get_or_insert_with(ReaderConfig::default);
    if reader.skip_header.is_none() {
        reader.skip_header = Some(false);
    }
    config
}

fn apply_logging_defaults(mut config: DocfillConfig) -> DocfillConfig {
    let logging = config.logging.get_or_insert_with(LoggingConfig::default);
    if logging.level.is_none() {
        logging.level = Some(DEFAULT_LOG_LEVEL.to_string());
    }
    if logging.dir.is_none() {
        logging.dir = Some(crate::io::config_dir().join("logs").display().to_string());
    }
    config
}

fn apply_forms_defaults(mut config: DocfillConfig) -> DocfillConfig {
    let to_vec = |values: &[&str]| values.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    let forms = config.forms.get_or_insert_with(FormsConfig::default);
    forms
        .checkbox_prefixes
        .get_or_insert_with(|| to_vec(DEFAULT_CHECKBOX_PREFIXES));
    forms
        .checkbox_markers
        .get_or_insert_with(|| to_vec(DEFAULT_CHECKBOX_MARKERS));
    forms
        .truthy_values
        .get_or_insert_with(|| to_vec(DEFAULT_TRUTHY_VALUES));
    forms.checked_value.get_or_insert_with(|| "Yes".to_string());
    forms.unchecked_value.get_or_insert_with(|| "Off".to_string());
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_missing_sections() {
        let config = apply_all_defaults(DocfillConfig::default());
        assert_eq!(config.logging.as_ref().unwrap().level.as_deref(), Some("info"));
        assert_eq!(config.reader.as_ref().unwrap().skip_header, Some(false));
        let forms = config.forms.unwrap();
        assert_eq!(forms.truthy_values.unwrap(), vec!["yes", "true", "on", "1"]);
        assert_eq!(forms.unchecked_value.as_deref(), Some("Off"));
    }

    #[test]
    fn keeps_explicit_values() {
        let mut config = DocfillConfig::default();
        config.logging = Some(LoggingConfig {
            level: Some("debug".into()),
            dir: Some("/tmp/docfill-logs".into()),
        });
        let config = apply_all_defaults(config);
        let logging = config.logging.unwrap();
        assert_eq!(logging.level.as_deref(), Some("debug"));
        assert_eq!(logging.dir.as_deref(), Some("/tmp/docfill-logs"));
    }
}
