//! Canonical key and value normalization.
//!
//! Keys: spaces become underscores and `(`, `)`, `,`, `'` are stripped.
//! Values: anything that reads as a calendar date is rendered `MM/DD/YYYY`,
//! everything else passes through untouched. Both functions are total and
//! idempotent.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

/// Output format for every recognized date.
pub const CANONICAL_DATE_FORMAT: &str = "%m/%d/%Y";

const STRIPPED_KEY_CHARS: [char; 4] = ['(', ')', ',', '\''];

/// Date-only layouts, tried in order. Four-digit-year layouts come first.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%m.%d.%Y",
    "%d-%b-%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
    "%d %B %Y",
    "%d %b %Y",
    "%A, %B %d, %Y",
    "%a, %b %d, %Y",
];

/// Month-and-year layouts; the day is taken as the 1st.
const MONTH_YEAR_FORMATS: &[&str] = &["%B %Y", "%b %Y"];

/// Two-digit-year layouts, only consulted when no four-digit layout matched.
const SHORT_YEAR_FORMATS: &[&str] = &["%m/%d/%y", "%m-%d-%y", "%d-%b-%y"];

/// Date-time layouts. `%.f` also accepts a missing fractional part.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
];

/// Result of interpreting a raw cell value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedValue {
    Date(NaiveDate),
    Text(String),
}

impl ParsedValue {
    /// Render to the canonical string form.
    pub fn into_canonical(self) -> String {
        match self {
            ParsedValue::Date(date) => date.format(CANONICAL_DATE_FORMAT).to_string(),
            ParsedValue::Text(text) => text,
        }
    }
}

/// Normalize a raw key into its canonical form. Missing keys become `""`.
pub fn normalize_key(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return String::new();
    };
    raw.chars()
        .filter(|c| !STRIPPED_KEY_CHARS.contains(c))
        .map(|c| if c == ' ' { '_' } else { c })
        .collect()
}

/// Normalize a raw value into its canonical form. Missing values become `""`.
pub fn normalize_value(raw: Option<&str>) -> String {
    match raw {
        Some(raw) => parse_value(raw).into_canonical(),
        None => String::new(),
    }
}

/// Classify a raw value as a date or as plain text.
pub fn parse_value(raw: &str) -> ParsedValue {
    match parse_date(raw) {
        Some(date) => ParsedValue::Date(date),
        None => ParsedValue::Text(raw.to_string()),
    }
}

/// Try every supported layout; `None` means "not a date".
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let candidate = raw.trim();
    // Digit-only values (ids, amounts, a bare year like `2024`) stay text
    // instead of becoming January 1st.
    if candidate.is_empty() || candidate.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(candidate) {
        return Some(dt.date_naive());
    }

    let four_digit_year = |date: &NaiveDate| (1000..=9999).contains(&date.year());

    DATETIME_FORMATS
        .iter()
        .filter_map(|fmt| NaiveDateTime::parse_from_str(candidate, fmt).ok())
        .map(|dt| dt.date())
        .find(four_digit_year)
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .filter_map(|fmt| NaiveDate::parse_from_str(candidate, fmt).ok())
                .find(four_digit_year)
        })
        .or_else(|| {
            let first_of_month = format!("{candidate} 1");
            MONTH_YEAR_FORMATS
                .iter()
                .filter_map(|fmt| NaiveDate::parse_from_str(&first_of_month, &format!("{fmt} %d")).ok())
                .find(four_digit_year)
        })
        .or_else(|| {
            SHORT_YEAR_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(candidate, fmt).ok())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_replaces_spaces_and_strips_punctuation() {
        assert_eq!(normalize_key(Some("Client Name")), "Client_Name");
        assert_eq!(normalize_key(Some("Owner's Address (Line 1), Unit")), "Owners_Address_Line_1_Unit");
    }

    #[test]
    fn missing_key_is_empty() {
        assert_eq!(normalize_key(None), "");
        assert_eq!(normalize_key(Some("(),'")), "");
    }

    #[test]
    fn key_normalization_is_idempotent() {
        for raw in ["Client Name", "a (b), 'c'", "  spaced  ", "already_canonical", ""] {
            let once = normalize_key(Some(raw));
            assert_eq!(normalize_key(Some(&once)), once, "raw: {raw:?}");
        }
    }

    #[test]
    fn iso_date_is_reformatted() {
        assert_eq!(normalize_value(Some("2024-03-05")), "03/05/2024");
    }

    #[test]
    fn spreadsheet_datetime_is_reformatted() {
        assert_eq!(normalize_value(Some("2024-03-05 00:00:00")), "03/05/2024");
        assert_eq!(normalize_value(Some("2024-03-05T14:30:00.250")), "03/05/2024");
        assert_eq!(normalize_value(Some("2024-03-05T14:30:00+02:00")), "03/05/2024");
    }

    #[test]
    fn written_out_dates_are_reformatted() {
        assert_eq!(normalize_value(Some("March 5, 2024")), "03/05/2024");
        assert_eq!(normalize_value(Some("5 Mar 2024")), "03/05/2024");
        assert_eq!(normalize_value(Some("3/5/2024")), "03/05/2024");
        assert_eq!(normalize_value(Some("03/05/24")), "03/05/2024");
    }

    #[test]
    fn spreadsheet_text_dates_are_reformatted() {
        assert_eq!(normalize_value(Some("05-Mar-2024")), "03/05/2024");
        assert_eq!(normalize_value(Some("5-Mar-24")), "03/05/2024");
    }

    #[test]
    fn dotted_dates_are_reformatted() {
        assert_eq!(normalize_value(Some("2024.03.05")), "03/05/2024");
        assert_eq!(normalize_value(Some("03.05.2024")), "03/05/2024");
    }

    #[test]
    fn weekday_prefixed_date_is_reformatted() {
        assert_eq!(normalize_value(Some("Tuesday, March 5, 2024")), "03/05/2024");
        assert_eq!(normalize_value(Some("Tue, Mar 5, 2024")), "03/05/2024");
    }

    #[test]
    fn month_and_year_is_first_of_month() {
        assert_eq!(normalize_value(Some("March 2024")), "03/01/2024");
        assert_eq!(normalize_value(Some("Mar 2024")), "03/01/2024");
    }

    #[test]
    fn bare_year_stays_text() {
        assert_eq!(normalize_value(Some("2024")), "2024");
    }

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(normalize_value(Some("hello")), "hello");
        assert_eq!(normalize_value(Some("  padded  ")), "  padded  ");
        assert_eq!(normalize_value(Some("12345")), "12345");
        assert_eq!(normalize_value(Some("2024-13-45")), "2024-13-45");
    }

    #[test]
    fn missing_value_is_empty() {
        assert_eq!(normalize_value(None), "");
        assert_eq!(normalize_value(Some("")), "");
    }

    #[test]
    fn canonical_date_round_trips() {
        assert_eq!(normalize_value(Some("03/05/2024")), "03/05/2024");
        assert_eq!(normalize_value(Some("12/31/1999")), "12/31/1999");
    }

    #[test]
    fn value_normalization_is_idempotent() {
        for raw in ["2024-03-05", "hello", "March 5, 2024", "03/05/24", "March 2024", "5-Mar-24", "", "42"] {
            let once = normalize_value(Some(raw));
            assert_eq!(normalize_value(Some(&once)), once, "raw: {raw:?}");
        }
    }

    #[test]
    fn parse_value_reports_branch() {
        assert_eq!(
            parse_value("2024-03-05"),
            ParsedValue::Date(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap())
        );
        assert_eq!(parse_value("not a date"), ParsedValue::Text("not a date".into()));
    }
}
