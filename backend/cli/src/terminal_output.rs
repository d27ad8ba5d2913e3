//! Terminal output: notes, data previews and conflict listings.

use docfill_core::{ConflictRecord, DataMapping};

pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";

pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";

/// Check if the terminal supports color output.
pub fn supports_color() -> bool {
    std::env::var("NO_COLOR").is_err()
        && (std::env::var("COLORTERM").is_ok()
            || std::env::var("TERM").map(|t| t != "dumb").unwrap_or(false))
}

// ---------------------------------------------------------------------------
// Notes
// ---------------------------------------------------------------------------

pub fn note_info(msg: &str) {
    if supports_color() {
        eprintln!("{CYAN}{BOLD}i{RESET} {msg}");
    } else {
        eprintln!("INFO: {msg}");
    }
}

pub fn note_warn(msg: &str) {
    if supports_color() {
        eprintln!("{YELLOW}{BOLD}!{RESET} {msg}");
    } else {
        eprintln!("WARN: {msg}");
    }
}

pub fn note_error(msg: &str) {
    if supports_color() {
        eprintln!("{RED}{BOLD}x{RESET} {msg}");
    } else {
        eprintln!("ERROR: {msg}");
    }
}

pub fn note_success(msg: &str) {
    if supports_color() {
        eprintln!("{GREEN}{BOLD}ok{RESET} {msg}");
    } else {
        eprintln!("OK: {msg}");
    }
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

/// Two-column `Key / Value` preview, keys padded to at least 30 characters.
pub fn render_preview(mapping: &DataMapping) -> String {
    let width = mapping
        .keys()
        .map(|k| k.chars().count())
        .max()
        .unwrap_or(0)
        .max(30);
    let mut out = format!("{:<width$} Value\n{}\n", "Key", "-".repeat(width + 30));
    for (key, value) in mapping.iter() {
        out.push_str(&format!("{key:<width$} {value}\n"));
    }
    out
}

/// One conflict with numbered choices; `0` is always "keep current".
pub fn render_conflict(record: &ConflictRecord) -> String {
    let mut out = format!("Current {} value: '{}'\n", record.key, record.current);
    out.push_str(&format!("  0) Skip (keep current value: '{}')\n", record.current));
    for (i, occ) in record.occurrences.iter().enumerate() {
        out.push_str(&format!("  {}) Replace with '{}' from {}\n", i + 1, occ.value, occ.source));
    }
    out
}
