//! Session Audit Log
//!
//! Structured events for one data-load session, emitted through `tracing`
//! under the `docfill_audit` target so the JSON file layer captures them.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::redact::redact_sensitive_data;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuditEvent {
    SheetLoaded {
        sheet: String,
        inserted: usize,
        filled: usize,
        conflicts: usize,
    },
    ConflictResolved {
        key: String,
        kept: String,
        chosen: Option<String>,
    },
    EntryChanged {
        key: String,
        value: String,
    },
    EntryRemoved {
        key: String,
    },
    DataSaved {
        path: String,
        entries: usize,
    },
}

impl AuditEvent {
    /// Copy of the event with every data value scrubbed.
    pub fn redacted(mut self) -> Self {
        match &mut self {
            AuditEvent::ConflictResolved { kept, chosen, .. } => {
                *kept = redact_sensitive_data(kept);
                if let Some(chosen) = chosen {
                    *chosen = redact_sensitive_data(chosen);
                }
            }
            AuditEvent::EntryChanged { value, .. } => {
                *value = redact_sensitive_data(value);
            }
            AuditEvent::SheetLoaded { .. }
            | AuditEvent::EntryRemoved { .. }
            | AuditEvent::DataSaved { .. } => {}
        }
        self
    }
}

#[derive(Debug, Serialize)]
pub struct AuditEntry {
    pub session_id: String,
    pub timestamp: DateTime<Utc>,
    pub event: AuditEvent,
}

pub struct AuditLogger {
    session_id: String,
}

impl AuditLogger {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
        }
    }

    /// Session id derived from the start time, e.g. `20240305T141500`.
    pub fn for_now() -> Self {
        Self::new(Utc::now().format("%Y%m%dT%H%M%S").to_string())
    }

    pub fn entry(&self, event: AuditEvent) -> AuditEntry {
        AuditEntry {
            session_id: self.session_id.clone(),
            timestamp: Utc::now(),
            event: event.redacted(),
        }
    }

    /// Redact and emit one event.
    pub fn log(&self, event: AuditEvent) {
        let entry = self.entry(event);
        match serde_json::to_string(&entry) {
            Ok(json) => info!(target: "docfill_audit", entry = %json, "Audit event"),
            Err(e) => info!(target: "docfill_audit", error = %e, event = ?entry.event, "Audit event"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_carry_session_and_redacted_values() {
        let logger = AuditLogger::new("run-1");
        let entry = logger.entry(AuditEvent::EntryChanged {
            key: "Client_SSN".into(),
            value: "123-45-6789".into(),
        });
        assert_eq!(entry.session_id, "run-1");
        assert_eq!(
            entry.event,
            AuditEvent::EntryChanged { key: "Client_SSN".into(), value: "[REDACTED_ID]".into() }
        );
    }

    #[test]
    fn serializes_with_type_tag() {
        let json = serde_json::to_value(AuditEvent::EntryRemoved { key: "Task".into() }).unwrap();
        assert_eq!(json["type"], "entry_removed");
        assert_eq!(json["key"], "Task");
    }
}
