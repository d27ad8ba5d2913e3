//! Structured logging for DocFill.
//!
//! Console plus rolling JSON file output, PII redaction, and the per-session
//! audit trail of loads, resolutions and manual edits.

pub mod audit;
pub mod logger;
pub mod redact;

pub use audit::{AuditEntry, AuditEvent, AuditLogger};
pub use logger::{init_logger, LOG_FILE_PREFIX};
pub use redact::redact_sensitive_data;
