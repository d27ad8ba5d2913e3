//! `docfill-core`: turns key/value sheets into one reconciled mapping.
//!
//! Pipeline: [`loader`] normalizes each sheet, [`merge`] folds sheets and
//! records disagreements, [`resolve`] applies conflict decisions, and
//! [`overrides`] layers manual edits. [`Session`] owns the mapping for one run.

pub mod error;
pub mod form;
pub mod loader;
pub mod merge;
pub mod normalize;
pub mod overrides;
pub mod resolve;
pub mod session;
pub mod traits;
pub mod types;

pub use error::DocfillError;
pub use form::{prepare_form_fields, FormFieldPolicy};
pub use loader::{load_sheet, normalize_rows};
pub use merge::{merge_sheets, FoldStats, MergeEngine};
pub use normalize::{normalize_key, normalize_value, parse_value, ParsedValue};
pub use overrides::{OverrideStore, UpsertOutcome};
pub use resolve::{apply_resolution, ResolutionReport};
pub use session::{LoadOptions, LoadReport, Session};
pub use traits::{DocumentRenderer, PersistenceSink, Selector, SheetRows, TabularSource};
pub use types::{
    ConflictRecord, DataMapping, Entry, Occurrence, RawEntry, Resolution, ResolutionDecision,
    SheetId, SheetLoad,
};
