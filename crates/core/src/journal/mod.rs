//! Journal entries: pre-commit validation, numbering and posting.
//!
//! - `types` - Candidate entries, validation results, journal templates
//! - `validation` - Double-entry validator and journal suggestion
//! - `numbering` - `CODE-YEAR-00001` entry numbers
//! - `service` - Company-aware validation and posting with retry

pub mod error;
pub mod numbering;
pub mod service;
pub mod types;
pub mod validation;

#[cfg(test)]
mod validation_props;

pub use error::JournalError;
pub use numbering::{
    FALLBACK_JOURNAL_CODE, entry_sequence, fallback_entry_number, format_entry_number,
    generate_entry_number, next_sequence,
};
pub use service::JournalService;
pub use types::{
    AccountRef, EntrySide, EntryValidation, JournalEntryCandidate, JournalLineInput, JournalType,
    PostedEntry, TemplateLine,
};
pub use validation::{JournalEntryValidator, suggest_journal, suggest_journal_for};
