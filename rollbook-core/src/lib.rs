//! Core domain types for the Rollbook import pipeline.
//!
//! A roster batch moves through four stages: raw rows are read into a
//! [`Table`], ordered by their declared sequence key, normalised field by
//! field, and validated as a whole. Validation is the only source of
//! [`AccountRecord`]/[`ProfileRecord`] values, so later stages can rely on
//! the invariants it enforces. Progress surfaces through the
//! [`ProgressSink`] seam rather than a logger, keeping reporting out of the
//! pipeline's failure paths.

#![forbid(unsafe_code)]

pub mod issue;
pub mod normalise;
pub mod record;
pub mod report;
pub mod schema;
pub mod table;
pub mod validate;

pub use issue::RowIssue;
pub use record::{AccountRecord, ProfileRecord};
pub use report::{Event, EventLog, NullSink, ProgressSink, Severity};
pub use schema::{EntityKind, TableSchema, account_schema, profile_schema};
pub use table::{RawRecord, RecordView, Table};
pub use validate::{AcceptedBatch, Validation, validate_accounts, validate_profiles};
