//! Data plumbing for the Rollbook roster.
//!
//! Responsibilities:
//! - Read delimited roster files into raw tables and surface structural
//!   problems as row issues.
//! - Persist validated batches into an SQLite store inside one transaction.
//! - Export stored tables back to delimited text that a later import accepts
//!   unchanged.
//! - Orchestrate the read, order, validate, and load stages while narrating
//!   progress through a [`rollbook_core::ProgressSink`].
//!
//! Boundaries:
//! - Validation rules live in `rollbook-core`; this crate never re-checks
//!   field content.
//! - Console and configuration concerns live in `rollbook-cli`.
#![forbid(unsafe_code)]

pub mod import;
pub mod reader;
pub mod store;

pub use import::{ImportError, ImportOutcome, import_batches, import_from_paths};
pub use reader::{ReadTableError, read_table, read_table_from_path};
pub use store::{
    ExportError, LoadError, LoadReport, OpenStoreError, RosterSchemaError, RosterStore,
    SCHEMA_VERSION, StoreQueryError,
};
