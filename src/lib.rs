//! Facade crate for the Rollbook roster import tooling.
//!
//! This crate re-exports the core domain types and exposes the SQLite-backed
//! store and import pipeline behind a feature flag.

#![forbid(unsafe_code)]

pub use rollbook_core::{
    AcceptedBatch, AccountRecord, EntityKind, Event, EventLog, NullSink, ProfileRecord,
    ProgressSink, RawRecord, RowIssue, Severity, Table, Validation, account_schema,
    profile_schema, validate_accounts, validate_profiles,
};

#[cfg(feature = "store-sqlite")]
pub use rollbook_data::{
    ExportError, ImportError, ImportOutcome, LoadError, LoadReport, OpenStoreError,
    ReadTableError, RosterSchemaError, RosterStore, StoreQueryError, import_batches,
    import_from_paths,
};
