//! Import orchestration: read, order, validate, and load roster batches.
//!
//! The orchestrator wires the pipeline stages together and narrates progress
//! through a [`ProgressSink`]. Each entity is settled before the next one
//! starts: the profile source is not even opened until the account batch has
//! passed validation, so a rejected account run never reports profile noise.

use std::io::Read;

use camino::Utf8Path;
use log::warn;
use thiserror::Error;

use rollbook_core::{
    EntityKind, Event, ProgressSink, RowIssue, Table, Validation, account_schema, profile_schema,
    validate_accounts, validate_profiles,
};

use crate::reader::{ReadTableError, read_table, read_table_from_path};
use crate::store::{LoadError, RosterStore};


/// Row counts from one committed import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportOutcome {
    /// Accounts loaded into the store.
    pub accounts_loaded: u64,
    /// Profiles loaded into the store.
    pub profiles_loaded: u64,
}

/// Why an import run stopped before a commit.
#[derive(Debug, Error)]
pub enum ImportError {
    /// A roster file could not be read at all.
    #[error(transparent)]
    Read(#[from] ReadTableError),
    /// Validation rejected a batch; every issue is enumerated.
    #[error("validation rejected the {entity} batch")]
    Rejected {
        /// Which batch failed.
        entity: EntityKind,
        /// Everything wrong with it, in discovery order.
        issues: Vec<RowIssue>,
    },
    /// The load transaction failed and rolled back.
    #[error(transparent)]
    Load(#[from] LoadError),
}

/// Validate and load the roster read from two open streams.
///
/// The profile stream is only read once the account batch has been accepted,
/// and nothing is written to the store until both batches have passed in
/// full.
///
/// # Errors
///
/// Returns [`ImportError::Read`] when a file cannot be read,
/// [`ImportError::Rejected`] when validation finds any issue, and
/// [`ImportError::Load`] when the store transaction fails. In every case the
/// store keeps its previous contents.
pub fn import_batches<A, P, S>(
    store: &mut RosterStore,
    accounts: A,
    profiles: P,
    sink: &mut S,
) -> Result<ImportOutcome, ImportError>
where
    A: Read,
    P: Read,
    S: ProgressSink,
{
    run_import(
        store,
        || read_table(accounts, account_schema()),
        || read_table(profiles, profile_schema()),
        sink,
    )
}

/// Validate and load the roster files at the given paths.
///
/// The profile file is only opened once the account batch has been accepted.
///
/// # Errors
///
/// As for [`import_batches`], plus [`ReadTableError::Open`] (via
/// [`ImportError::Read`]) when a file cannot be opened.
pub fn import_from_paths<S: ProgressSink>(
    store: &mut RosterStore,
    accounts_path: &Utf8Path,
    profiles_path: &Utf8Path,
    sink: &mut S,
) -> Result<ImportOutcome, ImportError> {
    run_import(
        store,
        || read_table_from_path(accounts_path, account_schema()),
        || read_table_from_path(profiles_path, profile_schema()),
        sink,
    )
}

fn run_import<S, A, P>(
    store: &mut RosterStore,
    read_accounts: A,
    read_profiles: P,
    sink: &mut S,
) -> Result<ImportOutcome, ImportError>
where
    S: ProgressSink,
    A: FnOnce() -> Result<(Table, Vec<RowIssue>), ReadTableError>,
    P: FnOnce() -> Result<(Table, Vec<RowIssue>), ReadTableError>,
{
    sink.emit(Event::info("Starting roster validation and import"));

    let (account_table, account_issues) = read_stage(read_accounts(), EntityKind::Account, sink)?;
    let accounts = match validate_accounts(&account_table, account_issues) {
        Validation::Accepted(batch) => batch,
        Validation::Rejected(issues) => return Err(reject(EntityKind::Account, issues, sink)),
    };
    sink.emit(Event::success("Account batch validation passed"));

    let (profile_table, profile_issues) = read_stage(read_profiles(), EntityKind::Profile, sink)?;
    let profiles = match validate_profiles(&profile_table, &accounts, profile_issues) {
        Validation::Accepted(batch) => batch,
        Validation::Rejected(issues) => return Err(reject(EntityKind::Profile, issues, sink)),
    };
    sink.emit(Event::success("Profile batch validation passed"));

    sink.emit(Event::info("Replacing existing roster contents"));
    let report = match store.replace_all(&accounts, &profiles) {
        Ok(report) => report,
        Err(error) => {
            sink.emit(Event::error(format!("Store error: {error}")));
            sink.emit(Event::error(
                "Import aborted: the store keeps its previous contents",
            ));
            warn!("roster load failed after validation: {error}");
            return Err(ImportError::Load(error));
        }
    };
    sink.emit(Event::info(format!(
        "Imported {} account record(s)",
        report.accounts_inserted
    )));
    sink.emit(Event::info(format!(
        "Imported {} profile record(s)",
        report.profiles_inserted
    )));
    sink.emit(Event::success("Import completed successfully"));

    Ok(ImportOutcome {
        accounts_loaded: report.accounts_inserted,
        profiles_loaded: report.profiles_inserted,
    })
}

fn read_stage<S: ProgressSink>(
    outcome: Result<(Table, Vec<RowIssue>), ReadTableError>,
    entity: EntityKind,
    sink: &mut S,
) -> Result<(Table, Vec<RowIssue>), ImportError> {
    match outcome {
        Ok((mut table, mut issues)) => {
            // An unsortable key joins the issue list after any ragged rows,
            // matching the order the problems were discovered in.
            if let Err(issue) = table.sort_by_sequence() {
                issues.push(issue);
            }
            sink.emit(Event::info(format!("Read {} {entity} row(s)", table.len())));
            Ok((table, issues))
        }
        Err(error) => {
            sink.emit(Event::error(format!("Failed to read {entity} file: {error}")));
            Err(ImportError::Read(error))
        }
    }
}

fn reject<S: ProgressSink>(entity: EntityKind, issues: Vec<RowIssue>, sink: &mut S) -> ImportError {
    for issue in &issues {
        sink.emit(Event::error(issue.to_string()));
    }
    sink.emit(Event::error(format!(
        "Import aborted: the {entity} batch failed validation with {} issue(s)",
        issues.len()
    )));
    warn!("{entity} batch rejected with {} issue(s)", issues.len());
    ImportError::Rejected { entity, issues }
}
