//! SQLite-backed roster store.
//!
//! [`RosterStore`] owns one connection to a roster database whose schema is
//! initialised on open. A load replaces the whole roster inside a single
//! transaction; export reads the stored tables back as delimited text.

use camino::{Utf8Path, Utf8PathBuf};
use rusqlite::Connection;
use thiserror::Error;

mod export;
mod load;
mod schema;

pub use export::ExportError;
pub use load::{LoadError, LoadReport};
pub use schema::{RosterSchemaError, SCHEMA_VERSION, initialise_schema};

/// Errors raised when opening a roster store.
#[derive(Debug, Error)]
pub enum OpenStoreError {
    /// The directory that should hold the database could not be created.
    #[error("failed to prepare database directory for {path}")]
    Prepare {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// SQLite could not open the database file.
    #[error("failed to open roster database at {path}")]
    Open {
        path: Utf8PathBuf,
        #[source]
        source: rusqlite::Error,
    },
    /// The in-memory database could not be created.
    #[error("failed to open in-memory roster database")]
    OpenInMemory {
        #[source]
        source: rusqlite::Error,
    },
    /// The schema could not be initialised or verified.
    #[error(transparent)]
    Schema(#[from] RosterSchemaError),
}

/// A table count query failed.
#[derive(Debug, Error)]
#[error("failed to {operation}")]
pub struct StoreQueryError {
    operation: &'static str,
    #[source]
    source: rusqlite::Error,
}

/// Handle on one roster database.
#[derive(Debug)]
pub struct RosterStore {
    connection: Connection,
}

impl RosterStore {
    /// Open the roster database at `path`, creating the file and its parent
    /// directories when absent, and initialise the schema.
    ///
    /// # Errors
    ///
    /// Returns [`OpenStoreError`] when the directory or database cannot be
    /// opened, or when an existing database carries a different schema
    /// version.
    pub fn open(path: &Utf8Path) -> Result<Self, OpenStoreError> {
        rollbook_fs::ensure_parent_dir(path).map_err(|source| OpenStoreError::Prepare {
            path: path.to_owned(),
            source,
        })?;
        let mut connection = Connection::open(path).map_err(|source| OpenStoreError::Open {
            path: path.to_owned(),
            source,
        })?;
        initialise_schema(&mut connection)?;
        Ok(Self { connection })
    }

    /// Open a private in-memory store.
    ///
    /// # Errors
    ///
    /// Returns [`OpenStoreError`] when SQLite cannot create the database or
    /// its schema.
    pub fn open_in_memory() -> Result<Self, OpenStoreError> {
        let mut connection =
            Connection::open_in_memory().map_err(|source| OpenStoreError::OpenInMemory { source })?;
        initialise_schema(&mut connection)?;
        Ok(Self { connection })
    }

    /// Number of stored account rows.
    ///
    /// # Errors
    ///
    /// Returns [`StoreQueryError`] when the count query fails.
    pub fn account_count(&self) -> Result<u64, StoreQueryError> {
        self.count("SELECT COUNT(*) FROM accounts", "count account rows")
    }

    /// Number of stored profile rows.
    ///
    /// # Errors
    ///
    /// Returns [`StoreQueryError`] when the count query fails.
    pub fn profile_count(&self) -> Result<u64, StoreQueryError> {
        self.count("SELECT COUNT(*) FROM profiles", "count profile rows")
    }

    fn count(&self, sql: &str, operation: &'static str) -> Result<u64, StoreQueryError> {
        self.connection
            .query_row(sql, [], |row| row.get(0))
            .map_err(|source| StoreQueryError { operation, source })
    }
}

#[cfg(test)]
mod tests;
