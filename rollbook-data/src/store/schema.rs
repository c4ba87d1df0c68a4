#![forbid(unsafe_code)]

use rusqlite::{Connection, Error as SqliteError, OptionalExtension};
use thiserror::Error;

pub const SCHEMA_VERSION: i64 = 1;

/// Initialise the roster schema inside an SQLite database.
///
/// The function enables foreign keys, creates the account and profile tables
/// with their supporting index, and records the schema version. Existing
/// installations must already match the expected version; mismatches are
/// rejected so migrations can be applied explicitly.
///
/// # Examples
/// ```
/// use rollbook_data::store::initialise_schema;
/// use rusqlite::Connection;
///
/// let mut conn = Connection::open_in_memory().expect("create in-memory database");
/// initialise_schema(&mut conn).expect("create roster schema");
///
/// let version: i64 = conn
///     .query_row(
///         "SELECT version FROM rollbook_schema_version LIMIT 1",
///         [],
///         |row| row.get(0),
///     )
///     .expect("read schema version");
/// assert_eq!(version, 1);
/// ```
pub fn initialise_schema(connection: &mut Connection) -> Result<(), RosterSchemaError> {
    connection
        .pragma_update(None, "foreign_keys", true)
        .map_err(|source| RosterSchemaError::ForeignKeys { source })?;

    let transaction = connection
        .transaction()
        .map_err(|source| RosterSchemaError::Migration {
            step: "begin schema transaction",
            source,
        })?;

    create_core_tables(&transaction)?;
    create_indexes(&transaction)?;
    ensure_schema_version(&transaction)?;

    transaction
        .commit()
        .map_err(|source| RosterSchemaError::Migration {
            step: "commit schema transaction",
            source,
        })?;

    Ok(())
}

fn create_core_tables(transaction: &rusqlite::Transaction<'_>) -> Result<(), RosterSchemaError> {
    run_migration_step(
        transaction,
        "create accounts",
        "CREATE TABLE IF NOT EXISTS accounts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            external_key TEXT NOT NULL UNIQUE,
            credential_hash TEXT NOT NULL,
            email_address TEXT NOT NULL,
            joined_at TEXT NOT NULL,
            last_seen_at TEXT NOT NULL,
            given_name TEXT,
            family_name TEXT,
            is_admin INTEGER NOT NULL CHECK (is_admin IN (0, 1)),
            is_moderator INTEGER NOT NULL CHECK (is_moderator IN (0, 1)),
            is_active INTEGER NOT NULL CHECK (is_active IN (0, 1))
        )",
    )?;
    run_migration_step(
        transaction,
        "create profiles",
        "CREATE TABLE IF NOT EXISTS profiles (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            natural_key TEXT NOT NULL UNIQUE,
            updated_at TEXT NOT NULL,
            gender TEXT NOT NULL,
            age_range TEXT NOT NULL,
            occupation TEXT NOT NULL,
            district TEXT NOT NULL,
            wants_newsletter INTEGER NOT NULL CHECK (wants_newsletter IN (0, 1)),
            wants_digest INTEGER NOT NULL CHECK (wants_digest IN (0, 1)),
            wants_event_invites INTEGER NOT NULL CHECK (wants_event_invites IN (0, 1)),
            shares_email INTEGER NOT NULL CHECK (shares_email IN (0, 1)),
            shares_location INTEGER NOT NULL CHECK (shares_location IN (0, 1)),
            bio TEXT NOT NULL,
            avatar TEXT NOT NULL,
            is_featured INTEGER NOT NULL CHECK (is_featured IN (0, 1)),
            account_id INTEGER NOT NULL,
            FOREIGN KEY (account_id) REFERENCES accounts(id) ON DELETE CASCADE
        )",
    )
}

fn create_indexes(transaction: &rusqlite::Transaction<'_>) -> Result<(), RosterSchemaError> {
    run_migration_step(
        transaction,
        "index profiles",
        "CREATE INDEX IF NOT EXISTS idx_profiles_account
            ON profiles(account_id)",
    )
}

fn ensure_schema_version(transaction: &rusqlite::Transaction<'_>) -> Result<(), RosterSchemaError> {
    run_migration_step(
        transaction,
        "create schema version table",
        "CREATE TABLE IF NOT EXISTS rollbook_schema_version (
            version INTEGER PRIMARY KEY CHECK (version > 0),
            applied_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now'))
        ) WITHOUT ROWID",
    )?;

    let existing_version: Option<i64> = transaction
        .query_row(
            "SELECT version FROM rollbook_schema_version LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()
        .map_err(|source| RosterSchemaError::Migration {
            step: "read schema version",
            source,
        })?;

    match existing_version {
        Some(version) if version == SCHEMA_VERSION => {}
        Some(found) => {
            return Err(RosterSchemaError::VersionMismatch {
                expected: SCHEMA_VERSION,
                found,
            });
        }
        None => {
            transaction
                .execute(
                    "INSERT INTO rollbook_schema_version (version) VALUES (?1)",
                    [SCHEMA_VERSION],
                )
                .map_err(|source| RosterSchemaError::Migration {
                    step: "record schema version",
                    source,
                })?;
        }
    }

    Ok(())
}

fn run_migration_step(
    transaction: &rusqlite::Transaction<'_>,
    step: &'static str,
    sql: &str,
) -> Result<(), RosterSchemaError> {
    transaction
        .execute(sql, [])
        .map(|_| ())
        .map_err(|source| RosterSchemaError::Migration { step, source })
}

/// Errors raised when initialising the roster schema.
#[derive(Debug, Error)]
pub enum RosterSchemaError {
    #[error("failed to enable SQLite foreign keys")]
    ForeignKeys {
        #[source]
        source: SqliteError,
    },
    #[error("failed to execute migration step '{step}'")]
    Migration {
        step: &'static str,
        #[source]
        source: SqliteError,
    },
    #[error(
        "expected roster schema version {expected} but found {found}; apply migrations before retrying"
    )]
    VersionMismatch { expected: i64, found: i64 },
}
