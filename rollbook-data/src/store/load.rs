//! Transactional replacement of the roster contents.

use std::collections::HashMap;

use rusqlite::{OptionalExtension, Transaction, params};
use thiserror::Error;

use rollbook_core::validate::AcceptedBatch;
use rollbook_core::{AccountRecord, ProfileRecord};

use super::RosterStore;

/// Row counts from one completed load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadReport {
    /// Accounts inserted by the load.
    pub accounts_inserted: u64,
    /// Profiles inserted by the load.
    pub profiles_inserted: u64,
}

/// Errors raised while replacing the roster contents.
///
/// Any of these aborts the load transaction; the store keeps the contents it
/// held before the call.
#[derive(Debug, Error)]
pub enum LoadError {
    /// An SQLite statement failed.
    #[error("failed to {operation}")]
    Sqlite {
        operation: &'static str,
        #[source]
        source: rusqlite::Error,
    },
    /// A profile key matched no freshly inserted account.
    #[error("no account id found for profile key '{key}'")]
    UnresolvedKey { key: String },
}

impl RosterStore {
    /// Replace the stored roster with the given batches.
    ///
    /// The load runs as one transaction: existing profiles and accounts are
    /// deleted, identifier sequences are reset so new ids start from 1,
    /// accounts are inserted, and each profile is linked to its account by
    /// case-insensitive key. On any error the transaction rolls back and the
    /// previous contents survive.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Sqlite`] when a statement fails, and
    /// [`LoadError::UnresolvedKey`] when a profile key matches no inserted
    /// account. Batches validated together always resolve; the latter guards
    /// against batches taken from different validation runs.
    pub fn replace_all(
        &mut self,
        accounts: &AcceptedBatch<AccountRecord>,
        profiles: &AcceptedBatch<ProfileRecord>,
    ) -> Result<LoadReport, LoadError> {
        let transaction = self
            .connection
            .transaction()
            .map_err(|source| LoadError::Sqlite {
                operation: "begin load transaction",
                source,
            })?;

        clear_tables(&transaction)?;
        reset_sequences(&transaction)?;
        let (accounts_inserted, account_ids) = insert_accounts(&transaction, accounts)?;
        let profiles_inserted = insert_profiles(&transaction, profiles, &account_ids)?;

        transaction.commit().map_err(|source| LoadError::Sqlite {
            operation: "commit load transaction",
            source,
        })?;

        Ok(LoadReport {
            accounts_inserted,
            profiles_inserted,
        })
    }
}

fn clear_tables(transaction: &Transaction<'_>) -> Result<(), LoadError> {
    // Profiles reference accounts, so they go first.
    run_step(transaction, "clear profile rows", "DELETE FROM profiles")?;
    run_step(transaction, "clear account rows", "DELETE FROM accounts")
}

fn reset_sequences(transaction: &Transaction<'_>) -> Result<(), LoadError> {
    // sqlite_sequence only exists once an AUTOINCREMENT insert has happened,
    // so probe for it before deleting.
    let present: Option<i64> = transaction
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'sqlite_sequence'",
            [],
            |row| row.get(0),
        )
        .optional()
        .map_err(|source| LoadError::Sqlite {
            operation: "probe identifier sequences",
            source,
        })?;
    if present.is_some() {
        run_step(
            transaction,
            "reset identifier sequences",
            "DELETE FROM sqlite_sequence WHERE name IN ('accounts', 'profiles')",
        )?;
    }
    Ok(())
}

fn insert_accounts(
    transaction: &Transaction<'_>,
    accounts: &AcceptedBatch<AccountRecord>,
) -> Result<(u64, HashMap<String, i64>), LoadError> {
    let mut ids = HashMap::with_capacity(accounts.len());
    let mut inserted = 0u64;
    {
        let mut statement = transaction
            .prepare_cached(
                "INSERT INTO accounts (
                    external_key, credential_hash, email_address, joined_at,
                    last_seen_at, given_name, family_name,
                    is_admin, is_moderator, is_active
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            )
            .map_err(|source| LoadError::Sqlite {
                operation: "prepare account insert",
                source,
            })?;
        for account in accounts.records() {
            statement
                .execute(params![
                    account.external_key,
                    account.credential_hash,
                    account.email_address,
                    account.joined_at,
                    account.last_seen_at,
                    account.given_name,
                    account.family_name,
                    account.is_admin,
                    account.is_moderator,
                    account.is_active,
                ])
                .map_err(|source| LoadError::Sqlite {
                    operation: "insert account row",
                    source,
                })?;
            ids.insert(account.external_key.to_lowercase(), transaction.last_insert_rowid());
            inserted += 1;
        }
    }
    Ok((inserted, ids))
}

fn insert_profiles(
    transaction: &Transaction<'_>,
    profiles: &AcceptedBatch<ProfileRecord>,
    account_ids: &HashMap<String, i64>,
) -> Result<u64, LoadError> {
    let mut inserted = 0u64;
    {
        let mut statement = transaction
            .prepare_cached(
                "INSERT INTO profiles (
                    natural_key, updated_at, gender, age_range, occupation, district,
                    wants_newsletter, wants_digest, wants_event_invites,
                    shares_email, shares_location, bio, avatar, is_featured, account_id
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
            )
            .map_err(|source| LoadError::Sqlite {
                operation: "prepare profile insert",
                source,
            })?;
        for profile in profiles.records() {
            let account_id = account_ids
                .get(&profile.natural_key.to_lowercase())
                .copied()
                .ok_or_else(|| LoadError::UnresolvedKey {
                    key: profile.natural_key.clone(),
                })?;
            statement
                .execute(params![
                    profile.natural_key,
                    profile.updated_at,
                    profile.gender,
                    profile.age_range,
                    profile.occupation,
                    profile.district,
                    profile.wants_newsletter,
                    profile.wants_digest,
                    profile.wants_event_invites,
                    profile.shares_email,
                    profile.shares_location,
                    profile.bio,
                    profile.avatar,
                    profile.is_featured,
                    account_id,
                ])
                .map_err(|source| LoadError::Sqlite {
                    operation: "insert profile row",
                    source,
                })?;
            inserted += 1;
        }
    }
    Ok(inserted)
}

fn run_step(
    transaction: &Transaction<'_>,
    operation: &'static str,
    sql: &str,
) -> Result<(), LoadError> {
    transaction
        .execute(sql, [])
        .map(|_| ())
        .map_err(|source| LoadError::Sqlite { operation, source })
}
