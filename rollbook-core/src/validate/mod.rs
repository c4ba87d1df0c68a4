//! Whole-batch validation.
//!
//! Validation never short-circuits: every row is examined and every issue is
//! gathered before the batch's fate is decided, so one bad row cannot hide
//! another. A batch is accepted only when the issue list is empty, and the
//! accepted records come back inside an [`AcceptedBatch`], the only currency
//! the loader deals in.

use std::collections::HashSet;

use crate::issue::RowIssue;
use crate::normalise::{is_blank, optional_field, parse_boolean};
use crate::record::{AccountRecord, ProfileRecord};
use crate::schema::{TableSchema, account_schema, profile_schema};
use crate::table::{RecordView, Table};

/// Outcome of validating one entity's batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation<R> {
    /// Every check passed; the batch may be loaded.
    Accepted(AcceptedBatch<R>),
    /// At least one issue anywhere in the batch; nothing may be loaded.
    Rejected(Vec<RowIssue>),
}

/// A batch that passed validation in full.
///
/// There is no public constructor: the only sources are
/// [`validate_accounts`] and [`validate_profiles`], so an API that demands
/// an `AcceptedBatch` cannot be handed unvalidated rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedBatch<R> {
    records: Vec<R>,
}

impl<R> AcceptedBatch<R> {
    fn new(records: Vec<R>) -> Self {
        Self { records }
    }

    /// Validated records, in load order.
    #[must_use]
    pub fn records(&self) -> &[R] {
        &self.records
    }

    /// Number of validated records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the batch holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Validate the account batch.
///
/// `carried` holds issues discovered before validation proper: ragged rows
/// from the reader and an ordering failure from the sorter. They block
/// acceptance exactly like field issues and are reported first.
///
/// # Examples
///
/// ```
/// use rollbook_core::schema::account_schema;
/// use rollbook_core::table::Table;
/// use rollbook_core::validate::{Validation, validate_accounts};
///
/// let schema = account_schema();
/// let headers = schema.columns().iter().map(|&c| c.to_owned()).collect();
/// let mut table = Table::new(schema, headers);
/// table.push_row(
///     2,
///     vec![
///         "1".into(),
///         "alice".into(),
///         "pbkdf2$x".into(),
///         "alice@example.org".into(),
///         "2024-01-05".into(),
///         "".into(),
///         "Alice".into(),
///         "".into(),
///         "FALSE".into(),
///         "FALSE".into(),
///         "TRUE".into(),
///     ],
/// );
///
/// match validate_accounts(&table, Vec::new()) {
///     Validation::Accepted(batch) => assert_eq!(batch.len(), 1),
///     Validation::Rejected(issues) => panic!("unexpected issues: {issues:?}"),
/// }
/// ```
#[must_use]
pub fn validate_accounts(table: &Table, carried: Vec<RowIssue>) -> Validation<AccountRecord> {
    let mut issues = carried;
    let mut seen = SeenKeys::default();
    let mut records = Vec::with_capacity(table.len());
    for view in table.records() {
        if let Some(record) = check_account_row(view, &mut seen, &mut issues) {
            records.push(record);
        }
    }
    finish(records, issues)
}

/// Validate the profile batch against an accepted account batch.
///
/// Demanding `&AcceptedBatch<AccountRecord>` makes the prerequisite part of
/// the signature: profile validation cannot run, even accidentally, before
/// the accounts have been accepted. Each profile's key must
/// case-insensitively match one account's external key.
#[must_use]
pub fn validate_profiles(
    table: &Table,
    accounts: &AcceptedBatch<AccountRecord>,
    carried: Vec<RowIssue>,
) -> Validation<ProfileRecord> {
    let known_accounts: HashSet<String> = accounts
        .records()
        .iter()
        .map(|account| account.external_key.to_lowercase())
        .collect();

    let mut issues = carried;
    let mut seen = SeenKeys::default();
    let mut records = Vec::with_capacity(table.len());
    for view in table.records() {
        if let Some(record) = check_profile_row(view, &mut seen, &known_accounts, &mut issues) {
            records.push(record);
        }
    }
    finish(records, issues)
}

fn finish<R>(records: Vec<R>, issues: Vec<RowIssue>) -> Validation<R> {
    if issues.is_empty() {
        Validation::Accepted(AcceptedBatch::new(records))
    } else {
        Validation::Rejected(issues)
    }
}

/// Uniqueness state shared across one batch's rows. Every row's key is
/// recorded, valid or not, so later duplicates of an invalid row still
/// surface.
#[derive(Default)]
struct SeenKeys {
    exact: HashSet<String>,
    folded: HashSet<String>,
}

struct KeyCollisions {
    exact: bool,
    folded: bool,
}

impl SeenKeys {
    fn observe(&mut self, key: &str) -> KeyCollisions {
        let folded = key.to_lowercase();
        let collisions = KeyCollisions {
            exact: self.exact.contains(key),
            folded: self.folded.contains(&folded),
        };
        self.exact.insert(key.to_owned());
        self.folded.insert(folded);
        collisions
    }
}

/// Check one account row, returning its record only when the row added no
/// issues.
fn check_account_row(
    view: RecordView<'_>,
    seen: &mut SeenKeys,
    issues: &mut Vec<RowIssue>,
) -> Option<AccountRecord> {
    let schema = account_schema();
    let before = issues.len();

    let key = check_unique_key(schema, view, seen, issues);
    check_required_fields(schema, view, &key, issues);
    let is_admin = check_flag(schema, view, "is_admin", &key, issues);
    let is_moderator = check_flag(schema, view, "is_moderator", &key, issues);
    let is_active = check_flag(schema, view, "is_active", &key, issues);

    if issues.len() > before {
        return None;
    }
    let (Some(is_admin), Some(is_moderator), Some(is_active)) =
        (is_admin, is_moderator, is_active)
    else {
        return None;
    };
    Some(AccountRecord {
        external_key: key,
        credential_hash: owned(view, "credential_hash"),
        email_address: owned(view, "email_address"),
        joined_at: owned(view, "joined_at"),
        last_seen_at: owned(view, "last_seen_at"),
        given_name: optional_field(view.get("given_name").unwrap_or_default()),
        family_name: optional_field(view.get("family_name").unwrap_or_default()),
        is_admin,
        is_moderator,
        is_active,
    })
}

/// Check one profile row. The cross-reference check runs last within the
/// row, after field checks, and reports the key as read.
fn check_profile_row(
    view: RecordView<'_>,
    seen: &mut SeenKeys,
    known_accounts: &HashSet<String>,
    issues: &mut Vec<RowIssue>,
) -> Option<ProfileRecord> {
    let schema = profile_schema();
    let before = issues.len();

    let key = check_unique_key(schema, view, seen, issues);
    check_required_fields(schema, view, &key, issues);
    let wants_newsletter = check_flag(schema, view, "wants_newsletter", &key, issues);
    let wants_digest = check_flag(schema, view, "wants_digest", &key, issues);
    let wants_event_invites = check_flag(schema, view, "wants_event_invites", &key, issues);
    let shares_email = check_flag(schema, view, "shares_email", &key, issues);
    let shares_location = check_flag(schema, view, "shares_location", &key, issues);
    let is_featured = check_flag(schema, view, "is_featured", &key, issues);
    if !known_accounts.contains(&key.to_lowercase()) {
        issues.push(RowIssue::UnresolvedReference {
            key: key.clone(),
            row: view.row_number(),
        });
    }

    if issues.len() > before {
        return None;
    }
    let (
        Some(wants_newsletter),
        Some(wants_digest),
        Some(wants_event_invites),
        Some(shares_email),
        Some(shares_location),
        Some(is_featured),
    ) = (
        wants_newsletter,
        wants_digest,
        wants_event_invites,
        shares_email,
        shares_location,
        is_featured,
    )
    else {
        return None;
    };
    Some(ProfileRecord {
        natural_key: key,
        updated_at: owned(view, "updated_at"),
        gender: owned(view, "gender"),
        age_range: owned(view, "age_range"),
        occupation: owned(view, "occupation"),
        district: owned(view, "district"),
        wants_newsletter,
        wants_digest,
        wants_event_invites,
        shares_email,
        shares_location,
        bio: owned(view, "bio"),
        avatar: owned(view, "avatar"),
        is_featured,
    })
}

/// Record the row's key and report duplicate collisions. An exact duplicate
/// also collides case-insensitively, so it reports both kinds.
fn check_unique_key(
    schema: &TableSchema,
    view: RecordView<'_>,
    seen: &mut SeenKeys,
    issues: &mut Vec<RowIssue>,
) -> String {
    let key = view.get(schema.key_field()).unwrap_or_default().to_owned();
    let collisions = seen.observe(&key);
    if collisions.exact {
        issues.push(RowIssue::DuplicateKey {
            entity: schema.entity(),
            key: key.clone(),
            row: view.row_number(),
        });
    }
    if collisions.folded {
        issues.push(RowIssue::DuplicateKeyCaseInsensitive {
            entity: schema.entity(),
            key: key.clone(),
            row: view.row_number(),
        });
    }
    key
}

fn check_required_fields(
    schema: &TableSchema,
    view: RecordView<'_>,
    key: &str,
    issues: &mut Vec<RowIssue>,
) {
    for &field in schema.required() {
        if is_blank(view.get(field).unwrap_or_default()) {
            issues.push(RowIssue::MissingField {
                entity: schema.entity(),
                field,
                key: key.to_owned(),
                row: view.row_number(),
            });
        }
    }
}

fn check_flag(
    schema: &TableSchema,
    view: RecordView<'_>,
    field: &'static str,
    key: &str,
    issues: &mut Vec<RowIssue>,
) -> Option<bool> {
    let raw = view.get(field).unwrap_or_default();
    let parsed = parse_boolean(raw);
    if parsed.is_none() {
        issues.push(RowIssue::InvalidBoolean {
            entity: schema.entity(),
            field,
            value: raw.to_owned(),
            key: key.to_owned(),
            row: view.row_number(),
        });
    }
    parsed
}

fn owned(view: RecordView<'_>, field: &str) -> String {
    view.get(field).unwrap_or_default().to_owned()
}
