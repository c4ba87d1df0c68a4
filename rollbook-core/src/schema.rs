//! Declared shapes of the roster entities.
//!
//! The reader checks file headers against these schemas, the validator walks
//! their required and boolean column lists, and the store creates its tables
//! in the same column order. One vocabulary end to end: a column name in a
//! roster file is the column name in the store.

use std::fmt;

/// Identifies which roster entity a table, record, or issue belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// The parent entity: one row per member account.
    Account,
    /// The child entity: one row per member profile, keyed to an account.
    Profile,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Account => "account",
            Self::Profile => "profile",
        };
        f.write_str(name)
    }
}

/// Declared shape of one entity's delimited file and store table.
///
/// # Examples
///
/// ```
/// use rollbook_core::schema::account_schema;
///
/// let schema = account_schema();
/// assert_eq!(schema.key_field(), "external_key");
/// assert!(schema.is_boolean("is_admin"));
/// assert!(!schema.is_boolean("email_address"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSchema {
    entity: EntityKind,
    table_name: &'static str,
    columns: &'static [&'static str],
    key_field: &'static str,
    sequence_field: &'static str,
    required: &'static [&'static str],
    booleans: &'static [&'static str],
}

impl TableSchema {
    /// Entity this schema describes.
    #[must_use]
    pub const fn entity(&self) -> EntityKind {
        self.entity
    }

    /// Store table name.
    #[must_use]
    pub const fn table_name(&self) -> &'static str {
        self.table_name
    }

    /// Every column, in declared order.
    #[must_use]
    pub const fn columns(&self) -> &'static [&'static str] {
        self.columns
    }

    /// Column holding the entity's unique key.
    #[must_use]
    pub const fn key_field(&self) -> &'static str {
        self.key_field
    }

    /// Column holding the integer ordering key.
    #[must_use]
    pub const fn sequence_field(&self) -> &'static str {
        self.sequence_field
    }

    /// Columns that must be non-blank, in declared order.
    #[must_use]
    pub const fn required(&self) -> &'static [&'static str] {
        self.required
    }

    /// Columns holding boolean literals, in declared order.
    #[must_use]
    pub const fn booleans(&self) -> &'static [&'static str] {
        self.booleans
    }

    /// Whether `field` is one of the schema's boolean columns.
    #[must_use]
    pub fn is_boolean(&self, field: &str) -> bool {
        self.booleans.iter().any(|&name| name == field)
    }
}

static ACCOUNT: TableSchema = TableSchema {
    entity: EntityKind::Account,
    table_name: "accounts",
    columns: &[
        "id",
        "external_key",
        "credential_hash",
        "email_address",
        "joined_at",
        "last_seen_at",
        "given_name",
        "family_name",
        "is_admin",
        "is_moderator",
        "is_active",
    ],
    key_field: "external_key",
    sequence_field: "id",
    required: &["credential_hash", "email_address", "joined_at"],
    booleans: &["is_admin", "is_moderator", "is_active"],
};

static PROFILE: TableSchema = TableSchema {
    entity: EntityKind::Profile,
    table_name: "profiles",
    columns: &[
        "id",
        "natural_key",
        "updated_at",
        "gender",
        "age_range",
        "occupation",
        "district",
        "wants_newsletter",
        "wants_digest",
        "wants_event_invites",
        "shares_email",
        "shares_location",
        "bio",
        "avatar",
        "is_featured",
        "account_id",
    ],
    key_field: "natural_key",
    sequence_field: "id",
    required: &["gender", "age_range", "occupation", "district"],
    booleans: &[
        "wants_newsletter",
        "wants_digest",
        "wants_event_invites",
        "shares_email",
        "shares_location",
        "is_featured",
    ],
};

/// Schema for the account entity.
#[must_use]
pub const fn account_schema() -> &'static TableSchema {
    &ACCOUNT
}

/// Schema for the profile entity.
#[must_use]
pub const fn profile_schema() -> &'static TableSchema {
    &PROFILE
}
