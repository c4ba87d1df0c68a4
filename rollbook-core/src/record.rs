//! Validated roster records.
//!
//! These types are only ever constructed by the validator, after every check
//! on their batch has passed. The declared sequence key does not appear
//! here: ordering is applied before validation, so batch order carries it.

/// A validated account row, ready for loading.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AccountRecord {
    /// Unique key the account is known by externally.
    pub external_key: String,
    /// Hashed credential, stored as given.
    pub credential_hash: String,
    /// Contact address, stored as given.
    pub email_address: String,
    /// Date the member joined, stored as given.
    pub joined_at: String,
    /// Last activity timestamp, stored as given; may be blank.
    pub last_seen_at: String,
    /// Optional given name; blank in the file means absent.
    pub given_name: Option<String>,
    /// Optional family name; blank in the file means absent.
    pub family_name: Option<String>,
    /// Administrator privilege flag.
    pub is_admin: bool,
    /// Moderator privilege flag.
    pub is_moderator: bool,
    /// Whether the account is active.
    pub is_active: bool,
}

/// A validated profile row, ready for loading once its account is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProfileRecord {
    /// Unique key; case-insensitively matches an account's `external_key`
    /// in the same batch.
    pub natural_key: String,
    /// Last update timestamp, stored as given; may be blank.
    pub updated_at: String,
    /// Self-described gender category.
    pub gender: String,
    /// Age band category.
    pub age_range: String,
    /// Occupation category.
    pub occupation: String,
    /// Home district category.
    pub district: String,
    /// Newsletter preference flag.
    pub wants_newsletter: bool,
    /// Digest preference flag.
    pub wants_digest: bool,
    /// Event invitation preference flag.
    pub wants_event_invites: bool,
    /// Whether the email address may be shared.
    pub shares_email: bool,
    /// Whether the location may be shared.
    pub shares_location: bool,
    /// Free-text biography, stored as given; may be blank.
    pub bio: String,
    /// Avatar reference, stored as given; may be blank.
    pub avatar: String,
    /// Whether the profile is featured.
    pub is_featured: bool,
}
