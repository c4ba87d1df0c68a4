//! Shared fixtures for the data crate's behavioural tests.

use rollbook_core::EventLog;
use rollbook_data::{RosterStore, import_batches};

/// Canonical account file: ids ascending from 1, flags upper-case, blank
/// optional fields. Exporting after importing this file reproduces it.
pub const ACCOUNTS_CSV: &str = "\
id,external_key,credential_hash,email_address,joined_at,last_seen_at,given_name,family_name,is_admin,is_moderator,is_active
1,alice,pbkdf2$a,alice@example.org,2024-01-05,,Alice,Lovelace,FALSE,FALSE,TRUE
2,bob,pbkdf2$b,bob@example.org,2024-02-11,2024-03-01,,,FALSE,TRUE,TRUE
";

/// Profiles matching [`ACCOUNTS_CSV`]; ALICE links to alice by case folding.
pub const PROFILES_CSV: &str = "\
id,natural_key,updated_at,gender,age_range,occupation,district,wants_newsletter,wants_digest,wants_event_invites,shares_email,shares_location,bio,avatar,is_featured,account_id
1,ALICE,2024-03-02,she,25-34,engineer,harbour,TRUE,FALSE,TRUE,FALSE,TRUE,Builds bridges,,FALSE,
2,bob,2024-03-05,he,35-44,chef,old town,FALSE,FALSE,TRUE,TRUE,FALSE,,avatars/bob.png,TRUE,
";

/// Profile file whose second key matches no account in [`ACCOUNTS_CSV`].
pub const UNRESOLVED_PROFILES_CSV: &str = "\
id,natural_key,updated_at,gender,age_range,occupation,district,wants_newsletter,wants_digest,wants_event_invites,shares_email,shares_location,bio,avatar,is_featured,account_id
1,bob,2024-03-05,he,35-44,chef,old town,FALSE,FALSE,TRUE,TRUE,FALSE,,avatars/bob.png,TRUE,
2,mallory,2024-03-06,she,25-34,locksmith,harbour,FALSE,FALSE,FALSE,FALSE,FALSE,,,FALSE,
";

/// Load the canonical roster into `store`, panicking on any failure.
pub fn seed_roster(store: &mut RosterStore) {
    let mut sink = EventLog::new();
    import_batches(
        store,
        ACCOUNTS_CSV.as_bytes(),
        PROFILES_CSV.as_bytes(),
        &mut sink,
    )
    .unwrap_or_else(|err| panic!("seed import failed: {err}"));
}
