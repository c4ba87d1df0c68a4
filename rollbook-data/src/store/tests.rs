use camino::Utf8PathBuf;
use rstest::{fixture, rstest};
use rusqlite::Connection;

use rollbook_core::schema::TableSchema;
use rollbook_core::validate::{validate_accounts, validate_profiles};
use rollbook_core::{
    AcceptedBatch, AccountRecord, ProfileRecord, Table, Validation, account_schema, profile_schema,
};

use super::*;

const ALICE: &[&str] = &[
    "1",
    "alice",
    "pbkdf2$a",
    "alice@example.org",
    "2024-01-05",
    "",
    "Alice",
    "Lovelace",
    "FALSE",
    "FALSE",
    "TRUE",
];
const BOB: &[&str] = &[
    "2",
    "bob",
    "pbkdf2$b",
    "bob@example.org",
    "2024-02-11",
    "2024-03-01",
    "",
    "",
    "FALSE",
    "TRUE",
    "TRUE",
];
const ALICE_PROFILE: &[&str] = &[
    "1",
    "ALICE",
    "2024-03-02",
    "she",
    "25-34",
    "engineer",
    "harbour",
    "TRUE",
    "FALSE",
    "TRUE",
    "FALSE",
    "TRUE",
    "Builds bridges",
    "",
    "FALSE",
    "",
];

#[fixture]
fn store() -> RosterStore {
    RosterStore::open_in_memory().expect("open in-memory store")
}

fn raw_table(schema: &'static TableSchema, rows: &[&[&str]]) -> Table {
    let headers = schema.columns().iter().map(|&c| c.to_owned()).collect();
    let mut table = Table::new(schema, headers);
    for (offset, row) in rows.iter().enumerate() {
        table.push_row(offset + 2, row.iter().map(|&v| v.to_owned()).collect());
    }
    table
}

fn account_batch(rows: &[&[&str]]) -> AcceptedBatch<AccountRecord> {
    match validate_accounts(&raw_table(account_schema(), rows), Vec::new()) {
        Validation::Accepted(batch) => batch,
        Validation::Rejected(issues) => panic!("account fixture rejected: {issues:?}"),
    }
}

fn profile_batch(
    accounts: &AcceptedBatch<AccountRecord>,
    rows: &[&[&str]],
) -> AcceptedBatch<ProfileRecord> {
    match validate_profiles(&raw_table(profile_schema(), rows), accounts, Vec::new()) {
        Validation::Accepted(batch) => batch,
        Validation::Rejected(issues) => panic!("profile fixture rejected: {issues:?}"),
    }
}

fn single_i64(connection: &Connection, sql: &str) -> i64 {
    connection
        .query_row(sql, [], |row| row.get(0))
        .expect("query value")
}

#[rstest]
fn replace_all_inserts_accounts_and_links_profiles(mut store: RosterStore) {
    let accounts = account_batch(&[ALICE, BOB]);
    let profiles = profile_batch(&accounts, &[ALICE_PROFILE]);

    let report = store.replace_all(&accounts, &profiles).expect("load");

    assert_eq!(
        report,
        LoadReport {
            accounts_inserted: 2,
            profiles_inserted: 1,
        }
    );
    let linked = single_i64(
        &store.connection,
        "SELECT account_id FROM profiles WHERE natural_key = 'ALICE'",
    );
    let alice_id = single_i64(
        &store.connection,
        "SELECT id FROM accounts WHERE external_key = 'alice'",
    );
    assert_eq!(linked, alice_id);
}

#[rstest]
fn identifiers_restart_from_one_on_every_load(mut store: RosterStore) {
    let first = account_batch(&[ALICE, BOB]);
    let no_profiles = profile_batch(&first, &[]);
    store.replace_all(&first, &no_profiles).expect("first load");

    let second = account_batch(&[&[
        "1",
        "carol",
        "pbkdf2$c",
        "carol@example.org",
        "2024-04-01",
        "",
        "",
        "",
        "FALSE",
        "FALSE",
        "TRUE",
    ]]);
    let empty = profile_batch(&second, &[]);
    store.replace_all(&second, &empty).expect("second load");

    assert_eq!(
        single_i64(&store.connection, "SELECT MAX(id) FROM accounts"),
        1
    );
}

#[rstest]
fn empty_batches_clear_the_store(mut store: RosterStore) {
    let seeded = account_batch(&[ALICE]);
    let profiles = profile_batch(&seeded, &[ALICE_PROFILE]);
    store.replace_all(&seeded, &profiles).expect("seed load");

    let empty_accounts = account_batch(&[]);
    let empty_profiles = profile_batch(&empty_accounts, &[]);
    let report = store
        .replace_all(&empty_accounts, &empty_profiles)
        .expect("empty load");

    assert_eq!(report, LoadReport::default());
    assert_eq!(store.account_count().expect("count accounts"), 0);
    assert_eq!(store.profile_count().expect("count profiles"), 0);
}

#[rstest]
fn mismatched_batches_fail_and_roll_back(mut store: RosterStore) {
    let seeded = account_batch(&[ALICE]);
    let no_profiles = profile_batch(&seeded, &[]);
    store.replace_all(&seeded, &no_profiles).expect("seed load");

    // Profiles validated against one account batch, loaded with another:
    // the key cannot resolve and the whole load must roll back.
    let with_carol = account_batch(&[&[
        "1",
        "carol",
        "pbkdf2$c",
        "carol@example.org",
        "2024-04-01",
        "",
        "",
        "",
        "FALSE",
        "FALSE",
        "TRUE",
    ]]);
    let carol_profile = profile_batch(
        &with_carol,
        &[&[
            "1",
            "carol",
            "2024-04-02",
            "she",
            "25-34",
            "baker",
            "old town",
            "FALSE",
            "FALSE",
            "FALSE",
            "FALSE",
            "FALSE",
            "",
            "",
            "FALSE",
            "",
        ]],
    );
    let error = store
        .replace_all(&account_batch(&[ALICE]), &carol_profile)
        .expect_err("unresolved key");

    assert!(matches!(error, LoadError::UnresolvedKey { ref key } if key == "carol"));
    assert_eq!(store.account_count().expect("count accounts"), 1);
    assert_eq!(
        store
            .connection
            .query_row("SELECT external_key FROM accounts", [], |row| {
                row.get::<_, String>(0)
            })
            .expect("seeded key"),
        "alice"
    );
}

#[rstest]
fn export_accounts_renders_nulls_and_booleans(mut store: RosterStore) {
    let accounts = account_batch(&[ALICE, BOB]);
    let profiles = profile_batch(&accounts, &[]);
    store.replace_all(&accounts, &profiles).expect("load");

    let mut buffer = Vec::new();
    let exported = store
        .export_accounts_csv(&mut buffer)
        .expect("export accounts");

    assert_eq!(exported, 2);
    let text = String::from_utf8(buffer).expect("utf-8 export");
    let expected = "\
id,external_key,credential_hash,email_address,joined_at,last_seen_at,given_name,family_name,is_admin,is_moderator,is_active
1,alice,pbkdf2$a,alice@example.org,2024-01-05,,Alice,Lovelace,FALSE,FALSE,TRUE
2,bob,pbkdf2$b,bob@example.org,2024-02-11,2024-03-01,,,FALSE,TRUE,TRUE
";
    assert_eq!(text, expected);
}

#[rstest]
fn export_profiles_includes_resolved_account_ids(mut store: RosterStore) {
    let accounts = account_batch(&[ALICE]);
    let profiles = profile_batch(&accounts, &[ALICE_PROFILE]);
    store.replace_all(&accounts, &profiles).expect("load");

    let mut buffer = Vec::new();
    let exported = store
        .export_profiles_csv(&mut buffer)
        .expect("export profiles");

    assert_eq!(exported, 1);
    let text = String::from_utf8(buffer).expect("utf-8 export");
    let expected = "\
id,natural_key,updated_at,gender,age_range,occupation,district,wants_newsletter,wants_digest,wants_event_invites,shares_email,shares_location,bio,avatar,is_featured,account_id
1,ALICE,2024-03-02,she,25-34,engineer,harbour,TRUE,FALSE,TRUE,FALSE,TRUE,Builds bridges,,FALSE,1
";
    assert_eq!(text, expected);
}

#[rstest]
fn export_to_path_creates_parent_directories(mut store: RosterStore) {
    let accounts = account_batch(&[ALICE]);
    let profiles = profile_batch(&accounts, &[]);
    store.replace_all(&accounts, &profiles).expect("load");

    let dir = tempfile::TempDir::new().expect("tempdir");
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 tempdir");
    let target = root.join("exports/accounts.csv");
    let exported = store
        .export_accounts_to_path(&target)
        .expect("export to path");

    assert_eq!(exported, 1);
    let text = std::fs::read_to_string(target.as_std_path()).expect("read export");
    assert!(text.starts_with("id,external_key,"));
}

#[rstest]
fn open_rejects_a_different_schema_version() {
    let dir = tempfile::TempDir::new().expect("tempdir");
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 tempdir");
    let database = root.join("roster.db");
    drop(RosterStore::open(&database).expect("create store"));

    let connection = Connection::open(&database).expect("raw connection");
    connection
        .execute("UPDATE rollbook_schema_version SET version = 99", [])
        .expect("bump version");
    drop(connection);

    let error = RosterStore::open(&database).expect_err("version mismatch");
    assert!(matches!(
        error,
        OpenStoreError::Schema(RosterSchemaError::VersionMismatch {
            expected: SCHEMA_VERSION,
            found: 99,
        })
    ));
}

#[rstest]
fn counts_start_at_zero(store: RosterStore) {
    assert_eq!(store.account_count().expect("count accounts"), 0);
    assert_eq!(store.profile_count().expect("count profiles"), 0);
}
