//! Test helpers for composing roster CLI files and layered overrides.

use super::*;
use std::{fs, path::Path};
use tempfile::TempDir;

/// Canonical account file used by the CLI scenarios: two accounts with ids
/// ascending from one and upper-case flag spellings.
pub(super) const ACCOUNTS_CSV: &str = "\
id,external_key,credential_hash,email_address,joined_at,last_seen_at,given_name,family_name,is_admin,is_moderator,is_active
1,alice,pbkdf2$a,alice@example.org,2024-01-05,,Alice,Lovelace,FALSE,FALSE,TRUE
2,bob,pbkdf2$b,bob@example.org,2024-02-11,2024-03-01,,,FALSE,TRUE,TRUE
";

/// Profiles matching [`ACCOUNTS_CSV`]; ALICE links to alice by case folding.
pub(super) const PROFILES_CSV: &str = "\
id,natural_key,updated_at,gender,age_range,occupation,district,wants_newsletter,wants_digest,wants_event_invites,shares_email,shares_location,bio,avatar,is_featured,account_id
1,ALICE,2024-03-02,she,25-34,engineer,harbour,TRUE,FALSE,TRUE,FALSE,TRUE,Builds bridges,,FALSE,
2,bob,2024-03-05,he,35-44,chef,old town,FALSE,FALSE,TRUE,TRUE,FALSE,,avatars/bob.png,TRUE,
";

#[derive(Debug, Clone, Default)]
pub(super) struct LayerOverrides {
    pub(super) accounts: Option<Utf8PathBuf>,
    pub(super) profiles: Option<Utf8PathBuf>,
    pub(super) database: Option<Utf8PathBuf>,
}

/// Roster fixtures on disk, one file per configuration layer so tests can
/// tell which layer supplied a path.
#[derive(Debug)]
pub(super) struct RosterFiles {
    _dir: TempDir,
    cli_accounts: Utf8PathBuf,
    cli_profiles: Utf8PathBuf,
    config_accounts: Utf8PathBuf,
    config_profiles: Utf8PathBuf,
    config_database: Utf8PathBuf,
    env_profiles: Utf8PathBuf,
    database: Utf8PathBuf,
    accounts_out: Utf8PathBuf,
    profiles_out: Utf8PathBuf,
}

impl RosterFiles {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = utf8_path(dir.path());
        let cli_accounts = root.join("cli.accounts.csv");
        let cli_profiles = root.join("cli.profiles.csv");
        let config_accounts = root.join("config.accounts.csv");
        let config_profiles = root.join("config.profiles.csv");
        let env_profiles = root.join("env.profiles.csv");
        for path in [&cli_accounts, &config_accounts] {
            fs::write(path, ACCOUNTS_CSV).expect("write accounts file");
        }
        for path in [&cli_profiles, &config_profiles, &env_profiles] {
            fs::write(path, PROFILES_CSV).expect("write profiles file");
        }
        Self {
            _dir: dir,
            cli_accounts,
            cli_profiles,
            config_accounts,
            config_profiles,
            config_database: root.join("config.roster.db"),
            env_profiles,
            database: root.join("roster.db"),
            accounts_out: root.join("exports/accounts.csv"),
            profiles_out: root.join("exports/profiles.csv"),
        }
    }

    pub(super) fn accounts(&self) -> &Utf8Path {
        &self.cli_accounts
    }

    pub(super) fn profiles(&self) -> &Utf8Path {
        &self.cli_profiles
    }

    pub(super) fn config_accounts(&self) -> &Utf8Path {
        &self.config_accounts
    }

    pub(super) fn config_profiles(&self) -> &Utf8Path {
        &self.config_profiles
    }

    pub(super) fn config_database(&self) -> &Utf8Path {
        &self.config_database
    }

    pub(super) fn env_profiles(&self) -> &Utf8Path {
        &self.env_profiles
    }

    pub(super) fn database(&self) -> &Utf8Path {
        &self.database
    }

    pub(super) fn accounts_out(&self) -> &Utf8Path {
        &self.accounts_out
    }

    pub(super) fn profiles_out(&self) -> &Utf8Path {
        &self.profiles_out
    }
}

pub(super) fn utf8_path(path: &Path) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(path.to_path_buf()).expect("temp paths are UTF-8")
}

pub(super) fn merge_layers(
    mut cli_args: ImportArgs,
    file_layer: Option<LayerOverrides>,
    env_layer: Option<LayerOverrides>,
) -> Result<ImportConfig, CliError> {
    merge_field(
        &mut cli_args.accounts,
        extract_field(&env_layer, |layer| &layer.accounts),
        extract_field(&file_layer, |layer| &layer.accounts),
    );
    merge_field(
        &mut cli_args.profiles,
        extract_field(&env_layer, |layer| &layer.profiles),
        extract_field(&file_layer, |layer| &layer.profiles),
    );
    merge_field(
        &mut cli_args.database,
        extract_field(&env_layer, |layer| &layer.database),
        extract_field(&file_layer, |layer| &layer.database),
    );
    resolve_import_config(cli_args)
}

fn merge_field<T: Clone>(target: &mut Option<T>, env_value: Option<T>, file_value: Option<T>) {
    if target.is_none()
        && let Some(value) = env_value.or(file_value)
    {
        *target = Some(value);
    }
}

fn extract_field<T: Clone>(
    layer: &Option<LayerOverrides>,
    accessor: fn(&LayerOverrides) -> &Option<T>,
) -> Option<T> {
    layer.as_ref().and_then(|entry| accessor(entry).clone())
}
