//! Command line interface for the rollbook roster store.
//!
//! ## Responsibilities
//! - Parse arguments for the `import` and `export` subcommands.
//! - Merge configuration files and `ROLLBOOK_*` environment variables into
//!   the parsed arguments via `ortho_config`.
//! - Drive the validation and load pipeline in `rollbook-data`, narrating
//!   progress on standard output.
//!
//! ## Boundaries
//! - No roster semantics live here; validation belongs to `rollbook-core`
//!   and persistence to `rollbook-data`.
//! - Terminal output flows through [`ProgressSink`] so tests can capture the
//!   narration instead of scraping stdout.

#![forbid(unsafe_code)]

use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use rollbook_core::{Event, ProgressSink};
use rollbook_data::{ExportError, ImportError, OpenStoreError, RosterStore, import_from_paths};
use serde::{Deserialize, Serialize};

/// Command line flag names shared between parsing and diagnostics.
const ARG_ACCOUNTS: &str = "accounts";
const ARG_PROFILES: &str = "profiles";
const ARG_DATABASE: &str = "database";
const ARG_ACCOUNTS_OUT: &str = "accounts-out";
const ARG_PROFILES_OUT: &str = "profiles-out";

/// Environment variable names consulted during configuration merging.
const ENV_IMPORT_ACCOUNTS: &str = "ROLLBOOK_CMDS_IMPORT_ACCOUNTS";
const ENV_IMPORT_PROFILES: &str = "ROLLBOOK_CMDS_IMPORT_PROFILES";
const ENV_IMPORT_DATABASE: &str = "ROLLBOOK_CMDS_IMPORT_DATABASE";
const ENV_EXPORT_DATABASE: &str = "ROLLBOOK_CMDS_EXPORT_DATABASE";
const ENV_EXPORT_ACCOUNTS_OUT: &str = "ROLLBOOK_CMDS_EXPORT_ACCOUNTS_OUT";
const ENV_EXPORT_PROFILES_OUT: &str = "ROLLBOOK_CMDS_EXPORT_PROFILES_OUT";

/// Run the command line interface with the process arguments.
///
/// # Errors
///
/// Returns a [`CliError`] when parsing, configuration merging, validation,
/// or the requested command itself fails.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Import(args) => run_import(args),
        Command::Export(args) => run_export(args),
    }
}

fn run_import(args: ImportArgs) -> Result<(), CliError> {
    let config = resolve_import_config(args)?;
    execute_import(&config, &mut ConsoleSink)
}

fn run_export(args: ExportArgs) -> Result<(), CliError> {
    let config = resolve_export_config(args)?;
    execute_export(&config, &mut ConsoleSink)
}

fn resolve_import_config(args: ImportArgs) -> Result<ImportConfig, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    Ok(config)
}

fn resolve_export_config(args: ExportArgs) -> Result<ExportConfig, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    Ok(config)
}

fn execute_import<S: ProgressSink>(config: &ImportConfig, sink: &mut S) -> Result<(), CliError> {
    let mut store = RosterStore::open(&config.database)?;
    import_from_paths(&mut store, &config.accounts, &config.profiles, sink)?;
    Ok(())
}

fn execute_export<S: ProgressSink>(config: &ExportConfig, sink: &mut S) -> Result<(), CliError> {
    let store = RosterStore::open(&config.database)?;
    let accounts = store.export_accounts_to_path(&config.accounts_out)?;
    sink.emit(Event::info(format!(
        "Exported {accounts} account record(s) to {}",
        config.accounts_out
    )));
    let profiles = store.export_profiles_to_path(&config.profiles_out)?;
    sink.emit(Event::info(format!(
        "Exported {profiles} profile record(s) to {}",
        config.profiles_out
    )));
    sink.emit(Event::success("Export completed successfully"));
    Ok(())
}

#[derive(Debug, Parser)]
#[command(
    name = "rollbook",
    about = "Validate roster spreadsheets and load them into a SQLite store",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate a roster export and replace the store contents with it.
    Import(ImportArgs),
    /// Write the stored roster back out as CSV files.
    Export(ExportArgs),
}

/// Arguments for the `import` subcommand.
///
/// Every field is optional at parse time; missing values may still arrive
/// from a configuration file or the environment before [`ImportConfig`]
/// enforces their presence.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[ortho_config(prefix = "ROLLBOOK")]
struct ImportArgs {
    /// Path to the accounts CSV export.
    #[arg(long = ARG_ACCOUNTS, value_name = "path")]
    #[serde(default)]
    accounts: Option<Utf8PathBuf>,

    /// Path to the profiles CSV export.
    #[arg(long = ARG_PROFILES, value_name = "path")]
    #[serde(default)]
    profiles: Option<Utf8PathBuf>,

    /// Path to the SQLite roster store; created on first use.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    database: Option<Utf8PathBuf>,
}

impl ImportArgs {
    fn into_config(self) -> Result<ImportConfig, CliError> {
        let merged = self.load_and_merge()?;
        ImportConfig::try_from(merged)
    }
}

/// Arguments for the `export` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[ortho_config(prefix = "ROLLBOOK")]
struct ExportArgs {
    /// Path to the SQLite roster store to read from.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    database: Option<Utf8PathBuf>,

    /// Destination path for the accounts CSV.
    #[arg(long = ARG_ACCOUNTS_OUT, value_name = "path")]
    #[serde(default)]
    accounts_out: Option<Utf8PathBuf>,

    /// Destination path for the profiles CSV.
    #[arg(long = ARG_PROFILES_OUT, value_name = "path")]
    #[serde(default)]
    profiles_out: Option<Utf8PathBuf>,
}

impl ExportArgs {
    fn into_config(self) -> Result<ExportConfig, CliError> {
        let merged = self.load_and_merge()?;
        ExportConfig::try_from(merged)
    }
}

/// Import settings with every required path resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ImportConfig {
    accounts: Utf8PathBuf,
    profiles: Utf8PathBuf,
    database: Utf8PathBuf,
}

impl ImportConfig {
    /// Confirm the CSV sources exist before the store is touched.
    ///
    /// The database path is deliberately not checked; the store creates it.
    fn validate_sources(&self) -> Result<(), CliError> {
        require_existing(ARG_ACCOUNTS, &self.accounts)?;
        require_existing(ARG_PROFILES, &self.profiles)
    }
}

impl TryFrom<ImportArgs> for ImportConfig {
    type Error = CliError;

    fn try_from(args: ImportArgs) -> Result<Self, Self::Error> {
        let accounts = args.accounts.ok_or(CliError::MissingArgument {
            field: ARG_ACCOUNTS,
            env: ENV_IMPORT_ACCOUNTS,
        })?;
        let profiles = args.profiles.ok_or(CliError::MissingArgument {
            field: ARG_PROFILES,
            env: ENV_IMPORT_PROFILES,
        })?;
        let database = args.database.ok_or(CliError::MissingArgument {
            field: ARG_DATABASE,
            env: ENV_IMPORT_DATABASE,
        })?;
        Ok(Self {
            accounts,
            profiles,
            database,
        })
    }
}

/// Export settings with every required path resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ExportConfig {
    database: Utf8PathBuf,
    accounts_out: Utf8PathBuf,
    profiles_out: Utf8PathBuf,
}

impl ExportConfig {
    /// Confirm the store exists; the destination files are created on write.
    fn validate_sources(&self) -> Result<(), CliError> {
        require_existing(ARG_DATABASE, &self.database)
    }
}

impl TryFrom<ExportArgs> for ExportConfig {
    type Error = CliError;

    fn try_from(args: ExportArgs) -> Result<Self, Self::Error> {
        let database = args.database.ok_or(CliError::MissingArgument {
            field: ARG_DATABASE,
            env: ENV_EXPORT_DATABASE,
        })?;
        let accounts_out = args.accounts_out.ok_or(CliError::MissingArgument {
            field: ARG_ACCOUNTS_OUT,
            env: ENV_EXPORT_ACCOUNTS_OUT,
        })?;
        let profiles_out = args.profiles_out.ok_or(CliError::MissingArgument {
            field: ARG_PROFILES_OUT,
            env: ENV_EXPORT_PROFILES_OUT,
        })?;
        Ok(Self {
            database,
            accounts_out,
            profiles_out,
        })
    }
}

fn require_existing(field: &'static str, path: &Utf8Path) -> Result<(), CliError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(CliError::MissingSourceFile {
            field,
            path: path.to_owned(),
        })
    }
}

/// Progress sink that prints each narration event to standard output.
struct ConsoleSink;

impl ProgressSink for ConsoleSink {
    fn emit(&mut self, event: Event) {
        println!("[{}] {}", event.severity, event.message);
    }
}

/// Errors surfaced while driving the command line interface.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// The command line arguments failed to parse.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// A configuration file or environment layer failed to load.
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required setting was absent from every configuration layer.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// A source path does not point at a file.
    #[error("{field} path {path} does not exist")]
    MissingSourceFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// The roster store could not be opened.
    #[error(transparent)]
    Store(#[from] OpenStoreError),
    /// The import pipeline rejected the roster or failed to load it.
    #[error(transparent)]
    Import(#[from] ImportError),
    /// The stored roster could not be written out.
    #[error(transparent)]
    Export(#[from] ExportError),
}

#[cfg(test)]
mod tests;
