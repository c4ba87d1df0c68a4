//! Binary entry point for the `rollbook` command line tool.

#![forbid(unsafe_code)]

use std::process::ExitCode;

use rollbook_cli::CliError;

fn main() -> ExitCode {
    match rollbook_cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        // Clap renders usage and help output itself, including the exit code.
        Err(CliError::ArgumentParsing(err)) => err.exit(),
        Err(err) => {
            eprintln!("rollbook: {err}");
            ExitCode::FAILURE
        }
    }
}
