//! Delimited roster file reading.
//!
//! The reader maps one file onto a [`Table`]: the header row must carry
//! exactly the schema's column set (in any order), data rows are captured
//! verbatim with their file line numbers, and rows of the wrong width become
//! [`RowIssue::RaggedRow`] entries instead of aborting the read.

use std::collections::HashSet;
use std::io::Read;

use camino::{Utf8Path, Utf8PathBuf};
use csv::ReaderBuilder;
use rollbook_core::schema::TableSchema;
use rollbook_core::{EntityKind, RowIssue, Table};
use thiserror::Error;

/// Errors that end a file read before validation can run.
#[derive(Debug, Error)]
pub enum ReadTableError {
    /// The file could not be opened.
    #[error("failed to open {entity} file at {path}")]
    Open {
        /// Entity the file was expected to hold.
        entity: EntityKind,
        /// Path that failed to open.
        path: Utf8PathBuf,
        /// Underlying IO failure.
        #[source]
        source: std::io::Error,
    },
    /// The header row could not be decoded.
    #[error("failed to read {entity} header")]
    Header {
        /// Entity the file was expected to hold.
        entity: EntityKind,
        /// Underlying decode failure.
        #[source]
        source: csv::Error,
    },
    /// The header names do not form the declared column set.
    #[error("{entity} header mismatch: missing {missing:?}, unexpected {unexpected:?}")]
    HeaderMismatch {
        /// Entity the file was expected to hold.
        entity: EntityKind,
        /// Declared columns absent from the file, alphabetically.
        missing: Vec<String>,
        /// Undeclared or repeated header names, in file order.
        unexpected: Vec<String>,
    },
    /// A data record could not be decoded.
    #[error("failed to read {entity} row")]
    Read {
        /// Entity the file was expected to hold.
        entity: EntityKind,
        /// Underlying decode failure.
        #[source]
        source: csv::Error,
    },
}

/// Read one roster file into a [`Table`] plus the structural issues found.
///
/// The header must contain exactly the schema's columns; order is free
/// because fields are addressed by name. Rows whose width differs from the
/// header are reported as [`RowIssue::RaggedRow`] and excluded while the
/// read continues, so one mangled line never hides the issues after it.
/// Values are kept verbatim; nothing is trimmed here.
///
/// # Errors
///
/// Returns [`ReadTableError::HeaderMismatch`] when the header is not a
/// permutation of the declared columns (an empty file reports every column
/// missing), and [`ReadTableError::Header`] or [`ReadTableError::Read`] when
/// the input cannot be decoded at all.
pub fn read_table<R: Read>(
    input: R,
    schema: &'static TableSchema,
) -> Result<(Table, Vec<RowIssue>), ReadTableError> {
    let entity = schema.entity();
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(input);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|source| ReadTableError::Header { entity, source })?
        .iter()
        .map(str::to_owned)
        .collect();
    check_header(schema, &headers)?;

    let width = headers.len();
    let mut table = Table::new(schema, headers);
    let mut issues = Vec::new();
    for (position, record) in reader.records().enumerate() {
        let record = record.map_err(|source| ReadTableError::Read { entity, source })?;
        // The header is line 1, so the first data row is line 2.
        let row = position + 2;
        if record.len() == width {
            table.push_row(row, record.iter().map(str::to_owned).collect());
        } else {
            issues.push(RowIssue::RaggedRow {
                entity,
                row,
                expected: width,
                found: record.len(),
            });
        }
    }
    Ok((table, issues))
}

/// Open `path` and read it as a roster table.
///
/// # Errors
///
/// Returns [`ReadTableError::Open`] when the file cannot be opened, plus any
/// error [`read_table`] reports for its contents.
pub fn read_table_from_path(
    path: &Utf8Path,
    schema: &'static TableSchema,
) -> Result<(Table, Vec<RowIssue>), ReadTableError> {
    let file = rollbook_fs::open_utf8_file(path).map_err(|source| ReadTableError::Open {
        entity: schema.entity(),
        path: path.to_owned(),
        source,
    })?;
    read_table(file, schema)
}

fn check_header(schema: &'static TableSchema, headers: &[String]) -> Result<(), ReadTableError> {
    let declared: HashSet<&str> = schema.columns().iter().copied().collect();
    let mut seen: HashSet<&str> = HashSet::with_capacity(headers.len());
    let mut unexpected: Vec<String> = Vec::new();
    for name in headers {
        let name = name.as_str();
        if declared.contains(name) && seen.insert(name) {
            continue;
        }
        unexpected.push(name.to_owned());
    }
    let mut missing: Vec<String> = declared
        .iter()
        .filter(|&&column| !seen.contains(column))
        .map(|&column| column.to_owned())
        .collect();
    missing.sort_unstable();

    if missing.is_empty() && unexpected.is_empty() {
        Ok(())
    } else {
        Err(ReadTableError::HeaderMismatch {
            entity: schema.entity(),
            missing,
            unexpected,
        })
    }
}
