//! Per-entity export of the stored roster as delimited text.

use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use rusqlite::types::ValueRef;
use thiserror::Error;

use rollbook_core::schema::TableSchema;
use rollbook_core::{account_schema, profile_schema};

use super::RosterStore;

/// Errors raised while exporting a stored table.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The export file could not be created.
    #[error("failed to create export file at {path}")]
    Create {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// An SQLite operation failed.
    #[error("failed to {operation}")]
    Sqlite {
        operation: &'static str,
        #[source]
        source: rusqlite::Error,
    },
    /// A record could not be written to the output.
    #[error("failed to write export record")]
    Write {
        #[from]
        source: csv::Error,
    },
    /// Buffered output could not be flushed.
    #[error("failed to flush export output")]
    Flush {
        #[source]
        source: std::io::Error,
    },
}

impl RosterStore {
    /// Export the accounts table to `writer` as delimited text.
    ///
    /// The header row carries the live column names and rows appear in
    /// store-return order. Booleans render as `TRUE`/`FALSE` and SQL `NULL`
    /// as an empty field, so a roster survives an export and re-import
    /// unchanged. Returns the number of data rows written.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError`] when the query fails or the output cannot be
    /// written.
    pub fn export_accounts_csv<W: Write>(&self, writer: W) -> Result<u64, ExportError> {
        self.export_table(account_schema(), writer)
    }

    /// Export the profiles table to `writer` as delimited text.
    ///
    /// Renders fields the same way as [`RosterStore::export_accounts_csv`].
    ///
    /// # Errors
    ///
    /// Returns [`ExportError`] when the query fails or the output cannot be
    /// written.
    pub fn export_profiles_csv<W: Write>(&self, writer: W) -> Result<u64, ExportError> {
        self.export_table(profile_schema(), writer)
    }

    /// Export the accounts table to a file at `path`, creating parent
    /// directories as needed.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Create`] when the file cannot be created, plus
    /// any error the in-memory export reports.
    pub fn export_accounts_to_path(&self, path: &Utf8Path) -> Result<u64, ExportError> {
        self.export_accounts_csv(create_export_file(path)?)
    }

    /// Export the profiles table to a file at `path`, creating parent
    /// directories as needed.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Create`] when the file cannot be created, plus
    /// any error the in-memory export reports.
    pub fn export_profiles_to_path(&self, path: &Utf8Path) -> Result<u64, ExportError> {
        self.export_profiles_csv(create_export_file(path)?)
    }

    fn export_table<W: Write>(
        &self,
        schema: &'static TableSchema,
        writer: W,
    ) -> Result<u64, ExportError> {
        let sql = format!("SELECT * FROM {}", schema.table_name());
        let mut statement =
            self.connection
                .prepare(&sql)
                .map_err(|source| ExportError::Sqlite {
                    operation: "prepare export query",
                    source,
                })?;
        let columns: Vec<String> = statement
            .column_names()
            .iter()
            .map(|&name| name.to_owned())
            .collect();

        let mut output = csv::Writer::from_writer(writer);
        output.write_record(&columns)?;

        let mut rows = statement.query([]).map_err(|source| ExportError::Sqlite {
            operation: "run export query",
            source,
        })?;
        let mut exported = 0u64;
        while let Some(row) = rows.next().map_err(|source| ExportError::Sqlite {
            operation: "read export row",
            source,
        })? {
            let mut fields = Vec::with_capacity(columns.len());
            for (position, name) in columns.iter().enumerate() {
                let value = row.get_ref(position).map_err(|source| ExportError::Sqlite {
                    operation: "decode export value",
                    source,
                })?;
                fields.push(render_value(schema, name, value));
            }
            output.write_record(&fields)?;
            exported += 1;
        }
        output
            .flush()
            .map_err(|source| ExportError::Flush { source })?;
        Ok(exported)
    }
}

fn create_export_file(path: &Utf8Path) -> Result<cap_std::fs_utf8::File, ExportError> {
    rollbook_fs::create_utf8_file(path).map_err(|source| ExportError::Create {
        path: path.to_owned(),
        source,
    })
}

fn render_value(schema: &TableSchema, column: &str, value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => String::new(),
        ValueRef::Integer(flag) if schema.is_boolean(column) => {
            if flag == 0 { "FALSE" } else { "TRUE" }.to_owned()
        }
        ValueRef::Integer(number) => number.to_string(),
        ValueRef::Real(number) => number.to_string(),
        ValueRef::Text(text) => String::from_utf8_lossy(text).into_owned(),
        // The roster schema declares no blob columns.
        ValueRef::Blob(_) => String::new(),
    }
}
