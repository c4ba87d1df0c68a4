//! In-memory row tables addressed by column name.
//!
//! A [`Table`] owns the rows read from one roster file together with the
//! header actually found in that file. Field access goes through the header
//! index, so files may order their columns freely as long as the column set
//! matches the declared schema.

use std::collections::HashMap;

use crate::issue::RowIssue;
use crate::schema::TableSchema;

/// One data row as read, positionally aligned with its table's header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    row_number: usize,
    values: Vec<String>,
}

impl RawRecord {
    /// File line this row came from. The header is line 1, so the first data
    /// row is 2.
    #[must_use]
    pub const fn row_number(&self) -> usize {
        self.row_number
    }

    /// Field values in header order.
    #[must_use]
    pub fn values(&self) -> &[String] {
        &self.values
    }
}

/// A row paired with its table, giving access to fields by column name.
#[derive(Debug, Clone, Copy)]
pub struct RecordView<'a> {
    table: &'a Table,
    row: &'a RawRecord,
}

impl<'a> RecordView<'a> {
    /// File line of the underlying row.
    #[must_use]
    pub const fn row_number(&self) -> usize {
        self.row.row_number()
    }

    /// Value of the named field, or `None` when the column is absent.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&'a str> {
        let index = *self.table.index.get(field)?;
        self.row.values.get(index).map(String::as_str)
    }
}

/// Rows of one roster file, in discovered or sorted order.
///
/// # Examples
///
/// ```
/// use rollbook_core::schema::account_schema;
/// use rollbook_core::table::Table;
///
/// let schema = account_schema();
/// let headers: Vec<String> = schema.columns().iter().map(|&c| c.to_owned()).collect();
/// let mut table = Table::new(schema, headers);
/// table.push_row(2, vec!["1".into(), "alice".into()]);
/// assert_eq!(table.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Table {
    schema: &'static TableSchema,
    headers: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<RawRecord>,
}

impl Table {
    /// Create an empty table for `schema` with the header found in the file.
    #[must_use]
    pub fn new(schema: &'static TableSchema, headers: Vec<String>) -> Self {
        let index = headers
            .iter()
            .enumerate()
            .map(|(position, name)| (name.clone(), position))
            .collect();
        Self {
            schema,
            headers,
            index,
            rows: Vec::new(),
        }
    }

    /// Declared schema for this table's entity.
    #[must_use]
    pub const fn schema(&self) -> &'static TableSchema {
        self.schema
    }

    /// Header as found in the file, in file order.
    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Number of data rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table holds no data rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append a row. `values` must align with the header; the reader only
    /// pushes rows whose width matched, so a short row here reads as absent
    /// fields rather than panicking.
    pub fn push_row(&mut self, row_number: usize, values: Vec<String>) {
        self.rows.push(RawRecord { row_number, values });
    }

    /// Iterate the rows as name-addressable views, in current order.
    pub fn records(&self) -> impl Iterator<Item = RecordView<'_>> {
        self.rows.iter().map(|row| RecordView { table: self, row })
    }

    /// Order the rows by their integer sequence key, ascending and stable.
    ///
    /// Every key is parsed before any reordering, so a bad key can never
    /// leave the table half-sorted: on the first absent or non-integer key
    /// the table keeps its discovered order and the offending row is
    /// reported. Equal keys keep their discovered relative order.
    ///
    /// # Errors
    ///
    /// Returns [`RowIssue::UnsortableKey`] naming the first row whose
    /// sequence value does not parse as an integer.
    pub fn sort_by_sequence(&mut self) -> Result<(), RowIssue> {
        let field = self.schema.sequence_field();
        let mut keys = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            let view = RecordView { table: self, row };
            let raw = view.get(field).unwrap_or_default();
            match raw.trim().parse::<i64>() {
                Ok(key) => keys.push(key),
                Err(_) => {
                    return Err(RowIssue::UnsortableKey {
                        entity: self.schema.entity(),
                        value: raw.to_owned(),
                        row: row.row_number(),
                    });
                }
            }
        }

        let mut keyed: Vec<(i64, RawRecord)> =
            keys.into_iter().zip(self.rows.drain(..)).collect();
        keyed.sort_by_key(|&(key, _)| key);
        self.rows = keyed.into_iter().map(|(_, row)| row).collect();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{EntityKind, account_schema};
    use rstest::rstest;

    fn account_table(rows: &[&[&str]]) -> Table {
        let schema = account_schema();
        let headers = schema.columns().iter().map(|&c| c.to_owned()).collect();
        let mut table = Table::new(schema, headers);
        for (offset, row) in rows.iter().enumerate() {
            table.push_row(offset + 2, row.iter().map(|&v| v.to_owned()).collect());
        }
        table
    }

    fn keys_in_order(table: &Table) -> Vec<String> {
        table
            .records()
            .map(|view| view.get("external_key").unwrap_or_default().to_owned())
            .collect()
    }

    #[rstest]
    fn fields_resolve_by_name_regardless_of_column_order() {
        let schema = account_schema();
        let mut table = Table::new(
            schema,
            vec!["external_key".to_owned(), "id".to_owned()],
        );
        table.push_row(2, vec!["alice".to_owned(), "7".to_owned()]);

        let view = table.records().next().expect("one row");
        assert_eq!(view.get("id"), Some("7"));
        assert_eq!(view.get("external_key"), Some("alice"));
        assert_eq!(view.get("no_such_column"), None);
    }

    #[rstest]
    fn sorts_rows_ascending_by_sequence() {
        let mut table = account_table(&[&["3", "carol"], &["1", "alice"], &["2", "bob"]]);
        table.sort_by_sequence().expect("sortable keys");
        assert_eq!(keys_in_order(&table), ["alice", "bob", "carol"]);
    }

    #[rstest]
    fn equal_keys_keep_discovered_order() {
        let mut table = account_table(&[&["2", "carol"], &["1", "alice"], &["1", "bob"]]);
        table.sort_by_sequence().expect("sortable keys");
        assert_eq!(keys_in_order(&table), ["alice", "bob", "carol"]);
    }

    #[rstest]
    #[case(&["1", "alice"], &["x7", "bob"], "x7")]
    #[case(&["1", "alice"], &["", "bob"], "")]
    fn unparsable_key_reports_and_preserves_order(
        #[case] first: &[&str],
        #[case] second: &[&str],
        #[case] bad_value: &str,
    ) {
        let mut table = account_table(&[second, first]);
        let issue = table.sort_by_sequence().expect_err("unsortable key");
        assert_eq!(
            issue,
            RowIssue::UnsortableKey {
                entity: EntityKind::Account,
                value: bad_value.to_owned(),
                row: 2,
            }
        );
        assert_eq!(keys_in_order(&table), ["bob", "alice"]);
    }

    #[rstest]
    fn sequence_keys_tolerate_surrounding_whitespace() {
        let mut table = account_table(&[&[" 2 ", "bob"], &["1", "alice"]]);
        table.sort_by_sequence().expect("sortable keys");
        assert_eq!(keys_in_order(&table), ["alice", "bob"]);
    }

    #[rstest]
    fn short_rows_read_missing_fields_as_absent() {
        let table = account_table(&[&["1"]]);
        let view = table.records().next().expect("one row");
        assert_eq!(view.get("external_key"), None);
    }
}
