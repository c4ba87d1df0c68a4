//! Row-scoped problems found while reading, ordering, or validating a batch.

use thiserror::Error;

use crate::schema::EntityKind;

/// A single problem attributed to one row of a roster file.
///
/// Issues are values rather than failures: the pipeline gathers every issue
/// across a whole batch before deciding its outcome, so one bad row never
/// hides another. Each variant names the offending row by file line (the
/// header is line 1) and, where one exists, the row's unique key.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RowIssue {
    /// The unique key matched an earlier row byte for byte.
    #[error("duplicate {entity} key: {key} (row {row})")]
    DuplicateKey {
        /// Entity the row belongs to.
        entity: EntityKind,
        /// The repeated key, as read.
        key: String,
        /// File line of the offending row.
        row: usize,
    },

    /// The unique key matched an earlier row once case is ignored.
    #[error("duplicate {entity} key (case-insensitive): {key} (row {row})")]
    DuplicateKeyCaseInsensitive {
        /// Entity the row belongs to.
        entity: EntityKind,
        /// The repeated key, as read.
        key: String,
        /// File line of the offending row.
        row: usize,
    },

    /// A required field was blank or absent.
    #[error("missing {field} for {entity} {key} (row {row})")]
    MissingField {
        /// Entity the row belongs to.
        entity: EntityKind,
        /// The blank column.
        field: &'static str,
        /// The row's unique key, as read.
        key: String,
        /// File line of the offending row.
        row: usize,
    },

    /// A boolean field held something other than TRUE or FALSE.
    #[error("invalid {field} value '{value}' for {entity} {key} (row {row})")]
    InvalidBoolean {
        /// Entity the row belongs to.
        entity: EntityKind,
        /// The offending column.
        field: &'static str,
        /// The rejected literal, as read.
        value: String,
        /// The row's unique key, as read.
        key: String,
        /// File line of the offending row.
        row: usize,
    },

    /// A profile row named an account key absent from the batch.
    #[error("account key {key} not found for profile (row {row})")]
    UnresolvedReference {
        /// The unmatched key, as read.
        key: String,
        /// File line of the offending row.
        row: usize,
    },

    /// The ordering key could not be parsed as an integer, so the batch
    /// keeps its discovered order.
    #[error("cannot order {entity} rows: sequence value '{value}' at row {row} is not an integer")]
    UnsortableKey {
        /// Entity the batch belongs to.
        entity: EntityKind,
        /// The unparsable value, as read.
        value: String,
        /// File line of the offending row.
        row: usize,
    },

    /// A data row's field count differed from the header's.
    #[error("{entity} row {row} has {found} fields, expected {expected}")]
    RaggedRow {
        /// Entity the row belongs to.
        entity: EntityKind,
        /// File line of the offending row.
        row: usize,
        /// Field count declared by the header.
        expected: usize,
        /// Field count actually found.
        found: usize,
    },
}

impl RowIssue {
    /// File line the issue is attributed to.
    #[must_use]
    pub const fn row(&self) -> usize {
        match self {
            Self::DuplicateKey { row, .. }
            | Self::DuplicateKeyCaseInsensitive { row, .. }
            | Self::MissingField { row, .. }
            | Self::InvalidBoolean { row, .. }
            | Self::UnresolvedReference { row, .. }
            | Self::UnsortableKey { row, .. }
            | Self::RaggedRow { row, .. } => *row,
        }
    }
}
