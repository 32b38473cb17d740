//! Typed errors raised by the duplicate-detection core.
//!
//! Field-level parse failures never surface here; they degrade to unknown
//! sentinels and are reported as [`crate::normalize::FieldWarning`]s instead.

use thiserror::Error;

use crate::roles::ColumnRole;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DupError {
    #[error("Could not detect a {role} column; supply one explicitly")]
    MissingRole { role: ColumnRole },
    #[error("Row {row} has {found} field(s) but the header declares {expected}")]
    SchemaMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("Header contains column '{name}' more than once")]
    DuplicateHeader { name: String },
    #[error("Column '{column}' configured for the {role} role is not present in the header")]
    UnknownColumn { role: ColumnRole, column: String },
}

pub type DupResult<T> = std::result::Result<T, DupError>;
