//! Duplicate keys and first-occurrence tracking.

use std::collections::HashMap;

use chrono::NaiveDate;
use clap::ValueEnum;
use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    data::{CellKey, Value, display_row},
    normalize::{FieldWarning, normalize_amount, normalize_date, normalize_identifier},
    roles::{ResolvedColumn, RoleAssignment},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
#[value(rename_all = "kebab-case")]
pub enum KeyStrategy {
    /// Every column compared verbatim
    #[default]
    WholeRow,
    /// Normalized (date, identifier, amount) triple
    RoleBased,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DuplicateKey {
    WholeRow(Vec<CellKey>),
    Roles {
        date: NaiveDate,
        identifier: String,
        amount: Decimal,
    },
}

/// Derives a [`DuplicateKey`] per row. `None` means the key is incomplete and
/// the row never takes part in grouping.
#[derive(Debug, Clone)]
pub enum KeyBuilder {
    WholeRow { columns: Vec<usize> },
    RoleBased(RoleAssignment),
}

impl KeyBuilder {
    /// Whole-row builder over every column except `excluded`.
    pub fn whole_row(column_count: usize, excluded: Option<usize>) -> Self {
        let columns = (0..column_count)
            .filter(|idx| Some(*idx) != excluded)
            .collect();
        KeyBuilder::WholeRow { columns }
    }

    pub fn role_based(roles: RoleAssignment) -> Self {
        KeyBuilder::RoleBased(roles)
    }

    pub fn strategy(&self) -> KeyStrategy {
        match self {
            KeyBuilder::WholeRow { .. } => KeyStrategy::WholeRow,
            KeyBuilder::RoleBased(_) => KeyStrategy::RoleBased,
        }
    }

    /// Builds the key for the row at body index `index`. Fields that fail to
    /// normalize are pushed onto `warnings`.
    pub fn key_for(
        &self,
        index: usize,
        row: &[Value],
        warnings: &mut Vec<FieldWarning>,
    ) -> Option<DuplicateKey> {
        match self {
            KeyBuilder::WholeRow { columns } => {
                let cells = columns
                    .iter()
                    .map(|&idx| row.get(idx).unwrap_or(&Value::Null))
                    .collect::<Vec<_>>();
                if cells.iter().all(|cell| cell.is_null()) {
                    return None;
                }
                Some(DuplicateKey::WholeRow(
                    cells.into_iter().map(Value::verbatim_key).collect(),
                ))
            }
            KeyBuilder::RoleBased(roles) => {
                let date = field(index, row, &roles.date, warnings, normalize_date);
                let amount = field(index, row, &roles.amount, warnings, normalize_amount);
                let identifier = row
                    .get(roles.identifier.index)
                    .map(normalize_identifier)
                    .unwrap_or_default();
                match (date, amount) {
                    (Some(date), Some(amount)) if !identifier.is_empty() => {
                        Some(DuplicateKey::Roles {
                            date,
                            identifier,
                            amount,
                        })
                    }
                    _ => None,
                }
            }
        }
    }
}

fn field<T>(
    index: usize,
    row: &[Value],
    column: &ResolvedColumn,
    warnings: &mut Vec<FieldWarning>,
    normalize: fn(&Value) -> Option<T>,
) -> Option<T> {
    let value = row.get(column.index)?;
    let normalized = normalize(value);
    if normalized.is_none() && !value.is_null() {
        let warning = FieldWarning {
            display_row: display_row(index),
            column: column.column.clone(),
            role: column.role,
            raw: value.as_display(),
        };
        debug!("Unparseable field: {warning}");
        warnings.push(warning);
    }
    normalized
}

/// First body index seen for each complete key. Scoped to one run.
#[derive(Debug, Default)]
pub struct FirstOccurrenceIndex {
    first: HashMap<DuplicateKey, usize>,
}

impl FirstOccurrenceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `key` at `index` when unseen and returns `None`; otherwise
    /// returns the index of the first row that carried the key.
    pub fn observe(&mut self, key: DuplicateKey, index: usize) -> Option<usize> {
        match self.first.get(&key) {
            Some(first) => Some(*first),
            None => {
                self.first.insert(key, index);
                None
            }
        }
    }

    pub fn distinct_keys(&self) -> usize {
        self.first.len()
    }
}
