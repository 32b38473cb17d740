//! Duplicate classification of a whole table.
//!
//! Rows are visited in order and folded into a [`FirstOccurrenceIndex`] owned
//! by the call. A row whose key is already indexed references the first row
//! that carried it, so three or more equal rows all point at the same row.

use log::debug;
use serde::Serialize;

use crate::{
    config::DupConfig,
    data::{Table, Value, display_row},
    error::DupResult,
    highlight::HighlightTag,
    key::{FirstOccurrenceIndex, KeyBuilder, KeyStrategy},
    normalize::FieldWarning,
    roles::{RoleAssignment, detect_roles},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum RowAnnotation {
    FirstOccurrence,
    /// `first_row` is the 1-based spreadsheet row of the first occurrence.
    DuplicateOf { first_row: usize },
}

impl RowAnnotation {
    pub fn is_duplicate(&self) -> bool {
        matches!(self, RowAnnotation::DuplicateOf { .. })
    }

    /// Body index (0-based) of the referenced first occurrence.
    pub fn first_index(&self) -> Option<usize> {
        match self {
            RowAnnotation::FirstOccurrence => None,
            RowAnnotation::DuplicateOf { first_row } => first_row.checked_sub(2),
        }
    }
}

/// Outcome of one engine run.
#[derive(Debug, Clone)]
pub struct AnnotatedTable {
    /// Input headers without any pre-existing annotation column.
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    pub annotation_column: String,
    pub annotations: Vec<RowAnnotation>,
    pub highlights: Vec<HighlightTag>,
    pub duplicate_count: usize,
    pub distinct_keys: usize,
    pub strategy: KeyStrategy,
    pub roles: Option<RoleAssignment>,
    pub warnings: Vec<FieldWarning>,
}

impl AnnotatedTable {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Classifies every row of `table` and assigns highlight tags.
///
/// A column named like the configured annotation column is dropped before any
/// key is built, so annotating an already annotated table gives the same
/// classification and still yields a single annotation column.
pub fn annotate(table: &Table, config: &DupConfig) -> DupResult<AnnotatedTable> {
    let excluded = table.column_index(&config.annotation_column);
    let (headers, rows) = strip_column(table, excluded);
    if excluded.is_some() {
        debug!(
            "Ignoring existing '{}' column while building keys",
            config.annotation_column
        );
    }

    let builder = match config.strategy {
        KeyStrategy::WholeRow => KeyBuilder::whole_row(headers.len(), None),
        KeyStrategy::RoleBased => {
            let roles = detect_sampled(&headers, &rows, config)?;
            debug!("Role-based key columns: {roles}");
            KeyBuilder::role_based(roles)
        }
    };

    let mut first_occurrences = FirstOccurrenceIndex::new();
    let mut warnings = Vec::new();
    let mut annotations = Vec::with_capacity(rows.len());
    let mut duplicate_count = 0usize;

    for (idx, row) in rows.iter().enumerate() {
        let annotation = match builder.key_for(idx, row, &mut warnings) {
            Some(key) => match first_occurrences.observe(key, idx) {
                Some(first) => {
                    duplicate_count += 1;
                    RowAnnotation::DuplicateOf {
                        first_row: display_row(first),
                    }
                }
                None => RowAnnotation::FirstOccurrence,
            },
            None => RowAnnotation::FirstOccurrence,
        };
        annotations.push(annotation);
    }

    let highlights = annotations
        .iter()
        .map(|annotation| config.highlight.assign(annotation))
        .collect();
    let strategy = builder.strategy();
    let roles = match builder {
        KeyBuilder::RoleBased(roles) => Some(roles),
        KeyBuilder::WholeRow { .. } => None,
    };
    debug!(
        "Classified {} row(s): {} duplicate(s) across {} distinct key(s)",
        rows.len(),
        duplicate_count,
        first_occurrences.distinct_keys()
    );

    Ok(AnnotatedTable {
        headers,
        rows,
        annotation_column: config.annotation_column.clone(),
        annotations,
        highlights,
        duplicate_count,
        distinct_keys: first_occurrences.distinct_keys(),
        strategy,
        roles,
        warnings,
    })
}

/// Runs role detection the way [`annotate`] would, returning the headers the
/// roles index into.
pub fn resolve_roles(table: &Table, config: &DupConfig) -> DupResult<(Vec<String>, RoleAssignment)> {
    let (headers, rows) = strip_column(table, table.column_index(&config.annotation_column));
    let roles = detect_sampled(&headers, &rows, config)?;
    Ok((headers, roles))
}

fn detect_sampled(
    headers: &[String],
    rows: &[Vec<Value>],
    config: &DupConfig,
) -> DupResult<RoleAssignment> {
    let sample = match config.sample_rows {
        0 => rows,
        limit => &rows[..limit.min(rows.len())],
    };
    detect_roles(headers, sample, &config.columns)
}

fn strip_column(table: &Table, excluded: Option<usize>) -> (Vec<String>, Vec<Vec<Value>>) {
    let Some(excluded) = excluded else {
        return (table.headers().to_vec(), table.rows().to_vec());
    };
    let headers = table
        .headers()
        .iter()
        .enumerate()
        .filter(|(idx, _)| *idx != excluded)
        .map(|(_, header)| header.clone())
        .collect();
    let rows = table
        .rows()
        .iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .filter(|(idx, _)| *idx != excluded)
                .map(|(_, value)| value.clone())
                .collect()
        })
        .collect();
    (headers, rows)
}
