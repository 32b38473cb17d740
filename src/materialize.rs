//! Re-materializes an annotated run into plain rows for a serializer.
//!
//! The output carries the original columns followed by exactly one annotation
//! column, plus one highlight entry per row. Applying colours to cells is left
//! to whichever codec writes the sheet.

use serde::Serialize;

use crate::{
    annotate::{AnnotatedTable, RowAnnotation},
    config::DupConfig,
    data::display_row,
    highlight::HighlightTag,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HighlightedRow {
    pub display_row: usize,
    pub tag: HighlightTag,
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterializedTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub highlights: Vec<HighlightedRow>,
    pub duplicate_count: usize,
}

impl MaterializedTable {
    /// Rows that receive a colour, in row order.
    pub fn painted(&self) -> impl Iterator<Item = &HighlightedRow> + '_ {
        self.highlights.iter().filter(|row| row.color.is_some())
    }

    pub fn sidecar(&self) -> HighlightSidecar<'_> {
        HighlightSidecar {
            annotation_column: self.headers.last().map(String::as_str).unwrap_or_default(),
            duplicate_count: self.duplicate_count,
            rows: self.painted().collect(),
        }
    }
}

/// JSON document describing which sheet rows to paint.
#[derive(Debug, Serialize)]
pub struct HighlightSidecar<'a> {
    pub annotation_column: &'a str,
    pub duplicate_count: usize,
    pub rows: Vec<&'a HighlightedRow>,
}

pub fn materialize(result: &AnnotatedTable, config: &DupConfig) -> MaterializedTable {
    let mut headers = result.headers.clone();
    headers.push(result.annotation_column.clone());

    let rows = result
        .rows
        .iter()
        .zip(&result.annotations)
        .map(|(row, annotation)| {
            let mut cells = row.iter().map(|value| value.as_display()).collect::<Vec<_>>();
            cells.push(match annotation {
                RowAnnotation::FirstOccurrence => String::new(),
                RowAnnotation::DuplicateOf { first_row } => config.annotation_text(*first_row),
            });
            cells
        })
        .collect();

    let highlights = result
        .highlights
        .iter()
        .enumerate()
        .map(|(idx, tag)| HighlightedRow {
            display_row: display_row(idx),
            tag: *tag,
            color: config.colors.color_for(*tag).map(str::to_string),
        })
        .collect();

    MaterializedTable {
        headers,
        rows,
        highlights,
        duplicate_count: result.duplicate_count,
    }
}
