//! In-memory table model handed to the duplicate engine.
//!
//! A [`Table`] is rectangular by construction: every row carries exactly one
//! [`Value`] per header, and header names are unique.

use std::{collections::HashSet, fmt};

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{DupError, DupResult};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Text(String),
    Number(f64),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl Value {
    /// Interprets a decoded CSV field. Empty fields become [`Value::Null`];
    /// everything else stays verbatim text.
    pub fn from_raw(raw: &str) -> Self {
        if raw.is_empty() {
            Value::Null
        } else {
            Value::Text(raw.to_string())
        }
    }

    pub fn is_null(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    pub fn as_display(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Text(s) => s.clone(),
            Value::Number(f) => {
                if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 {
                    (*f as i64).to_string()
                } else {
                    f.to_string()
                }
            }
            Value::Date(d) => d.format("%Y-%m-%d").to_string(),
            Value::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }

    /// Hashable, verbatim identity of the cell used by whole-row comparison.
    pub fn verbatim_key(&self) -> CellKey {
        match self {
            Value::Null => CellKey::Null,
            Value::Text(s) => CellKey::Text(s.clone()),
            // -0.0 and 0.0 compare equal as floats, so they share a key
            Value::Number(f) if *f == 0.0 => CellKey::Number(0f64.to_bits()),
            Value::Number(f) => CellKey::Number(f.to_bits()),
            Value::Date(d) => CellKey::Date(*d),
            Value::DateTime(dt) => CellKey::DateTime(*dt),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(value as f64)
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Value::Date(value)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Value::DateTime(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CellKey {
    Null,
    Text(String),
    Number(u64),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Value>>) -> DupResult<Self> {
        let mut seen = HashSet::with_capacity(headers.len());
        for name in &headers {
            if !seen.insert(name.as_str()) {
                return Err(DupError::DuplicateHeader { name: name.clone() });
            }
        }
        for (idx, row) in rows.iter().enumerate() {
            if row.len() != headers.len() {
                return Err(DupError::SchemaMismatch {
                    row: idx + 2,
                    expected: headers.len(),
                    found: row.len(),
                });
            }
        }
        Ok(Self { headers, rows })
    }

    pub fn from_text_rows(headers: Vec<String>, rows: Vec<Vec<String>>) -> DupResult<Self> {
        let rows = rows
            .into_iter()
            .map(|row| row.iter().map(|cell| Value::from_raw(cell)).collect())
            .collect();
        Self::new(headers, rows)
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Values of one column, top to bottom.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &Value> + '_ {
        self.rows.iter().filter_map(move |row| row.get(index))
    }
}

/// Converts a 0-based body index into the 1-based spreadsheet row number of a
/// sheet with one header row.
pub fn display_row(index: usize) -> usize {
    index + 2
}
