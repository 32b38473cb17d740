//! Column role detection for role-based duplicate keys.
//!
//! Roles are resolved by an ordered list of rules: explicit overrides, header
//! keywords, column content, then column position. Every rule is applied to
//! all roles before the next rule runs, so a weaker rule never takes a column
//! a stronger rule would have claimed for another role. A column serves at
//! most one role.

use std::fmt;

use itertools::Itertools;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    data::Value,
    error::{DupError, DupResult},
    normalize::{CURRENCY_SYMBOLS, normalize_date, parse_amount_text},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColumnRole {
    Date,
    Identifier,
    Amount,
    Unassigned,
}

impl ColumnRole {
    /// Roles a role-based key is built from, in key order.
    pub const KEYED: [ColumnRole; 3] = [ColumnRole::Date, ColumnRole::Identifier, ColumnRole::Amount];

    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnRole::Date => "date",
            ColumnRole::Identifier => "identifier",
            ColumnRole::Amount => "amount",
            ColumnRole::Unassigned => "unassigned",
        }
    }

    fn keywords(&self) -> &'static [&'static str] {
        match self {
            ColumnRole::Date => &["date", "timestamp", "datetime", "data", "fecha", "emissao"],
            ColumnRole::Identifier => &[
                "client",
                "customer",
                "code",
                "codigo",
                "código",
                "account",
                "identifier",
                "document",
            ],
            ColumnRole::Amount => &["value", "amount", "valor", "total", "price", "importe"],
            ColumnRole::Unassigned => &[],
        }
    }

    /// Zero-based column index used when nothing else resolves the role.
    fn fallback_position(&self) -> Option<usize> {
        match self {
            ColumnRole::Date => Some(1),
            ColumnRole::Identifier => Some(2),
            ColumnRole::Amount => Some(3),
            ColumnRole::Unassigned => None,
        }
    }
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which rule produced a role's column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Resolution {
    Explicit,
    Keyword,
    Content,
    Positional,
}

impl Resolution {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resolution::Explicit => "explicit",
            Resolution::Keyword => "keyword",
            Resolution::Content => "content",
            Resolution::Positional => "positional",
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-supplied column names that bypass detection for their role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct RoleOverrides {
    pub date: Option<String>,
    pub identifier: Option<String>,
    pub amount: Option<String>,
}

impl RoleOverrides {
    pub fn get(&self, role: ColumnRole) -> Option<&str> {
        match role {
            ColumnRole::Date => self.date.as_deref(),
            ColumnRole::Identifier => self.identifier.as_deref(),
            ColumnRole::Amount => self.amount.as_deref(),
            ColumnRole::Unassigned => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.date.is_none() && self.identifier.is_none() && self.amount.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedColumn {
    pub role: ColumnRole,
    pub column: String,
    pub index: usize,
    pub resolution: Resolution,
}

/// Columns backing each keyed role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleAssignment {
    pub date: ResolvedColumn,
    pub identifier: ResolvedColumn,
    pub amount: ResolvedColumn,
}

impl RoleAssignment {
    pub fn get(&self, role: ColumnRole) -> Option<&ResolvedColumn> {
        match role {
            ColumnRole::Date => Some(&self.date),
            ColumnRole::Identifier => Some(&self.identifier),
            ColumnRole::Amount => Some(&self.amount),
            ColumnRole::Unassigned => None,
        }
    }

    pub fn columns(&self) -> [&ResolvedColumn; 3] {
        [&self.date, &self.identifier, &self.amount]
    }

    /// Resolutions targeting the column at `index`, in role order. Explicit
    /// overrides may give one column more than one role.
    pub fn assigned_to(&self, index: usize) -> Vec<&ResolvedColumn> {
        self.columns()
            .into_iter()
            .filter(|c| c.index == index)
            .collect()
    }
}

impl fmt::Display for RoleAssignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self
            .columns()
            .iter()
            .map(|c| format!("{}='{}' ({})", c.role, c.column, c.resolution))
            .join(", ");
        f.write_str(&rendered)
    }
}

struct DetectionContext<'a> {
    headers: &'a [String],
    lowered: Vec<String>,
    sample: &'a [Vec<Value>],
    overrides: &'a RoleOverrides,
}

type Rule = fn(&DetectionContext<'_>, ColumnRole, &[bool]) -> DupResult<Option<usize>>;

const RULES: &[(Resolution, Rule)] = &[
    (Resolution::Explicit, explicit_rule),
    (Resolution::Keyword, keyword_rule),
    (Resolution::Content, content_rule),
    (Resolution::Positional, positional_rule),
];

/// Resolves the date, identifier and amount columns of a table.
///
/// `sample` holds the leading rows of the table body and is only consulted by
/// the content rule. Fails with [`DupError::MissingRole`] naming the first
/// role no rule could resolve.
pub fn detect_roles(
    headers: &[String],
    sample: &[Vec<Value>],
    overrides: &RoleOverrides,
) -> DupResult<RoleAssignment> {
    let context = DetectionContext {
        headers,
        lowered: headers.iter().map(|h| h.trim().to_lowercase()).collect(),
        sample,
        overrides,
    };
    let mut taken = vec![false; headers.len()];
    let mut resolved: [Option<ResolvedColumn>; 3] = [None, None, None];

    for (resolution, rule) in RULES {
        for (slot, role) in ColumnRole::KEYED.iter().enumerate() {
            if resolved[slot].is_some() {
                continue;
            }
            if let Some(index) = rule(&context, *role, &taken)? {
                taken[index] = true;
                debug!(
                    "Role {role} resolved to column '{}' by {resolution} rule",
                    headers[index]
                );
                resolved[slot] = Some(ResolvedColumn {
                    role: *role,
                    column: headers[index].clone(),
                    index,
                    resolution: *resolution,
                });
            }
        }
    }

    let [date, identifier, amount] = resolved;
    Ok(RoleAssignment {
        date: date.ok_or(DupError::MissingRole {
            role: ColumnRole::Date,
        })?,
        identifier: identifier.ok_or(DupError::MissingRole {
            role: ColumnRole::Identifier,
        })?,
        amount: amount.ok_or(DupError::MissingRole {
            role: ColumnRole::Amount,
        })?,
    })
}

fn explicit_rule(
    context: &DetectionContext<'_>,
    role: ColumnRole,
    _taken: &[bool],
) -> DupResult<Option<usize>> {
    let Some(column) = context.overrides.get(role) else {
        return Ok(None);
    };
    context
        .headers
        .iter()
        .position(|h| h == column)
        .or_else(|| {
            let wanted = column.trim().to_lowercase();
            context.lowered.iter().position(|h| *h == wanted)
        })
        .map(Some)
        .ok_or_else(|| DupError::UnknownColumn {
            role,
            column: column.to_string(),
        })
}

fn keyword_rule(
    context: &DetectionContext<'_>,
    role: ColumnRole,
    taken: &[bool],
) -> DupResult<Option<usize>> {
    Ok(context.lowered.iter().enumerate().find_map(|(idx, name)| {
        (!taken[idx] && role.keywords().iter().any(|k| name.contains(k))).then_some(idx)
    }))
}

fn content_rule(
    context: &DetectionContext<'_>,
    role: ColumnRole,
    taken: &[bool],
) -> DupResult<Option<usize>> {
    let predicate: fn(&Value) -> bool = match role {
        ColumnRole::Amount => looks_numeric,
        ColumnRole::Date => |value| normalize_date(value).is_some(),
        _ => return Ok(None),
    };
    Ok((0..context.headers.len())
        .find(|&idx| !taken[idx] && predominantly(context.sample, idx, predicate)))
}

fn positional_rule(
    context: &DetectionContext<'_>,
    role: ColumnRole,
    taken: &[bool],
) -> DupResult<Option<usize>> {
    Ok(role
        .fallback_position()
        .filter(|&idx| idx < context.headers.len() && !taken[idx]))
}

/// True when more than half of the column's non-empty sample values satisfy
/// `predicate`.
fn predominantly(sample: &[Vec<Value>], index: usize, predicate: fn(&Value) -> bool) -> bool {
    let (matching, total) = sample
        .iter()
        .filter_map(|row| row.get(index))
        .filter(|value| !value.is_null())
        .fold((0usize, 0usize), |(matching, total), value| {
            (matching + usize::from(predicate(value)), total + 1)
        });
    total > 0 && matching * 2 > total
}

/// Numbers, or text made only of digits, separators, signs and currency
/// noise. Date-like text is excluded.
pub fn looks_numeric(value: &Value) -> bool {
    match value {
        Value::Number(f) => f.is_finite(),
        Value::Text(s) => {
            if normalize_date(value).is_some() {
                return false;
            }
            let trimmed = s.trim();
            let body = trimmed.strip_prefix("R$").unwrap_or(trimmed);
            body.chars()
                .filter(|c| !c.is_whitespace() && !CURRENCY_SYMBOLS.contains(c))
                .all(|c| c.is_ascii_digit() || matches!(c, ',' | '.' | '-' | '+'))
                && parse_amount_text(s).is_some()
        }
        _ => false,
    }
}
