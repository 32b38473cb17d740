//! Row highlight policies.
//!
//! Highlighting is always row-granular: the tag chosen for a row applies to
//! every cell in it. Colours are opaque strings handed to the serializer.

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::annotate::RowAnnotation;

pub const DEFAULT_DUPLICATE_COLOR: &str = "90EE90";
pub const DEFAULT_FIRST_COLOR: &str = "FFF2CC";
pub const DEFAULT_REPEAT_COLOR: &str = "F4CCCC";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
#[value(rename_all = "kebab-case")]
pub enum HighlightPolicy {
    /// Only repeated rows are coloured
    #[default]
    Binary,
    /// First occurrences and repeats get distinct colours
    Ternary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum HighlightTag {
    None,
    Duplicate,
    First,
    Repeat,
}

impl HighlightTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            HighlightTag::None => "none",
            HighlightTag::Duplicate => "duplicate",
            HighlightTag::First => "first",
            HighlightTag::Repeat => "repeat",
        }
    }
}

impl fmt::Display for HighlightTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl HighlightPolicy {
    pub fn assign(&self, annotation: &RowAnnotation) -> HighlightTag {
        match (self, annotation) {
            (HighlightPolicy::Binary, RowAnnotation::FirstOccurrence) => HighlightTag::None,
            (HighlightPolicy::Binary, RowAnnotation::DuplicateOf { .. }) => HighlightTag::Duplicate,
            (HighlightPolicy::Ternary, RowAnnotation::FirstOccurrence) => HighlightTag::First,
            (HighlightPolicy::Ternary, RowAnnotation::DuplicateOf { .. }) => HighlightTag::Repeat,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct Palette {
    pub duplicate: String,
    pub first: String,
    pub repeat: String,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            duplicate: DEFAULT_DUPLICATE_COLOR.to_string(),
            first: DEFAULT_FIRST_COLOR.to_string(),
            repeat: DEFAULT_REPEAT_COLOR.to_string(),
        }
    }
}

impl Palette {
    pub fn color_for(&self, tag: HighlightTag) -> Option<&str> {
        match tag {
            HighlightTag::None => None,
            HighlightTag::Duplicate => Some(&self.duplicate),
            HighlightTag::First => Some(&self.first),
            HighlightTag::Repeat => Some(&self.repeat),
        }
    }
}
