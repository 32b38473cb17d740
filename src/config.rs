//! Engine configuration.
//!
//! A [`DupConfig`] can be loaded from a YAML file and is then refined by any
//! command-line flags the user supplied; flags always win over file values.
//!
//! ```yaml
//! strategy: role-based
//! columns:
//!   amount: Valor
//! highlight: ternary
//! colors:
//!   first: FFF2CC
//!   repeat: F4CCCC
//! annotation-column: Duplicate_Row
//! annotation-template: "Duplicate of row {row}"
//! ```

use std::{fs, path::Path};

use anyhow::{Context, Result, ensure};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    cli::EngineArgs,
    highlight::{HighlightPolicy, Palette},
    key::KeyStrategy,
    roles::RoleOverrides,
};

pub const DEFAULT_ANNOTATION_COLUMN: &str = "Duplicate_Row";
pub const DEFAULT_ANNOTATION_TEMPLATE: &str = "Duplicate of row {row}";
pub const DEFAULT_SAMPLE_ROWS: usize = 200;
pub const ROW_PLACEHOLDER: &str = "{row}";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct DupConfig {
    pub strategy: KeyStrategy,
    pub columns: RoleOverrides,
    pub highlight: HighlightPolicy,
    pub colors: Palette,
    pub annotation_column: String,
    pub annotation_template: String,
    /// Rows inspected by content-based role detection (0 reads every row)
    pub sample_rows: usize,
}

impl Default for DupConfig {
    fn default() -> Self {
        Self {
            strategy: KeyStrategy::default(),
            columns: RoleOverrides::default(),
            highlight: HighlightPolicy::default(),
            colors: Palette::default(),
            annotation_column: DEFAULT_ANNOTATION_COLUMN.to_string(),
            annotation_template: DEFAULT_ANNOTATION_TEMPLATE.to_string(),
            sample_rows: DEFAULT_SAMPLE_ROWS,
        }
    }
}

impl DupConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw =
            fs::read_to_string(path).with_context(|| format!("Opening config file {path:?}"))?;
        Self::from_yaml_str(&raw).with_context(|| format!("Parsing config file {path:?}"))
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: DupConfig = serde_yaml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            !self.annotation_column.trim().is_empty(),
            "Annotation column name cannot be empty"
        );
        ensure!(
            self.annotation_template.contains(ROW_PLACEHOLDER),
            "Annotation template '{}' must contain {ROW_PLACEHOLDER}",
            self.annotation_template
        );
        Ok(())
    }

    /// Text written into the annotation column of a repeated row.
    pub fn annotation_text(&self, first_row: usize) -> String {
        self.annotation_template
            .replace(ROW_PLACEHOLDER, &first_row.to_string())
    }

    /// Builds the effective configuration: the optional config file, then
    /// every flag present in `args`.
    pub fn resolve(args: &EngineArgs) -> Result<Self> {
        let mut config = match &args.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        if let Some(strategy) = args.strategy {
            config.strategy = strategy;
        }
        if let Some(column) = &args.date_column {
            config.columns.date = Some(column.clone());
        }
        if let Some(column) = &args.identifier_column {
            config.columns.identifier = Some(column.clone());
        }
        if let Some(column) = &args.amount_column {
            config.columns.amount = Some(column.clone());
        }
        if let Some(policy) = args.highlight {
            config.highlight = policy;
        }
        if let Some(color) = &args.duplicate_color {
            config.colors.duplicate = color.clone();
        }
        if let Some(color) = &args.first_color {
            config.colors.first = color.clone();
        }
        if let Some(color) = &args.repeat_color {
            config.colors.repeat = color.clone();
        }
        if let Some(column) = &args.annotation_column {
            config.annotation_column = column.clone();
        }
        if let Some(template) = &args.annotation_template {
            config.annotation_template = template.clone();
        }
        if let Some(rows) = args.sample_rows {
            config.sample_rows = rows;
        }
        config.validate()?;
        debug!("Effective configuration: {config:?}");
        Ok(config)
    }
}
