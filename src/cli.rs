use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::{highlight::HighlightPolicy, key::KeyStrategy};

#[derive(Debug, Parser)]
#[command(author, version, about = "Find, annotate, and highlight duplicate CSV rows", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Annotate duplicate rows with a reference to their first occurrence
    Mark(MarkArgs),
    /// Show which columns would back a role-based duplicate key
    Roles(RolesArgs),
}

#[derive(Debug, Args)]
pub struct MarkArgs {
    /// Input CSV file to scan for duplicates
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Output CSV file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Write row highlight assignments as JSON to this file
    #[arg(long = "highlights")]
    pub highlights: Option<PathBuf>,
    /// Render the annotated rows as a coloured table to stdout
    #[arg(long = "table")]
    pub table: bool,
    /// CSV delimiter character for reading input
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Delimiter to use for output (defaults to input delimiter)
    #[arg(long = "output-delimiter", value_parser = parse_delimiter)]
    pub output_delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Character encoding for the output file/stdout (defaults to utf-8)
    #[arg(long = "output-encoding")]
    pub output_encoding: Option<String>,
    #[command(flatten)]
    pub engine: EngineArgs,
}

#[derive(Debug, Args)]
pub struct RolesArgs {
    /// Input CSV file to inspect
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    #[command(flatten)]
    pub engine: EngineArgs,
}

/// Engine settings shared by every command. Each flag overrides the matching
/// entry of `--config`.
#[derive(Debug, Args, Default)]
pub struct EngineArgs {
    /// YAML configuration file
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,
    /// How rows are compared
    #[arg(long, value_enum)]
    pub strategy: Option<KeyStrategy>,
    /// Column holding the date role (skips detection for that role)
    #[arg(long = "date-column")]
    pub date_column: Option<String>,
    /// Column holding the identifier role (skips detection for that role)
    #[arg(long = "identifier-column")]
    pub identifier_column: Option<String>,
    /// Column holding the amount role (skips detection for that role)
    #[arg(long = "amount-column")]
    pub amount_column: Option<String>,
    /// Highlight only repeats (binary) or first occurrences and repeats (ternary)
    #[arg(long, value_enum)]
    pub highlight: Option<HighlightPolicy>,
    /// Colour for repeated rows under the binary policy
    #[arg(long = "duplicate-color")]
    pub duplicate_color: Option<String>,
    /// Colour for first occurrences under the ternary policy
    #[arg(long = "first-color")]
    pub first_color: Option<String>,
    /// Colour for repeated rows under the ternary policy
    #[arg(long = "repeat-color")]
    pub repeat_color: Option<String>,
    /// Name of the appended annotation column
    #[arg(long = "annotation-column")]
    pub annotation_column: Option<String>,
    /// Annotation text for repeated rows; `{row}` becomes the first row number
    #[arg(long = "annotation-template")]
    pub annotation_template: Option<String>,
    /// Rows sampled by content-based role detection (0 means full scan)
    #[arg(long = "sample-rows")]
    pub sample_rows: Option<usize>,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
