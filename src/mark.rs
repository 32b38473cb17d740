//! `mark` command: annotate duplicate rows of a CSV file.

use anyhow::{Context, Result, bail};
use log::{info, warn};

use crate::{
    annotate::annotate, cli::MarkArgs, config::DupConfig, io_utils, materialize::materialize,
    table,
};

pub fn execute(args: &MarkArgs) -> Result<()> {
    let delimiter = io_utils::resolve_input_delimiter(&args.input, args.delimiter);
    let input_encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let output_path = args.output.as_deref();
    if args.table && output_path.is_some_and(|p| !io_utils::is_dash(p)) {
        bail!("--table cannot be combined with --output");
    }
    let output_delimiter =
        io_utils::resolve_output_delimiter(output_path, args.output_delimiter, delimiter);
    let output_encoding = io_utils::resolve_encoding(args.output_encoding.as_deref())?;
    let config = DupConfig::resolve(&args.engine)?;

    info!(
        "Marking duplicates in '{}' -> {:?} (strategy {:?}, highlight {:?}, delimiter '{}')",
        args.input.display(),
        output_path
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "stdout".into()),
        config.strategy,
        config.highlight,
        crate::printable_delimiter(delimiter)
    );

    let table = io_utils::read_table(&args.input, delimiter, input_encoding)?;
    let result = annotate(&table, &config)
        .with_context(|| format!("Annotating duplicates in {:?}", args.input))?;
    if let Some(roles) = &result.roles {
        info!("Key columns: {roles}");
    }
    if !result.warnings.is_empty() {
        warn!(
            "{} field(s) could not be normalized; rows with unreadable key fields were not grouped",
            result.warnings.len()
        );
    }

    let output = materialize(&result, &config);
    if args.table {
        let colors = output
            .highlights
            .iter()
            .map(|row| row.color.as_deref())
            .collect::<Vec<_>>();
        table::print_highlighted_table(&output.headers, &output.rows, &colors);
    } else {
        io_utils::write_table(output_path, output_delimiter, output_encoding, &output)?;
    }
    if let Some(path) = &args.highlights {
        io_utils::write_json(path, &output.sidecar())?;
        info!(
            "Highlight assignments for {} row(s) written to {:?}",
            output.painted().count(),
            path
        );
    }

    info!(
        "Found {} duplicate row(s) among {} row(s)",
        output.duplicate_count,
        result.row_count()
    );
    Ok(())
}
