//! `roles` command: list the column each key role resolves to.

use anyhow::{Context, Result};
use itertools::Itertools;
use log::info;

use crate::{
    annotate::resolve_roles,
    cli::RolesArgs,
    config::DupConfig,
    io_utils,
    roles::{ColumnRole, RoleAssignment},
    table,
};

pub fn execute(args: &RolesArgs) -> Result<()> {
    let delimiter = io_utils::resolve_input_delimiter(&args.input, args.delimiter);
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let config = DupConfig::resolve(&args.engine)?;
    let table = io_utils::read_table(&args.input, delimiter, encoding)?;
    let (headers, roles) = resolve_roles(&table, &config)
        .with_context(|| format!("Detecting key columns in {:?}", args.input))?;

    let rows = role_rows(&headers, &roles);
    let display_headers = vec![
        "#".to_string(),
        "column".to_string(),
        "role".to_string(),
        "resolution".to_string(),
    ];
    table::print_table(&display_headers, &rows);
    info!("Key columns for {:?}: {roles}", args.input);
    Ok(())
}

fn role_rows(headers: &[String], roles: &RoleAssignment) -> Vec<Vec<String>> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let assigned = roles.assigned_to(idx);
            let (role, resolution) = if assigned.is_empty() {
                (ColumnRole::Unassigned.to_string(), String::new())
            } else {
                (
                    assigned.iter().map(|c| c.role).join(", "),
                    assigned.iter().map(|c| c.resolution).join(", "),
                )
            };
            vec![(idx + 1).to_string(), name.clone(), role, resolution]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::{RoleOverrides, detect_roles};

    #[test]
    fn role_rows_cover_every_column() {
        let headers = ["memo", "date", "client", "amount"]
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>();
        let roles = detect_roles(&headers, &[], &RoleOverrides::default()).unwrap();
        let rows = role_rows(&headers, &roles);
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0], vec!["1", "memo", "unassigned", ""]);
        assert_eq!(rows[3], vec!["4", "amount", "amount", "keyword"]);
    }

    #[test]
    fn role_rows_list_every_role_sharing_a_column() {
        let headers = ["when", "ref", "total"]
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>();
        let overrides = RoleOverrides {
            date: Some("when".to_string()),
            identifier: Some("when".to_string()),
            amount: None,
        };
        let roles = detect_roles(&headers, &[], &overrides).unwrap();
        let rows = role_rows(&headers, &roles);
        assert_eq!(rows[0], vec!["1", "when", "date, identifier", "explicit, explicit"]);
        assert_eq!(rows[1], vec!["2", "ref", "unassigned", ""]);
        assert_eq!(rows[2], vec!["3", "total", "amount", "keyword"]);
    }
}
