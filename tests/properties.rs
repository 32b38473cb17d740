//! Property tests over generated tables covering determinism, reference
//! correctness, duplicate counting, and re-annotation of annotated output.

use std::collections::{HashMap, HashSet};

use proptest::prelude::*;

use csv_dupmark::{
    annotate::{RowAnnotation, annotate},
    config::DupConfig,
    data::Table,
    key::KeyStrategy,
    materialize::materialize,
};

const HEADERS: [&str; 3] = ["date", "client", "amount"];
const DATES: &[&str] = &["01/02/2024", "2024-02-01", "02/02/2024", "", "someday"];
const CLIENTS: &[&str] = &["123", "123.0", " ACME ", "acme", ""];
const AMOUNTS: &[&str] = &["9.600,00", "9600.00", "9600.01", "", "n/a"];

fn cell_strategy(column: usize) -> BoxedStrategy<String> {
    let choices = match column {
        0 => DATES,
        1 => CLIENTS,
        _ => AMOUNTS,
    };
    proptest::sample::select(choices.to_vec())
        .prop_map(str::to_string)
        .boxed()
}

fn rows_strategy() -> impl Strategy<Value = Vec<Vec<String>>> {
    let row = (cell_strategy(0), cell_strategy(1), cell_strategy(2))
        .prop_map(|(a, b, c)| vec![a, b, c]);
    proptest::collection::vec(row, 0..40)
}

fn build_table(rows: &[Vec<String>]) -> Table {
    Table::from_text_rows(HEADERS.iter().map(|s| s.to_string()).collect(), rows.to_vec())
        .expect("generated table is rectangular")
}

fn strategy_config() -> impl Strategy<Value = DupConfig> {
    prop_oneof![Just(KeyStrategy::WholeRow), Just(KeyStrategy::RoleBased)].prop_map(|strategy| {
        DupConfig {
            strategy,
            ..DupConfig::default()
        }
    })
}

/// Hand-written canonical forms for every generated cell.
fn canonical(column: usize, raw: &str) -> Option<&'static str> {
    match (column, raw) {
        (0, "01/02/2024" | "2024-02-01") => Some("2024-02-01"),
        (0, "02/02/2024") => Some("2024-02-02"),
        (1, "123" | "123.0") => Some("123"),
        (1, " ACME " | "acme") => Some("acme"),
        (2, "9.600,00" | "9600.00") => Some("9600"),
        (2, "9600.01") => Some("9600.01"),
        _ => None,
    }
}

/// Expected grouping key, computed without the engine.
fn expected_key(strategy: KeyStrategy, row: &[String]) -> Option<Vec<String>> {
    match strategy {
        KeyStrategy::WholeRow => {
            if row.iter().all(|cell| cell.is_empty()) {
                None
            } else {
                Some(row.to_vec())
            }
        }
        KeyStrategy::RoleBased => row
            .iter()
            .enumerate()
            .map(|(column, raw)| canonical(column, raw).map(str::to_string))
            .collect(),
    }
}

fn expected_annotations(strategy: KeyStrategy, rows: &[Vec<String>]) -> Vec<RowAnnotation> {
    let mut first_seen = HashMap::new();
    rows.iter()
        .enumerate()
        .map(|(idx, row)| match expected_key(strategy, row) {
            None => RowAnnotation::FirstOccurrence,
            Some(key) => match first_seen.get(&key) {
                Some(first) => RowAnnotation::DuplicateOf { first_row: first + 2 },
                None => {
                    first_seen.insert(key, idx);
                    RowAnnotation::FirstOccurrence
                }
            },
        })
        .collect()
}

proptest! {
    #[test]
    fn annotation_is_deterministic(rows in rows_strategy(), config in strategy_config()) {
        let table = build_table(&rows);
        let first = annotate(&table, &config).expect("annotate");
        let second = annotate(&table, &config).expect("annotate again");
        prop_assert_eq!(first.annotations, second.annotations);
        prop_assert_eq!(first.duplicate_count, second.duplicate_count);
    }

    #[test]
    fn annotations_match_hand_computed_grouping(
        rows in rows_strategy(),
        config in strategy_config(),
    ) {
        let result = annotate(&build_table(&rows), &config).expect("annotate");
        prop_assert_eq!(result.annotations, expected_annotations(config.strategy, &rows));
    }

    #[test]
    fn duplicates_reference_matching_first_occurrence(
        rows in rows_strategy(),
        config in strategy_config(),
    ) {
        let result = annotate(&build_table(&rows), &config).expect("annotate");
        for (idx, annotation) in result.annotations.iter().enumerate() {
            if let Some(first) = annotation.first_index() {
                prop_assert!(first < idx);
                prop_assert_eq!(result.annotations[first], RowAnnotation::FirstOccurrence);
                let own_key = expected_key(config.strategy, &rows[idx]);
                prop_assert!(own_key.is_some());
                prop_assert_eq!(own_key, expected_key(config.strategy, &rows[first]));
            }
        }
    }

    #[test]
    fn incomplete_keys_never_group(rows in rows_strategy(), config in strategy_config()) {
        let result = annotate(&build_table(&rows), &config).expect("annotate");
        let referenced = result
            .annotations
            .iter()
            .filter_map(RowAnnotation::first_index)
            .collect::<HashSet<_>>();
        for (idx, row) in rows.iter().enumerate() {
            if expected_key(config.strategy, row).is_none() {
                prop_assert_eq!(result.annotations[idx], RowAnnotation::FirstOccurrence);
                prop_assert!(!referenced.contains(&idx));
            }
        }
    }

    #[test]
    fn duplicate_count_is_complete_rows_minus_distinct_keys(
        rows in rows_strategy(),
        config in strategy_config(),
    ) {
        let result = annotate(&build_table(&rows), &config).expect("annotate");
        let keys = rows
            .iter()
            .filter_map(|row| expected_key(config.strategy, row))
            .collect::<Vec<_>>();
        let distinct = keys.iter().collect::<HashSet<_>>();
        let classified = result.annotations.iter().filter(|a| a.is_duplicate()).count();
        prop_assert_eq!(result.duplicate_count, classified);
        prop_assert_eq!(result.duplicate_count, keys.len() - distinct.len());
        prop_assert_eq!(result.distinct_keys, distinct.len());
    }

    #[test]
    fn reannotating_output_reproduces_classification(
        rows in rows_strategy(),
        config in strategy_config(),
    ) {
        let result = annotate(&build_table(&rows), &config).expect("annotate");
        let output = materialize(&result, &config);
        let reread = Table::from_text_rows(output.headers.clone(), output.rows.clone())
            .expect("materialized table is rectangular");
        let again = annotate(&reread, &config).expect("annotate output");
        prop_assert_eq!(&again.annotations, &result.annotations);
        let output_again = materialize(&again, &config);
        prop_assert_eq!(output_again.headers, output.headers);
        prop_assert_eq!(output_again.rows, output.rows);
    }
}
