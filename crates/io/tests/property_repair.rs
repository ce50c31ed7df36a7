// Property-based tests for the repair parser.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use multibrand_io::{repair_bytes, repair_lines, FixAction, RepairOptions, RepairOutput};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn config_256() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

fn text_columns() -> Vec<String> {
    RepairOptions::default().text_columns
}

fn repair(lines: &[String]) -> RepairOutput {
    let refs: Vec<&str> = lines.iter().map(|l| l.as_str()).collect();
    repair_lines(&refs, '|', &text_columns()).unwrap()
}

fn joined_lines(out: &RepairOutput) -> usize {
    out.report
        .fixes
        .iter()
        .map(|f| match f.action {
            FixAction::JoinedContinuationLines { joined_lines_count } => joined_lines_count,
            _ => 0,
        })
        .sum()
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

fn arb_header(width: usize) -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec(r"[A-Za-z]{1,8}", width)
}

/// Non-empty field without separators or quotes.
fn arb_field() -> impl Strategy<Value = String> {
    r"[a-z0-9][a-z0-9 ,.]{0,5}"
}

/// Field that may be empty.
fn arb_loose_field() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => r"[a-z0-9][a-z0-9 ,.]{0,5}",
        1 => Just(String::new()),
    ]
}

/// A well-formed table of `2..=6` columns.
fn arb_table() -> impl Strategy<Value = (Vec<String>, Vec<Vec<String>>)> {
    (2usize..=6).prop_flat_map(|width| {
        (
            arb_header(width),
            proptest::collection::vec(proptest::collection::vec(arb_loose_field(), width), 0..20),
        )
    })
}

/// Records of `2..=6` fields; each is optionally wrapped after field `k`
/// (the continuation line then starts with the separator).
fn arb_wrapped() -> impl Strategy<Value = (Vec<String>, Vec<(Vec<String>, Option<usize>)>)> {
    (2usize..=6).prop_flat_map(|width| {
        let record = (
            proptest::collection::vec(arb_field(), width),
            proptest::option::of(1..width),
        );
        (arb_header(width), proptest::collection::vec(record, 0..20))
    })
}

/// Arbitrary lines, continuation-looking or not.
fn arb_lines() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec(r"[a-c|]{0,12}", 1..30)
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]

    /// Every data line is either the start of an emitted record or a joined
    /// continuation; nothing is dropped.
    #[test]
    fn no_line_is_lost(lines in arb_lines()) {
        let out = repair(&lines);
        let stats = &out.report.stats;
        prop_assert_eq!(stats.data_records_emitted, out.table.rows.len());
        prop_assert_eq!(stats.data_records_emitted + joined_lines(&out), lines.len() - 1);
        prop_assert_eq!(stats.total_original_lines, lines.len());
    }

    #[test]
    fn every_row_has_header_width(lines in arb_lines()) {
        let out = repair(&lines);
        let width = out.report.expected_columns;
        prop_assert_eq!(width, lines[0].split('|').count());
        for row in &out.table.rows {
            prop_assert_eq!(row.len(), width);
        }
    }

    #[test]
    fn stats_partition_records(lines in arb_lines()) {
        let out = repair(&lines);
        let s = &out.report.stats;
        // A record is reshaped at most once; joined records may also be reshaped
        prop_assert!(s.fixed_extra_cols + s.fixed_missing_cols + s.unchanged <= s.data_records_emitted);
        prop_assert!(s.unchanged + s.joined_broken_records <= s.data_records_emitted);
    }

    #[test]
    fn wrapped_records_are_rebuilt((header, records) in arb_wrapped()) {
        let mut lines = vec![header.join("|")];
        for (fields, wrap_at) in &records {
            match wrap_at {
                Some(k) => {
                    lines.push(fields[..*k].join("|"));
                    lines.push(format!("|{}", fields[*k..].join("|")));
                }
                None => lines.push(fields.join("|")),
            }
        }

        let out = repair(&lines);
        let expected: Vec<Vec<String>> = records.iter().map(|(f, _)| f.clone()).collect();
        prop_assert_eq!(&out.table.rows, &expected);

        let wrapped = records.iter().filter(|(_, w)| w.is_some()).count();
        prop_assert_eq!(out.report.stats.joined_broken_records, wrapped);
        prop_assert_eq!(out.report.stats.unchanged, records.len() - wrapped);
        prop_assert_eq!(out.report.stats.fixed_extra_cols, 0);
        prop_assert_eq!(out.report.stats.fixed_missing_cols, 0);
    }

    #[test]
    fn well_formed_table_is_unchanged((header, rows) in arb_table()) {
        let mut lines = vec![header.join("|")];
        lines.extend(rows.iter().map(|r| r.join("|")));

        let out = repair(&lines);
        prop_assert!(out.report.fixes.is_empty());
        prop_assert_eq!(out.report.stats.unchanged, rows.len());
        prop_assert_eq!(&out.table.header, &header);
        prop_assert_eq!(&out.table.rows, &rows);
    }

    #[test]
    fn repairing_output_again_changes_nothing((header, rows) in arb_table()) {
        let mut text = header.join("|");
        for r in &rows {
            text.push('\n');
            text.push_str(&r.join("|"));
        }
        let first = repair_bytes(text.as_bytes(), &RepairOptions {
            separator: Some('|'),
            ..RepairOptions::default()
        }).unwrap();
        let bytes = first.to_csv_bytes().unwrap();

        let second = repair_bytes(&bytes, &RepairOptions {
            separator: Some('|'),
            ..RepairOptions::default()
        }).unwrap();
        prop_assert!(second.report.fixes.is_empty());
        prop_assert_eq!(&second.table, &first.table);
    }
}
