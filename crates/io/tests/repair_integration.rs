use std::path::PathBuf;

use multibrand_io::{
    read_table_file, repair_bytes, repair_file, FixAction, RepairOptions, TextEncoding,
};
use multibrand_recon::model::{MatchReason, WarningKind};
use multibrand_recon::{run, EngineConfig, Table};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

// -------------------------------------------------------------------------
// Repair
// -------------------------------------------------------------------------

#[test]
fn mixed_breakage_scenario() {
    let raw = b"Setor|NomeProduto|ValorPraticado\n1|2|3\n1|2\n1|2|3|4\n1\n|2|3\n";
    let out = repair_bytes(raw, &RepairOptions::default()).unwrap();
    let report = &out.report;

    assert_eq!(report.separator, '|');
    assert_eq!(report.expected_columns, 3);
    assert_eq!(report.text_column_used, "NomeProduto");

    assert_eq!(
        out.table.rows,
        vec![
            vec!["1", "2", "3"],
            vec!["1", "2", ""],
            vec!["1", "2|3", "4"],
            vec!["1", "2", "3"],
        ]
    );
    assert!(out.table.rows.iter().all(|r| r.len() == 3));

    let actions: Vec<&FixAction> = report.fixes.iter().map(|f| &f.action).collect();
    assert!(matches!(actions[0], FixAction::PaddedMissingColumns { .. }));
    assert!(matches!(actions[1], FixAction::MergedExtraColumns { .. }));
    assert!(matches!(actions[2], FixAction::JoinedContinuationLines { joined_lines_count: 1 }));
    assert_eq!(report.fixes[2].line_number_start, 5);
    assert_eq!(report.fixes[2].line_number_end, 6);

    assert_eq!(report.stats.total_original_lines, 6);
    assert_eq!(report.stats.data_records_emitted, 4);
    assert_eq!(report.stats.unchanged, 1);
    assert_eq!(report.stats.fixed_missing_cols, 1);
    assert_eq!(report.stats.fixed_extra_cols, 1);
    assert_eq!(report.stats.joined_broken_records, 1);
}

#[test]
fn repaired_csv_rereads_at_full_width() {
    let out = repair_file(&fixtures_dir().join("broken-sales.csv"), &RepairOptions::default()).unwrap();
    let bytes = out.to_csv_bytes().unwrap();
    assert!(!bytes.starts_with(b"\xEF\xBB\xBF"));

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'|')
        .has_headers(true)
        .from_reader(bytes.as_slice());
    let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(records.len(), 4);
    assert!(records.iter().all(|r| r.len() == 9));
    assert_eq!(&records[2][5], "Perfume|Floral 100ml");
    assert_eq!(&records[1][6], "Venda");
}

#[test]
fn fixture_report() {
    let out = repair_file(&fixtures_dir().join("broken-sales.csv"), &RepairOptions::default()).unwrap();
    let stats = &out.report.stats;
    assert_eq!(stats.total_original_lines, 6);
    assert_eq!(stats.data_records_emitted, 4);
    assert_eq!(stats.joined_broken_records, 1);
    assert_eq!(stats.fixed_extra_cols, 1);
    assert_eq!(stats.fixed_missing_cols, 1);
    assert_eq!(stats.unchanged, 1);
    assert_eq!(out.report.encoding.as_ref().unwrap().encoding, TextEncoding::Utf8);
}

#[test]
fn windows_1252_export() {
    let raw = b"Setor;NomeProduto;Valor\r\nNorte;Sab\xE3o;1,00\r\nSul;Cora\xE7\xE3o;2,00;extra\r\n";
    let out = repair_bytes(raw, &RepairOptions::default()).unwrap();
    assert_eq!(out.report.encoding.as_ref().unwrap().encoding, TextEncoding::Windows1252);
    assert_eq!(out.table.rows[0], vec!["Norte", "Sabão", "1,00"]);
    assert_eq!(out.table.rows[1], vec!["Sul", "Coração;2,00", "extra"]);
}

#[test]
fn custom_text_columns() {
    let options = RepairOptions {
        text_columns: vec!["Obs".into()],
        ..RepairOptions::default()
    };
    let out = repair_bytes(b"Id|Obs|Valor\n1|a|b|9\n", &options).unwrap();
    assert_eq!(out.report.text_column_used, "Obs");
    assert_eq!(out.table.rows[0], vec!["1", "a|b", "9"]);
}

// -------------------------------------------------------------------------
// Into the engine
// -------------------------------------------------------------------------

fn catalog() -> Table {
    read_table_file(&fixtures_dir().join("catalog.csv"), None, None).unwrap().table
}

#[test]
fn repaired_export_feeds_the_engine() {
    let sales = repair_file(&fixtures_dir().join("broken-sales.csv"), &RepairOptions::default())
        .unwrap()
        .table;
    let result = run(&EngineConfig::default(), &catalog(), &sales).unwrap();

    assert_eq!(result.meta.sales_rows, 4);
    assert_eq!(result.enriched[0].match_reason, MatchReason::ExactMatch);
    assert_eq!(result.enriched[0].resolved_name, "Batom Matte; 3,5g");
    // 5-digit sales code is never shortened to hit the 4-digit catalog code
    assert_eq!(result.enriched[1].match_reason, MatchReason::NotFound);
    assert_eq!(result.enriched[2].row.product_name, "Perfume|Floral 100ml");
    assert_eq!(result.enriched[2].resolved_brand, "oBoticário");

    assert_eq!(result.overall.active_customers, 4);
    assert_eq!(result.overall.multi_brand_customers, 0);
    assert_eq!(result.audit.len(), 2);

    // The padded row has no amount
    assert!(result.warnings.iter().any(|w| w.kind == WarningKind::UnparseableNumber));
    assert!(result.warnings.iter().any(|w| w.kind == WarningKind::MissingOptionalColumn));
}
