//! `mbrand repair`: rebuild a broken export.

use std::io::Write;
use std::path::PathBuf;

use multibrand_io::{repair_file, RepairOptions, TextEncoding};

use crate::config::load_engine_config;
use crate::CliError;

pub fn cmd_repair(
    input: PathBuf,
    sep: Option<char>,
    encoding: Option<TextEncoding>,
    output: Option<PathBuf>,
    json_output: bool,
    config_path: Option<PathBuf>,
) -> Result<(), CliError> {
    let config = load_engine_config(config_path.as_deref())?;
    let options = RepairOptions {
        encoding,
        separator: sep,
        ..RepairOptions::from_config(&config.repair)
    };

    let repaired = repair_file(&input, &options).map_err(|e| CliError::read(&input, e))?;
    let csv_bytes = repaired.to_csv_bytes().map_err(|e| CliError::read(&input, e))?;

    if let Some(ref path) = output {
        std::fs::write(path, &csv_bytes)
            .map_err(|e| CliError::io(format!("cannot write {}: {e}", path.display())))?;
        eprintln!("wrote {}", path.display());
    } else if !json_output {
        std::io::stdout()
            .write_all(&csv_bytes)
            .map_err(|e| CliError::io(format!("cannot write to stdout: {e}")))?;
    }

    let report = &repaired.report;
    if json_output {
        let json_str = serde_json::to_string_pretty(report)
            .map_err(|e| CliError::general(format!("JSON serialization error: {e}")))?;
        println!("{json_str}");
    }

    // Human summary to stderr
    let s = &report.stats;
    let encoding = report
        .encoding
        .as_ref()
        .map(|g| g.encoding.label())
        .unwrap_or("-");
    eprintln!(
        "{}: {} line(s) in {} record(s) out ({encoding}, separator {:?}, {} column(s))",
        input.display(),
        s.total_original_lines,
        s.data_records_emitted,
        report.separator,
        report.expected_columns,
    );
    if report.is_clean() {
        eprintln!("clean: no repairs needed");
    } else {
        eprintln!(
            "repaired: {} joined, {} merged into '{}', {} padded, {} unchanged",
            s.joined_broken_records,
            s.fixed_extra_cols,
            report.text_column_used,
            s.fixed_missing_cols,
            s.unchanged,
        );
    }

    Ok(())
}
