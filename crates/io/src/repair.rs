//! Repair of delimited exports whose records were wrapped across lines or
//! carry the wrong number of fields.
//!
//! Splitting is naive (quotes are not interpreted): the broken exporters this
//! targets do not quote. Every logical record in the input comes out as
//! exactly one row of header width; nothing is skipped.

use std::path::Path;

use multibrand_recon::config::RepairConfig;
use multibrand_recon::Table;
use serde::Serialize;

use crate::delimiter::{detect_delimiter, DelimiterGuess};
use crate::encoding::{decode_text, split_lines, EncodingGuess, TextEncoding};
use crate::error::ReadError;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Overrides for the heuristics. `None` means detect.
#[derive(Debug, Clone, PartialEq)]
pub struct RepairOptions {
    pub encoding: Option<TextEncoding>,
    pub separator: Option<char>,
    /// Header names (case-insensitive, priority order) for the column that
    /// absorbs surplus fields.
    pub text_columns: Vec<String>,
}

impl Default for RepairOptions {
    fn default() -> Self {
        Self::from_config(&RepairConfig::default())
    }
}

impl RepairOptions {
    pub fn from_config(config: &RepairConfig) -> Self {
        Self {
            encoding: None,
            separator: None,
            text_columns: config.text_columns.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum FixAction {
    /// Continuation lines (starting with the separator) appended to the record.
    JoinedContinuationLines { joined_lines_count: usize },
    /// Surplus fields folded back into the text column.
    MergedExtraColumns {
        column: String,
        original_col_count: usize,
        final_col_count: usize,
    },
    /// Short record padded with empty fields.
    PaddedMissingColumns {
        original_col_count: usize,
        final_col_count: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepairFix {
    /// 1-based source line span of the record.
    pub line_number_start: usize,
    pub line_number_end: usize,
    #[serde(flatten)]
    pub action: FixAction,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RepairStats {
    pub total_original_lines: usize,
    pub data_records_emitted: usize,
    pub joined_broken_records: usize,
    pub fixed_extra_cols: usize,
    pub fixed_missing_cols: usize,
    /// Records that needed no fix of any kind.
    pub unchanged: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepairReport {
    /// Absent when the input was already text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding: Option<EncodingGuess>,
    pub separator: char,
    /// Absent when the separator was given by the caller.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub separator_guess: Option<DelimiterGuess>,
    pub expected_columns: usize,
    pub header: Vec<String>,
    pub text_column_used: String,
    pub fixes: Vec<RepairFix>,
    pub stats: RepairStats,
}

impl RepairReport {
    pub fn is_clean(&self) -> bool {
        self.fixes.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RepairOutput {
    pub table: Table,
    pub report: RepairReport,
}

impl RepairOutput {
    /// The repaired table as CSV: detected separator, quotes only where
    /// needed, `\n` line ends, UTF-8 without BOM.
    pub fn to_csv_bytes(&self) -> Result<Vec<u8>, ReadError> {
        let delimiter = separator_byte(self.report.separator)?;
        let mut writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .quote_style(csv::QuoteStyle::Necessary)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());

        writer.write_record(&self.table.header)?;
        for row in &self.table.rows {
            writer.write_record(row)?;
        }
        writer.into_inner().map_err(|e| ReadError::Csv(e.to_string()))
    }
}

pub(crate) fn separator_byte(separator: char) -> Result<u8, ReadError> {
    if separator.is_ascii() {
        Ok(separator as u8)
    } else {
        Err(ReadError::InvalidSeparator(separator))
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Decode raw bytes, detect the separator and repair.
pub fn repair_bytes(raw: &[u8], options: &RepairOptions) -> Result<RepairOutput, ReadError> {
    let decoded = decode_text(raw, options.encoding)?;
    let mut output = repair_text(&decoded.text, options)?;
    output.report.encoding = Some(decoded.guess);
    Ok(output)
}

/// Read a file and repair it.
pub fn repair_file(path: &Path, options: &RepairOptions) -> Result<RepairOutput, ReadError> {
    let raw = std::fs::read(path)?;
    log::info!("repairing {} ({} byte(s))", path.display(), raw.len());
    repair_bytes(&raw, options)
}

/// Repair already-decoded text. `options.encoding` is ignored.
pub fn repair_text(text: &str, options: &RepairOptions) -> Result<RepairOutput, ReadError> {
    let lines = split_lines(text);
    let Some(first) = lines.first() else {
        return Err(ReadError::EmptyInput);
    };

    let (separator, guess) = match options.separator {
        Some(sep) => (sep, None),
        None => {
            let guess = detect_delimiter(first);
            (guess.separator, Some(guess))
        }
    };

    let mut output = repair_lines(&lines, separator, &options.text_columns)?;
    output.report.separator_guess = guess;
    Ok(output)
}

/// Index of the first header matching a candidate name (trimmed,
/// case-insensitive), trying candidates in order. Falls back to column 0.
pub fn find_text_column(header: &[String], candidates: &[String]) -> usize {
    let lowered: Vec<String> = header.iter().map(|h| h.trim().to_lowercase()).collect();
    candidates
        .iter()
        .map(|c| c.trim().to_lowercase())
        .find_map(|c| lowered.iter().position(|h| *h == c))
        .unwrap_or(0)
}

/// Repair a line sequence whose first line is the header.
pub fn repair_lines(
    lines: &[&str],
    separator: char,
    text_columns: &[String],
) -> Result<RepairOutput, ReadError> {
    let Some(header_line) = lines.first() else {
        return Err(ReadError::EmptyInput);
    };

    let header: Vec<String> = header_line.split(separator).map(|h| h.trim().to_string()).collect();
    let expected = header.len();
    let text_idx = find_text_column(&header, text_columns);
    let text_column = header[text_idx].clone();
    let sep = separator.to_string();

    let mut stats = RepairStats {
        total_original_lines: lines.len(),
        ..RepairStats::default()
    };
    let mut fixes = Vec::new();
    let mut rows = Vec::with_capacity(lines.len().saturating_sub(1));

    let mut i = 1;
    while i < lines.len() {
        let start = i + 1;
        let mut buf = lines[i].to_string();
        let mut count = buf.split(separator).count();

        // Continuation lines carry their own leading separator
        let mut joined = 0;
        while count < expected && i + 1 < lines.len() && lines[i + 1].starts_with(separator) {
            buf.push_str(lines[i + 1]);
            i += 1;
            joined += 1;
            count = buf.split(separator).count();
        }
        let end = i + 1;

        if joined > 0 {
            stats.joined_broken_records += 1;
            log::debug!("lines {start}-{end}: joined {joined} continuation line(s)");
            fixes.push(RepairFix {
                line_number_start: start,
                line_number_end: end,
                action: FixAction::JoinedContinuationLines { joined_lines_count: joined },
            });
        }

        let parts: Vec<&str> = buf.split(separator).collect();
        let row: Vec<String> = if parts.len() > expected {
            let extra = parts.len() - expected;
            let merge_end = text_idx + 1 + extra;
            let mut row: Vec<String> = parts[..text_idx].iter().map(|p| p.to_string()).collect();
            row.push(parts[text_idx..merge_end].join(&sep));
            row.extend(parts[merge_end..].iter().map(|p| p.to_string()));
            row.resize(expected, String::new());

            stats.fixed_extra_cols += 1;
            log::debug!(
                "lines {start}-{end}: {} field(s), merged {extra} into '{text_column}'",
                parts.len()
            );
            fixes.push(RepairFix {
                line_number_start: start,
                line_number_end: end,
                action: FixAction::MergedExtraColumns {
                    column: text_column.clone(),
                    original_col_count: parts.len(),
                    final_col_count: row.len(),
                },
            });
            row
        } else if parts.len() < expected {
            let mut row: Vec<String> = parts.iter().map(|p| p.to_string()).collect();
            row.resize(expected, String::new());

            stats.fixed_missing_cols += 1;
            log::debug!("lines {start}-{end}: {} field(s), padded to {expected}", parts.len());
            fixes.push(RepairFix {
                line_number_start: start,
                line_number_end: end,
                action: FixAction::PaddedMissingColumns {
                    original_col_count: parts.len(),
                    final_col_count: row.len(),
                },
            });
            row
        } else {
            if joined == 0 {
                stats.unchanged += 1;
            }
            parts.iter().map(|p| p.to_string()).collect()
        };

        rows.push(row);
        stats.data_records_emitted += 1;
        i += 1;
    }

    log::info!(
        "repair: {} line(s) -> {} record(s); {} joined, {} merged, {} padded, {} unchanged",
        stats.total_original_lines,
        stats.data_records_emitted,
        stats.joined_broken_records,
        stats.fixed_extra_cols,
        stats.fixed_missing_cols,
        stats.unchanged
    );

    Ok(RepairOutput {
        table: Table::new(header.clone(), rows),
        report: RepairReport {
            encoding: None,
            separator,
            separator_guess: None,
            expected_columns: expected,
            header,
            text_column_used: text_column,
            fixes,
            stats,
        },
    })
}
