use serde::Serialize;

use crate::error::ReconError;

/// In-memory string table: a header plus rows of the same width.
///
/// This is the hand-off format between whatever decoded the input (repair
/// parser, spreadsheet reader, caller code) and the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(header: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { header, rows }
    }

    /// Build from string slices. Handy for callers holding literals.
    pub fn from_rows<S: AsRef<str>>(header: &[S], rows: &[Vec<S>]) -> Self {
        Self {
            header: header.iter().map(|h| h.as_ref().to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|v| v.as_ref().to_string()).collect())
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column, ignoring surrounding whitespace in header names.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h.trim() == name)
    }

    /// Names from `required` that the header does not carry.
    pub fn missing_columns(&self, required: &[&str]) -> Vec<String> {
        required
            .iter()
            .filter(|c| self.column_index(c).is_none())
            .map(|c| c.to_string())
            .collect()
    }

    /// Cell value, empty when the row is shorter than the header.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Parse well-formed (quote-aware) CSV text. The first record is the header.
    ///
    /// Short rows are padded and long rows truncated to the header width; use the
    /// repair parser for exports whose records are broken across lines.
    pub fn from_csv_str(data: &str, delimiter: u8) -> Result<Self, ReconError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .delimiter(delimiter)
            .flexible(true)
            .from_reader(data.as_bytes());

        let header: Vec<String> = reader
            .headers()
            .map_err(|e| ReconError::Csv(e.to_string()))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let width = header.len();
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| ReconError::Csv(e.to_string()))?;
            let mut row: Vec<String> = record.iter().map(|v| v.to_string()).collect();
            row.resize(width, String::new());
            rows.push(row);
        }

        Ok(Self { header, rows })
    }
}
