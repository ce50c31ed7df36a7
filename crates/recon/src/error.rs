use std::fmt;

use crate::model::TableKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (bad ratio, empty sentinel, etc.).
    ConfigValidation(String),
    /// Required columns missing from an input table.
    MissingColumns { table: TableKind, columns: Vec<String> },
    /// Malformed CSV while loading a table.
    Csv(String),
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::MissingColumns { table, columns } => {
                write!(f, "{table}: missing required column(s): {}", columns.join(", "))
            }
            Self::Csv(msg) => write!(f, "CSV error: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}
