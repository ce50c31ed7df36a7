//! Quote-aware reading of well-formed delimited files, such as the catalog.

use std::path::Path;

use multibrand_recon::Table;

use crate::delimiter::{detect_delimiter, DelimiterGuess};
use crate::encoding::{decode_text, EncodingGuess, TextEncoding};
use crate::error::ReadError;
use crate::repair::separator_byte;

#[derive(Debug, Clone, PartialEq)]
pub struct TableRead {
    pub table: Table,
    pub encoding: EncodingGuess,
    pub separator: char,
    /// Absent when the separator was given by the caller.
    pub separator_guess: Option<DelimiterGuess>,
}

/// Decode, detect the separator from the first line, then parse honoring
/// quotes. Rows are padded or truncated to the header width.
pub fn read_table(
    raw: &[u8],
    encoding: Option<TextEncoding>,
    separator: Option<char>,
) -> Result<TableRead, ReadError> {
    let decoded = decode_text(raw, encoding)?;
    let Some(first) = decoded.text.lines().next() else {
        return Err(ReadError::EmptyInput);
    };

    let (separator, separator_guess) = match separator {
        Some(sep) => (sep, None),
        None => {
            let guess = detect_delimiter(first);
            (guess.separator, Some(guess))
        }
    };

    let table = Table::from_csv_str(&decoded.text, separator_byte(separator)?)?;
    log::info!(
        "read {} row(s) x {} column(s) ({}, separator {separator:?})",
        table.len(),
        table.header.len(),
        decoded.guess.encoding
    );

    Ok(TableRead {
        table,
        encoding: decoded.guess,
        separator,
        separator_guess,
    })
}

pub fn read_table_file(
    path: &Path,
    encoding: Option<TextEncoding>,
    separator: Option<char>,
) -> Result<TableRead, ReadError> {
    let raw = std::fs::read(path)?;
    read_table(&raw, encoding, separator)
}
