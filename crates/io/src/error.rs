use std::fmt;

use multibrand_recon::ReconError;

use crate::encoding::TextEncoding;

#[derive(Debug, Clone, PartialEq)]
pub enum ReadError {
    /// Input has no lines at all.
    EmptyInput,
    /// No encoding in the list decoded the bytes.
    UnreadableText { tried: Vec<TextEncoding> },
    /// Separator that cannot be written as a single byte.
    InvalidSeparator(char),
    /// File could not be read.
    Io(String),
    /// Quote-aware CSV reading or writing failed.
    Csv(String),
    Recon(ReconError),
}

impl fmt::Display for ReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyInput => write!(f, "input is empty"),
            Self::UnreadableText { tried } => {
                let names: Vec<&str> = tried.iter().map(|e| e.label()).collect();
                write!(f, "cannot decode input as text (tried: {})", names.join(", "))
            }
            Self::InvalidSeparator(c) => {
                write!(f, "separator {c:?} is not a single-byte character")
            }
            Self::Io(msg) => write!(f, "I/O error: {msg}"),
            Self::Csv(msg) => write!(f, "CSV error: {msg}"),
            Self::Recon(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ReadError {}

impl From<ReconError> for ReadError {
    fn from(e: ReconError) -> Self {
        Self::Recon(e)
    }
}

impl From<csv::Error> for ReadError {
    fn from(e: csv::Error) -> Self {
        Self::Csv(e.to_string())
    }
}

impl From<std::io::Error> for ReadError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}
