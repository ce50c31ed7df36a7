//! `multibrand-io` — Byte-level ingestion of sales and catalog exports.
//!
//! Decodes raw bytes by trial ([`encoding`]), guesses the field separator
//! ([`delimiter`]), and rebuilds broken exports into full-width tables
//! ([`repair`]). Well-formed files go through the quote-aware reader
//! ([`read`]). Output is a [`multibrand_recon::Table`].

pub mod delimiter;
pub mod encoding;
pub mod error;
pub mod read;
pub mod repair;

pub use delimiter::{detect_delimiter, DelimiterGuess};
pub use encoding::{decode_text, sniff_encoding, Confidence, EncodingGuess, TextEncoding};
pub use error::ReadError;
pub use read::{read_table, read_table_file, TableRead};
pub use repair::{
    repair_bytes, repair_file, repair_lines, repair_text, FixAction, RepairFix, RepairOptions,
    RepairOutput, RepairReport, RepairStats,
};
