//! CLI Exit Code Registry
//!
//! This is the single source of truth for all `mbrand` exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain      | Description                                   |
//! |---------|-------------|-----------------------------------------------|
//! | 0       | Universal   | Success                                       |
//! | 1       | Universal   | General error (unspecified)                   |
//! | 2       | Universal   | CLI usage error (bad args)                    |
//! | 3       | Universal   | I/O error (cannot read or write a file)       |
//! | 10-19   | run         | Config and input validation                   |
//!
//! Data-quality warnings never change the exit code.

use multibrand_io::ReadError;
use multibrand_recon::ReconError;

// =============================================================================
// Universal (0-3)
// =============================================================================

/// Success - command completed, possibly with warnings.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments (e.g. an unknown encoding name).
pub const EXIT_USAGE: u8 = 2;

/// Cannot read an input file or write an output file.
pub const EXIT_IO: u8 = 3;

// =============================================================================
// Run (10-19)
// =============================================================================

/// Config file failed to parse or validate.
pub const EXIT_INVALID_CONFIG: u8 = 10;

/// Input failed validation: missing required columns, undecodable text,
/// empty file.
pub const EXIT_VALIDATION: u8 = 11;

/// Map an engine error to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => EXIT_INVALID_CONFIG,
        ReconError::MissingColumns { .. } | ReconError::Csv(_) => EXIT_VALIDATION,
    }
}

/// Map an ingestion error to its exit code.
pub fn read_exit_code(err: &ReadError) -> u8 {
    match err {
        ReadError::Io(_) => EXIT_IO,
        ReadError::InvalidSeparator(_) => EXIT_USAGE,
        ReadError::EmptyInput | ReadError::UnreadableText { .. } | ReadError::Csv(_) => EXIT_VALIDATION,
        ReadError::Recon(e) => recon_exit_code(e),
    }
}
