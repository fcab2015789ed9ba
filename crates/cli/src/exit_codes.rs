//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract: batch scripts that chain
//! jobs rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain           | Description                              |
//! |---------|------------------|------------------------------------------|
//! | 0       | Universal        | Success                                  |
//! | 1       | Universal        | General error (unspecified)              |
//! | 2       | Universal        | CLI usage error (bad args, missing file) |
//! | 3-9     | job              | Job run codes                            |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

use padron_io::IoError;
use padron_recon::ReconError;

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing job file.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Job (3-9)
// =============================================================================

/// Inconsistencies found and `--strict` was given.
/// Like `diff(1)`, exit 1 means "rosters differ."
pub const EXIT_JOB_INCONSISTENT: u8 = 1;

/// Job file does not parse or fails validation.
pub const EXIT_JOB_INVALID_CONFIG: u8 = 3;

/// Input file not found, unreadable, or missing the requested sheet.
pub const EXIT_JOB_INPUT: u8 = 4;

/// A mapped column is not in the input headers.
pub const EXIT_JOB_MISSING_COLUMN: u8 = 5;

/// An output file could not be written.
pub const EXIT_JOB_OUTPUT: u8 = 6;

// =============================================================================
// Error mapping
// =============================================================================

/// Map an engine error to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::ConfigParse(_)
        | ReconError::ConfigValidation(_)
        | ReconError::UnknownRole(_)
        | ReconError::ModeMismatch { .. } => EXIT_JOB_INVALID_CONFIG,
        ReconError::MissingColumn { .. } => EXIT_JOB_MISSING_COLUMN,
        ReconError::MissingInput(_) => EXIT_JOB_INPUT,
    }
}

/// Map a file I/O error to its exit code.
pub fn io_exit_code(err: &IoError) -> u8 {
    match err {
        IoError::NotFound { .. } | IoError::Read { .. } | IoError::Sheet { .. } | IoError::Unsupported(_) => {
            EXIT_JOB_INPUT
        }
        IoError::Write { .. } => EXIT_JOB_OUTPUT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn job_codes_are_distinct() {
        let codes = [
            EXIT_SUCCESS,
            EXIT_ERROR,
            EXIT_USAGE,
            EXIT_JOB_INVALID_CONFIG,
            EXIT_JOB_INPUT,
            EXIT_JOB_MISSING_COLUMN,
            EXIT_JOB_OUTPUT,
        ];
        let mut sorted = codes.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), codes.len());
    }

    #[test]
    fn error_mapping() {
        assert_eq!(recon_exit_code(&ReconError::ConfigParse("x".into())), EXIT_JOB_INVALID_CONFIG);
        assert_eq!(
            recon_exit_code(&ReconError::MissingColumn { role: "a".into(), column: "b".into() }),
            EXIT_JOB_MISSING_COLUMN
        );
        assert_eq!(
            io_exit_code(&IoError::Write { path: PathBuf::from("x"), message: String::new() }),
            EXIT_JOB_OUTPUT
        );
        assert_eq!(io_exit_code(&IoError::Unsupported(PathBuf::from("x.pdf"))), EXIT_JOB_INPUT);
    }
}
