//! Error types for the assembler.
//!
//! Assembly-time problems (bad syntax, undefined labels, oversized
//! literals) are not represented here — they are accumulated as
//! [`crate::diagnostics::Diagnostic`]s so that a single run can report as
//! many problems as possible. This module only covers the failures that
//! abort a run outright: the ones that happen before or after assembly,
//! at the I/O boundary.

use thiserror::Error;

/// Primary error type for the assembler's CLI boundary.
#[derive(Debug, Error)]
pub enum AssemblerError {
    /// IO error opening the input or writing the output.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The source text was not valid UTF-8.
    #[error("source is not valid UTF-8: {message}")]
    InvalidEncoding {
        /// Description of the decoding failure.
        message: String,
    },
}

/// Result type alias for assembler operations.
pub type Result<T> = std::result::Result<T, AssemblerError>;
