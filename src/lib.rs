//! Two-pass assembler for a small stack-machine ISA with a 16-bit
//! address space.
//!
//! The source text is scanned once to fix every label's address and
//! record every macro body (pass 1), then scanned again from a fresh
//! cursor to emit the ROM and resolve every reference (pass 2). Problems
//! found along the way — a missing label, an oversized literal, an
//! unterminated comment — are accumulated as [`Diagnostic`]s rather than
//! aborting the run, so a single invocation reports as much as it can.
//!
//! # Quick start
//!
//! ```rust
//! use uxntal_asm::assemble;
//!
//! let output = assemble("|0100 #01 #02 ADD BRK");
//! assert!(!output.diagnostics.had_error());
//! assert_eq!(output.code, vec![0x80, 0x01, 0x80, 0x02, 0x18, 0x00]);
//! ```

pub mod diagnostics;
pub mod error;
pub mod memory;
pub mod opcodes;
pub mod program;
pub mod scanner;
pub mod symbols;

use std::path::Path;

pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use error::{AssemblerError, Result};
use program::Program;

/// The result of assembling one source text.
#[derive(Debug)]
pub struct AssembleOutput {
    /// The assembled ROM, in emission order.
    pub code: Vec<u8>,
    /// Every error and warning recorded during assembly.
    pub diagnostics: Diagnostics,
    /// Number of distinct labels (main and sub) declared.
    pub label_count: usize,
    /// Number of distinct macros declared.
    pub macro_count: usize,
}

/// Assemble `source`, an already-decoded UTF-8 text.
///
/// Never fails: assembly problems are reported through
/// [`AssembleOutput::diagnostics`], not as a `Result`. Whether the
/// resulting [`AssembleOutput::code`] is fit to write out is
/// `!diagnostics.had_error()`.
pub fn assemble(source: &str) -> AssembleOutput {
    let (code, diagnostics, label_count, macro_count) = Program::new(source.as_bytes()).run();
    AssembleOutput {
        code,
        diagnostics,
        label_count,
        macro_count,
    }
}

/// Assemble raw bytes, validating that they decode as UTF-8 first.
///
/// Returns [`AssemblerError::InvalidEncoding`] if `data` is not valid
/// UTF-8; otherwise behaves exactly as [`assemble`].
pub fn assemble_bytes(data: &[u8]) -> Result<AssembleOutput> {
    let source = std::str::from_utf8(data).map_err(|e| AssemblerError::InvalidEncoding {
        message: e.to_string(),
    })?;
    Ok(assemble(source))
}

/// Read `path` and assemble its contents.
///
/// Returns [`AssemblerError::Io`] if the file cannot be read, or
/// [`AssemblerError::InvalidEncoding`] if it is not valid UTF-8.
pub fn assemble_file<P: AsRef<Path>>(path: P) -> Result<AssembleOutput> {
    let data = std::fs::read(path)?;
    assemble_bytes(&data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assemble_reports_no_errors_for_valid_source() {
        let output = assemble("|0100 #01 #02 ADD BRK");
        assert!(!output.diagnostics.had_error());
        assert_eq!(output.code, vec![0x80, 0x01, 0x80, 0x02, 0x18, 0x00]);
    }

    #[test]
    fn test_assemble_bytes_rejects_invalid_utf8() {
        let invalid = vec![0xff, 0xfe, 0xfd];
        let err = assemble_bytes(&invalid).unwrap_err();
        assert!(matches!(err, AssemblerError::InvalidEncoding { .. }));
    }

    #[test]
    fn test_assemble_file_reads_and_assembles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prog.tal");
        std::fs::write(&path, "|0100 BRK").unwrap();
        let output = assemble_file(&path).unwrap();
        assert!(!output.diagnostics.had_error());
        assert_eq!(output.code, vec![0x00]);
    }

    #[test]
    fn test_assemble_file_missing_is_io_error() {
        let err = assemble_file("/nonexistent/path/does-not-exist.tal").unwrap_err();
        assert!(matches!(err, AssemblerError::Io(_)));
    }
}
