//! In-band error and warning accumulation.
//!
//! Assembly errors are not Rust [`Result::Err`]s: the scanner keeps going
//! after the first one, so a single run can report every problem it can
//! find instead of stopping at the first. [`Diagnostics`] is the
//! accumulator both passes write into.

use std::fmt;

/// Severity of a recorded [`Diagnostic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// A warning. Never suppresses output.
    Warning,
    /// An error. Sets the sticky `had_error` flag and suppresses further
    /// warnings for the remainder of the run.
    Error,
}

/// A single recorded error or warning, anchored to a source position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Severity of this diagnostic.
    pub severity: Severity,
    /// 1-based line of the anchor position.
    pub line: usize,
    /// 1-based column of the anchor position.
    pub col: usize,
    /// Human-readable message, without trailing punctuation.
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.severity {
            Severity::Error => "Error",
            Severity::Warning => "Warning",
        };
        write!(
            f,
            "{} ({},{}): {}.",
            kind,
            self.line,
            self.col,
            escape_message(&self.message)
        )
    }
}

/// Escape newlines, tabs, and carriage returns so a diagnostic always
/// renders on a single line.
fn escape_message(message: &str) -> String {
    let mut out = String::with_capacity(message.len());
    for ch in message.chars() {
        match ch {
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out
}

/// Accumulates diagnostics produced during a single assembly run.
///
/// Warnings are dropped once any error has been recorded: the `had_error`
/// flag is sticky for the lifetime of the run and is never reset.
#[derive(Debug, Default)]
pub struct Diagnostics {
    records: Vec<Diagnostic>,
    had_error: bool,
}

impl Diagnostics {
    /// Create an empty diagnostics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error at `(line, col)`. Always recorded.
    pub fn error(&mut self, line: usize, col: usize, message: impl Into<String>) {
        self.had_error = true;
        self.records.push(Diagnostic {
            severity: Severity::Error,
            line,
            col,
            message: message.into(),
        });
    }

    /// Record a warning at `(line, col)`. Dropped silently if any error
    /// has already been recorded this run.
    pub fn warn(&mut self, line: usize, col: usize, message: impl Into<String>) {
        if self.had_error {
            return;
        }
        self.records.push(Diagnostic {
            severity: Severity::Warning,
            line,
            col,
            message: message.into(),
        });
    }

    /// Whether any error has been recorded so far.
    pub fn had_error(&self) -> bool {
        self.had_error
    }

    /// All diagnostics recorded so far, in recording order.
    pub fn records(&self) -> &[Diagnostic] {
        &self.records
    }
}
