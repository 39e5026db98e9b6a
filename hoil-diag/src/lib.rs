//! Diagnostics sink shared by every compiler phase.
//!
//! The sink records the first error only: later reports are dropped so that an early failure
//! in the lexer or parser is never masked by a cascade of downstream errors. This mirrors the
//! "first error wins" discipline the interpreter crate applies to its own `RuntimeError`: a
//! single, well-typed value describes what went wrong instead of a stack of causes.

use std::fmt;

/// The maximum length, in bytes, of a formatted diagnostic message.
///
/// Longer messages are truncated so that a pathological input (for example a single absurdly
/// long identifier) cannot make diagnostic output unbounded.
pub const MAX_MESSAGE_LEN: usize = 1024;

/// Coarse classification of a diagnostic, matching the process exit taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum DiagnosticCode {
    /// Source could not be read, or no source was ever set.
    #[error("I/O error")]
    Io,
    /// A token sequence does not match the grammar.
    #[error("syntax error")]
    Syntax,
    /// A name is undefined, redefined, or used in an invalid context.
    #[error("semantic error")]
    Semantic,
    /// Two values or declarations have incompatible types.
    #[error("type error")]
    Type,
    /// A compiler invariant was violated (register exhaustion, builder misuse, ...).
    #[error("internal error")]
    Internal,
    /// An allocation failed; the only code a caller may recover from locally.
    #[error("memory error")]
    Memory,
}

/// A source location borrowed from the long-lived source buffer.
///
/// `filename` is never owned here: callers that print a [`Diagnostic`] must do so before the
/// backing source buffer is freed, per the spec's borrowing discipline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location<'a> {
    pub line: u32,
    pub column: u32,
    pub filename: &'a str,
}

impl<'a> Location<'a> {
    pub fn new(line: u32, column: u32, filename: &'a str) -> Self {
        Self { line, column, filename }
    }
}

impl fmt::Display for Location<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.filename, self.line, self.column)
    }
}

/// One recorded diagnostic: a code, a bounded message, and an optional location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    code: DiagnosticCode,
    message: String,
    location: Option<(u32, u32, String)>,
}

impl Diagnostic {
    pub fn code(&self) -> DiagnosticCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn location(&self) -> Option<Location<'_>> {
        self.location
            .as_ref()
            .map(|(line, column, filename)| Location::new(*line, *column, filename))
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(loc) = self.location() {
            write!(f, "{loc}: error: {}", self.message)
        } else {
            write!(f, "error: {}", self.message)
        }
    }
}

/// The first-error sink. Not `Sync`; each compiler invocation owns one.
#[derive(Debug, Default)]
pub struct Diagnostics {
    first: Option<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self { first: None }
    }

    /// Record an error at `location`. Ignored if an error was already recorded.
    pub fn report(&mut self, code: DiagnosticCode, message: impl Into<String>, location: Location<'_>) {
        self.report_inner(code, message, Some((location.line, location.column, location.filename.to_string())));
    }

    /// Record an error with no associated location (for example, a missing input file).
    pub fn report_no_location(&mut self, code: DiagnosticCode, message: impl Into<String>) {
        self.report_inner(code, message, None);
    }

    fn report_inner(&mut self, code: DiagnosticCode, message: impl Into<String>, location: Option<(u32, u32, String)>) {
        if self.first.is_some() {
            return;
        }
        let mut message = message.into();
        if message.len() > MAX_MESSAGE_LEN {
            message.truncate(MAX_MESSAGE_LEN);
        }
        tracing::debug!(code = ?code, %message, "diagnostic recorded");
        self.first = Some(Diagnostic { code, message, location });
    }

    pub fn has_error(&self) -> bool {
        self.first.is_some()
    }

    pub fn code(&self) -> Option<DiagnosticCode> {
        self.first.as_ref().map(Diagnostic::code)
    }

    pub fn message(&self) -> Option<&str> {
        self.first.as_ref().map(Diagnostic::message)
    }

    pub fn location(&self) -> Option<Location<'_>> {
        self.first.as_ref().and_then(Diagnostic::location)
    }

    pub fn first(&self) -> Option<&Diagnostic> {
        self.first.as_ref()
    }

    pub fn clear(&mut self) {
        self.first = None;
    }
}
