//! Validation findings and their accumulation.
//!
//! Rules never abort a run; they push [`Diagnostic`]s into a [`Report`]. The
//! report decides stream routing and the process exit status: any
//! error-severity finding fails the run, warnings never do.

use std::fmt;
use std::io::{self, Write};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

impl Severity {
    fn tag(self) -> &'static str {
        match self {
            Severity::Error => "ERROR",
            Severity::Warning => "WARN",
        }
    }
}

/// Where a finding came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// The descriptor (or index) could not be read or parsed.
    Parse,
    /// Missing required field, closed-set violation, duplicate id, stale
    /// index reference, schema violation.
    Structural,
    /// Usable but incomplete or stylistically off.
    Advisory,
}

impl DiagnosticKind {
    pub fn severity(self) -> Severity {
        match self {
            DiagnosticKind::Parse | DiagnosticKind::Structural => Severity::Error,
            DiagnosticKind::Advisory => Severity::Warning,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Path relative to the catalog directory.
    pub file: String,
    pub message: String,
}

impl Diagnostic {
    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "  {:<6} {}: {}",
            self.severity().tag(),
            self.file,
            self.message
        )
    }
}

/// Accumulator for one validation run.
#[derive(Clone, Debug, Default)]
pub struct Report {
    diagnostics: Vec<Diagnostic>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: DiagnosticKind, file: impl Into<String>, message: impl Into<String>) {
        let diagnostic = Diagnostic {
            kind,
            file: file.into(),
            message: message.into(),
        };
        tracing::trace!(%diagnostic, "recorded");
        self.diagnostics.push(diagnostic);
    }

    pub fn parse_error(&mut self, file: impl Into<String>, message: impl Into<String>) {
        self.push(DiagnosticKind::Parse, file, message);
    }

    pub fn error(&mut self, file: impl Into<String>, message: impl Into<String>) {
        self.push(DiagnosticKind::Structural, file, message);
    }

    pub fn warn(&mut self, file: impl Into<String>, message: impl Into<String>) {
        self.push(DiagnosticKind::Advisory, file, message);
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity() == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity() == Severity::Warning)
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    pub fn is_success(&self) -> bool {
        self.error_count() == 0
    }

    pub fn exit_code(&self) -> i32 {
        if self.is_success() { 0 } else { 1 }
    }

    /// Findings for a single file, in the order they were recorded.
    pub fn for_file<'a>(&'a self, file: &'a str) -> impl Iterator<Item = &'a Diagnostic> + 'a {
        self.diagnostics.iter().filter(move |d| d.file == file)
    }

    /// Write every finding, one line each, in recording order.
    pub fn write_diagnostics(&self, out: &mut impl Write) -> io::Result<()> {
        for diagnostic in &self.diagnostics {
            writeln!(out, "{diagnostic}")?;
        }
        Ok(())
    }

    pub fn write_summary(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(
            out,
            "Results: {} errors, {} warnings",
            self.error_count(),
            self.warning_count()
        )
    }
}
