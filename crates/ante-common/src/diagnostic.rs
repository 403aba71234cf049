//! A backend-agnostic diagnostic: severity, message, and locations.
//!
//! Passes never print or format; they accumulate `Diagnostic`s into a
//! `DiagnosticSink`, which the driver (out of scope) is free to render
//! however it likes. This is the "explicit diagnostic sink" called for in
//! spec section 9's Design Notes, replacing the source's exception-based
//! control flow.

use serde::Serialize;

use crate::span::Location;

/// The seven error kinds from spec section 7, plus a non-fatal `Warning`
/// severity used for redundant-match-arm reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    LexOrParse,
    Name,
    Arity,
    Unification,
    TraitResolution,
    Exhaustiveness,
    Monomorphisation,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    Error(ErrorKind),
    Warning,
}

/// A secondary annotation attached to a diagnostic (spec: "one or more
/// locations (primary + optional notes)").
#[derive(Debug, Clone, Serialize)]
pub struct Note {
    pub message: String,
    pub location: Location,
}

/// A single diagnostic: one-sentence summary, primary location, and any
/// number of supporting notes.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub summary: String,
    pub primary: Location,
    pub notes: Vec<Note>,
}

impl Diagnostic {
    pub fn error(kind: ErrorKind, summary: impl Into<String>, primary: Location) -> Self {
        Self {
            severity: Severity::Error(kind),
            summary: summary.into(),
            primary,
            notes: Vec::new(),
        }
    }

    pub fn warning(summary: impl Into<String>, primary: Location) -> Self {
        Self {
            severity: Severity::Warning,
            summary: summary.into(),
            primary,
            notes: Vec::new(),
        }
    }

    pub fn with_note(mut self, message: impl Into<String>, location: Location) -> Self {
        self.notes.push(Note { message: message.into(), location });
        self
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self.severity, Severity::Error(_))
    }
}

/// Accumulates diagnostics across a pass.
///
/// Spec section 5: "Multiple errors may be collected per pass... but each
/// pass returns a pass/fail summary." `had_errors` is that summary.
#[derive(Debug, Default)]
pub struct DiagnosticSink {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn had_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_fatal)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn extend(&mut self, other: DiagnosticSink) {
        self.diagnostics.extend(other.diagnostics);
    }
}
