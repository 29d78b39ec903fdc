// src/diagnostics.rs

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

/// One recoverable problem met while converting a component.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,
    /// EasyEDA designator (or mesh section) the problem was found in.
    pub shape_kind: String,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "{} [{}]: {}", level, self.shape_kind, self.message)
    }
}

/// Collects per-shape problems for one conversion pass.
///
/// Every entry is also forwarded to the `log` facade, so console users still
/// see what was skipped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, shape_kind: impl Into<String>, message: impl Into<String>) {
        self.push(Severity::Warning, shape_kind.into(), message.into());
    }

    pub fn error(&mut self, shape_kind: impl Into<String>, message: impl Into<String>) {
        self.push(Severity::Error, shape_kind.into(), message.into());
    }

    fn push(&mut self, severity: Severity, shape_kind: String, message: String) {
        match severity {
            Severity::Warning => log::warn!("{}: {}", shape_kind, message),
            Severity::Error => log::error!("{}: {}", shape_kind, message),
        }
        self.entries.push(Diagnostic {
            severity,
            shape_kind,
            message,
        });
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }

    /// Diagnostics raised for a given designator.
    pub fn for_kind<'a>(&'a self, shape_kind: &'a str) -> impl Iterator<Item = &'a Diagnostic> {
        self.entries.iter().filter(move |d| d.shape_kind == shape_kind)
    }
}
