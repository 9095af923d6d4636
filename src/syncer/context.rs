use crate::position::{Path, PathPart};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A non-fatal data problem found while serializing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub message: String,
    pub path: Path,
    pub severity: Severity,
}

/// Carries the current [`Path`] and collects diagnostics during one read.
///
/// Syncers that descend (attribute, child, children, content) push their part
/// and leave it; object fields and list items restore the path when they end.
#[derive(Debug, Clone, Default)]
pub struct SyncContext {
    path: Path,
    diagnostics: Vec<Diagnostic>,
}

/// The value read by a syncer plus the problems found on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncResult<T> {
    pub value: T,
    pub diagnostics: Vec<Diagnostic>,
}

impl SyncContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn enter(&mut self, part: PathPart) {
        self.path.push(part);
    }

    /// Run `f` and restore the path to its current depth afterwards.
    pub fn scoped<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let depth = self.path.len();
        let result = f(self);
        self.path.truncate(depth);
        result
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.report(Severity::Error, message.into());
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.report(Severity::Warning, message.into());
    }

    fn report(&mut self, severity: Severity, message: String) {
        self.diagnostics.push(Diagnostic {
            message,
            path: self.path.clone(),
            severity,
        });
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn finish<T>(self, value: T) -> SyncResult<T> {
        SyncResult {
            value,
            diagnostics: self.diagnostics,
        }
    }
}
