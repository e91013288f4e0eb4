//! Structured diagnostics for preflight check outcomes.
//!
//! Mismatches and credential problems are expected results, not errors, so
//! they are carried as typed diagnostics with stable codes.

use std::fmt;

use serde::Serialize;

/// Severity of a diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// A problem that fails the check.
    Error,
    /// A potential issue that does not fail the check.
    Warning,
}

/// A structured diagnostic message from a preflight check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Severity level.
    pub severity: Severity,
    /// Stable code (e.g., `"V001"`, `"A002"`).
    pub code: &'static str,
    /// Human-readable message.
    pub message: String,
    /// Field that caused the diagnostic (e.g., `"version"`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<&'static str>,
    /// Suggested fix (actionable text).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl Diagnostic {
    /// Create a new diagnostic with the given severity, code, and message.
    #[must_use]
    pub fn new(severity: Severity, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            field: None,
            suggestion: None,
        }
    }

    /// Set the field that caused this diagnostic.
    #[must_use]
    pub fn with_field(mut self, field: &'static str) -> Self {
        self.field = Some(field);
        self
    }

    /// Set a suggested fix for this diagnostic.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Returns `true` if this diagnostic is an error.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Errors print the bare message; warnings carry a `warning: ` prefix.
impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.severity {
            Severity::Error => write!(f, "{}", self.message),
            Severity::Warning => write!(f, "warning: {}", self.message),
        }
    }
}

// ── Codes ───────────────────────────────────────────────────────────────

/// Manifest version differs from the catalog's top-level version.
pub const V001: &str = "V001";
/// Manifest version differs from the first plugin entry's version.
pub const V002: &str = "V002";
/// Manifest version is not plain `x.y.z` semver.
pub const V003: &str = "V003";

/// No API key configured in the environment or the config file.
pub const A001: &str = "A001";
/// API key does not match the expected format.
pub const A002: &str = "A002";
