//! Diagnostics sink injected into lifecycle operations.
//!
//! Lifecycle code reports conditions it recovers from (a role that vanished,
//! a deletion that failed but was dropped from state) through this trait
//! instead of logging globally, so hosts decide where they end up.

use std::sync::{PoisonError, RwLock};

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl Diagnostic {
    pub fn warning(summary: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            summary: summary.into(),
            detail: None,
            role: None,
        }
    }

    pub fn error(summary: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            ..Self::warning(summary)
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }
}

pub trait Diagnostics: Send + Sync {
    fn report(&self, diagnostic: Diagnostic);
}

/// Forwards diagnostics to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn report(&self, diagnostic: Diagnostic) {
        let role = diagnostic.role.as_deref().unwrap_or_default();
        let detail = diagnostic.detail.as_deref().unwrap_or_default();
        match diagnostic.severity {
            Severity::Warning => tracing::warn!(role, detail, "{}", diagnostic.summary),
            Severity::Error => tracing::error!(role, detail, "{}", diagnostic.summary),
        }
    }
}

/// Keeps every diagnostic in memory (tests, and hosts that render them later).
#[derive(Debug, Default)]
pub struct CollectingDiagnostics {
    entries: RwLock<Vec<Diagnostic>>,
}

impl CollectingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<Diagnostic> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn has_errors(&self) -> bool {
        self.entries()
            .iter()
            .any(|d| d.severity == Severity::Error)
    }
}

impl Diagnostics for CollectingDiagnostics {
    fn report(&self, diagnostic: Diagnostic) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_in_order() {
        let sink = CollectingDiagnostics::new();
        sink.report(Diagnostic::warning("first").with_role("r"));
        sink.report(Diagnostic::error("second").with_detail("status 500"));

        let entries = sink.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].severity, Severity::Warning);
        assert_eq!(entries[0].role.as_deref(), Some("r"));
        assert_eq!(entries[1].detail.as_deref(), Some("status 500"));
        assert!(sink.has_errors());
    }

    #[test]
    fn serializes_without_empty_fields() {
        let value = serde_json::to_value(Diagnostic::warning("gone")).unwrap();
        assert_eq!(value, serde_json::json!({"severity": "warning", "summary": "gone"}));
    }
}
