//! # Error Taxonomy & Reporting
//!
//! Logical failure categories shared across every component, plus the
//! reportable envelope renderers use to surface a failure to the user.

use serde::{Deserialize, Serialize};

/// Logical error category. Not a concrete error type: every component's
/// `thiserror` enum maps down to one of these for reporting and exit-code
/// decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Credential rejection.
    Auth,
    /// Connectivity, DNS, TLS, timeout.
    Network,
    /// Referenced org/project/repo absent.
    NotFound,
    /// Provider throttling signal.
    RateLimited,
    /// Malformed query or configuration.
    Validation,
    /// Pull could not fast-forward.
    MergeConflict,
    /// Permission denied, disk full, corrupt checkout.
    LocalFilesystem,
    /// Catch-all for unrecognized Git exit codes.
    SubprocessFailed,
    /// User interrupt.
    Cancelled,
    /// Invariant violation inside the core.
    Internal,
}

impl ErrorKind {
    /// Exit code a CLI should use when this is the *only* kind of failure
    /// present. Orchestrators still apply their own aggregate rules (e.g.
    /// "exit 1 iff any repository failure").
    pub fn suggested_exit_code(&self) -> i32 {
        match self {
            ErrorKind::Validation => 2,
            ErrorKind::Cancelled => 130,
            ErrorKind::Internal => 3,
            _ => 1,
        }
    }
}

/// A failure surfaced to a reporter: kind, human message, and the
/// repository/provider it relates to when applicable, plus an optional
/// debug payload (subprocess stderr tail, HTTP status).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportableError {
    pub kind: ErrorKind,
    pub message: String,
    pub repository: Option<String>,
    pub provider: Option<String>,
    /// Subprocess stderr tail, HTTP status, or other reproduction context.
    pub debug: Option<String>,
}

impl ReportableError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            repository: None,
            provider: None,
            debug: None,
        }
    }

    pub fn with_repository(mut self, repository: impl Into<String>) -> Self {
        self.repository = Some(repository.into());
        self
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    pub fn with_debug(mut self, debug: impl Into<String>) -> Self {
        self.debug = Some(debug.into());
        self
    }
}

impl std::fmt::Display for ReportableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
