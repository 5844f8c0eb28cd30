//! Structured error handling and exit codes.

use serde::Serialize;

use crate::selection::{ErrorKind, SelectError};

/// Exit codes for the loracat binary.
///
/// - 0: Success
/// - 1: General error (unexpected failure)
/// - 2: Selector matched no catalog entry
/// - 3: External load failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Success: the command completed.
    Success = 0,
    /// General error: An unexpected error occurred.
    GeneralError = 1,
    /// Not found: the requested model is not in the catalog.
    NotFound = 2,
    /// Load failed: the external loader rejected the model.
    LoadFailed = 3,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "LC000",
            Self::GeneralError => "LC001",
            Self::NotFound => "LC002",
            Self::LoadFailed => "LC003",
        }
    }

    /// Pick the exit code for a failed command.
    #[must_use]
    pub fn for_error(err: &anyhow::Error) -> Self {
        match err.downcast_ref::<SelectError>().map(SelectError::kind) {
            Some(ErrorKind::NotFound) => Self::NotFound,
            Some(ErrorKind::Load) => Self::LoadFailed,
            Some(ErrorKind::Catalog) | None => Self::GeneralError,
        }
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "LC001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message
    pub message: String,
    /// Remediation suggestions, possibly empty
    pub hints: Vec<String>,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: err.to_string(),
            hints: hints_for(err),
        }
    }
}

/// Remediation hints carried by `err`, if it is a [`SelectError`].
#[must_use]
pub fn hints_for(err: &anyhow::Error) -> Vec<String> {
    err.downcast_ref::<SelectError>()
        .map(|e| e.hints().iter().map(|h| (*h).to_string()).collect())
        .unwrap_or_default()
}
