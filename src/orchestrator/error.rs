//! Terminal orchestration failures.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::diagnostics::Diagnostics;

/// What end users are told whenever generation fails, whatever the cause.
pub const USER_FACING_MESSAGE: &str =
    "The coach is temporarily unavailable. Please try again in a little while.";

/// Machine-readable failure kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NoBackends,
    AllFailed,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoBackends => "no_backends",
            Self::AllFailed => "all_failed",
        }
    }
}

/// The only errors that leave an orchestration run.
///
/// Individual backend failures never surface here directly; they are in
/// the attached diagnostics.
#[derive(Debug, Error)]
pub enum OrchestrationError {
    /// Configuration problem: the registry returned no enabled backends.
    #[error("no model backends are configured or enabled")]
    NoBackends { diagnostics: Diagnostics },

    /// Every candidate was skipped or failed.
    #[error("all model backends failed ({} attempt(s))", .diagnostics.len())]
    AllFailed { diagnostics: Diagnostics },
}

impl OrchestrationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoBackends { .. } => ErrorKind::NoBackends,
            Self::AllFailed { .. } => ErrorKind::AllFailed,
        }
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        match self {
            Self::NoBackends { diagnostics } | Self::AllFailed { diagnostics } => diagnostics,
        }
    }

    pub fn into_diagnostics(self) -> Diagnostics {
        match self {
            Self::NoBackends { diagnostics } | Self::AllFailed { diagnostics } => diagnostics,
        }
    }

    /// Generic text safe to show end users.
    pub fn user_message(&self) -> &'static str {
        USER_FACING_MESSAGE
    }
}
