//! Messages returned to the host after a run.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ProjectionError;

/// Severity of a [`Report`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportLevel {
    /// Progress and timing.
    Info,
    /// Partial failure; the run still finished.
    Warning,
    /// The run was cancelled.
    Error,
}

/// A message for the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Severity.
    pub level: ReportLevel,
    /// Human readable text.
    pub message: String,
}

impl Report {
    /// Info report.
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: ReportLevel::Info,
            message: message.into(),
        }
    }

    /// Warning report.
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: ReportLevel::Warning,
            message: message.into(),
        }
    }

    /// Error report.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: ReportLevel::Error,
            message: message.into(),
        }
    }
}

impl From<&ProjectionError> for Report {
    fn from(err: &ProjectionError) -> Self {
        Self::error(err.to_string())
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.level {
            ReportLevel::Info => "info",
            ReportLevel::Warning => "warning",
            ReportLevel::Error => "error",
        };
        write!(f, "{tag}: {}", self.message)
    }
}
