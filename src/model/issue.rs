//! Validation issues raised while loading manifests.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Whether an issue blocks downstream use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Severity {
    Warn,
    Error,
}

/// What kind of rule an issue broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IssueKind {
    /// A required field is missing or malformed.
    Schema,

    /// Well-formed, but violates a rule about its content.
    Semantic,
}

/// One finding about one screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    /// Owning screen, or the file name when no id could be read.
    pub screen_id: String,
    pub severity: Severity,
    pub kind: IssueKind,
    pub message: String,
}

impl Issue {
    pub fn error(screen_id: impl Into<String>, kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            screen_id: screen_id.into(),
            severity: Severity::Error,
            kind,
            message: message.into(),
        }
    }

    pub fn warn(screen_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            screen_id: screen_id.into(),
            severity: Severity::Warn,
            kind: IssueKind::Semantic,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            Severity::Warn => "warn",
            Severity::Error => "error",
        };
        write!(f, "[{severity}] {}: {}", self.screen_id, self.message)
    }
}
