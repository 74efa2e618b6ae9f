//! Report storage: JSON reports written under `reports/`.

use std::path::PathBuf;

use serde::Serialize;

use super::{Result, Storage, json_err, write_file};

/// The reports a batch produces, one file each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Report {
    Validation,
    Scorecards,
    BatchSummary,
    FailureReport,
    Exceptions,
}

impl Report {
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Validation => "validation-report.json",
            Self::Scorecards => "scorecards.json",
            Self::BatchSummary => "batch-summary.json",
            Self::FailureReport => "failure-report.json",
            Self::Exceptions => "exceptions.json",
        }
    }
}

impl Storage {
    pub fn report_path(&self, report: Report) -> PathBuf {
        self.reports_dir().join(report.file_name())
    }

    /// Writes a report as pretty JSON, replacing any previous version.
    /// Returns the path written.
    pub fn write_report<T: Serialize>(&self, report: Report, value: &T) -> Result<PathBuf> {
        let path = self.report_path(report);
        let mut json = serde_json::to_string_pretty(value).map_err(json_err(&path))?;
        json.push('\n');
        write_file(&path, &json)?;
        Ok(path)
    }
}
