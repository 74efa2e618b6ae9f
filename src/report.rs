//! The validation report: every manifest issue and the plan verdict, in one file.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::manifest::ManifestLoad;
use crate::model::Issue;
use crate::plan::{PlanValidation, PlanViolation};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub generated_at: Timestamp,
    pub total_screens: usize,
    pub total_issues: usize,
    pub total_errors: usize,

    /// Absent when manifest errors stopped the run before the plan stage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_plan: Option<PlanSection>,

    pub issues: Vec<Issue>,
}

/// The plan half of the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSection {
    pub valid: bool,

    /// Whether the plan was built on this run rather than loaded.
    pub built: bool,

    /// Hex SHA-256 of the stored plan.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,

    pub expected_order: Vec<String>,
    pub actual_order: Vec<String>,
    pub errors: Vec<PlanViolation>,
}

impl PlanSection {
    pub fn from_validation(
        validation: PlanValidation,
        built: bool,
        fingerprint: Option<String>,
    ) -> Self {
        Self {
            valid: validation.valid,
            built,
            fingerprint,
            expected_order: validation.expected_order,
            actual_order: validation.actual_order,
            errors: validation.errors,
        }
    }

    /// A plan that could not be built at all.
    pub fn unbuildable(error: PlanViolation) -> Self {
        Self {
            valid: false,
            built: false,
            fingerprint: None,
            expected_order: Vec::new(),
            actual_order: Vec::new(),
            errors: vec![error],
        }
    }
}

impl ValidationReport {
    pub fn new(load: &ManifestLoad, execution_plan: Option<PlanSection>) -> Self {
        Self {
            generated_at: Timestamp::now(),
            total_screens: load.manifests.len(),
            total_issues: load.issues.len(),
            total_errors: load.error_count(),
            execution_plan,
            issues: load.issues.clone(),
        }
    }

    /// Whether anything in the report blocks downstream use.
    pub fn is_blocking(&self) -> bool {
        self.total_errors > 0 || self.execution_plan.as_ref().is_some_and(|p| !p.valid)
    }
}
