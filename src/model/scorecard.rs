//! Scorecards: per-screen, per-dimension verdicts.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Verdict for one dimension or one screen.
///
/// Ordered by severity: `Pass < NeedsReview < Fail`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Pass,
    NeedsReview,
    Fail,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pass => "PASS",
            Self::NeedsReview => "NEEDS_REVIEW",
            Self::Fail => "FAIL",
        })
    }
}

/// The six verification dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Dimension {
    VisualFidelity,
    StructuralParity,
    FunctionalParity,
    UiStateCoverage,
    AccessibilityBaseline,
    PerformanceGuardrail,
}

impl Dimension {
    /// A failure here is too risky to defer.
    ///
    /// Visual drift and missing UI states are excluded.
    pub fn is_critical(self) -> bool {
        matches!(
            self,
            Self::StructuralParity
                | Self::FunctionalParity
                | Self::AccessibilityBaseline
                | Self::PerformanceGuardrail
        )
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::VisualFidelity => "visualFidelity",
            Self::StructuralParity => "structuralParity",
            Self::FunctionalParity => "functionalParity",
            Self::UiStateCoverage => "uiStateCoverage",
            Self::AccessibilityBaseline => "accessibilityBaseline",
            Self::PerformanceGuardrail => "performanceGuardrail",
        })
    }
}

/// One screen's verdict for one remediation cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenScorecard {
    pub screen_id: String,
    pub overall: Status,
    pub dimensions: Dimensions,
}

impl ScreenScorecard {
    /// Any critical dimension failed.
    pub fn is_critical_failure(&self) -> bool {
        self.dimensions
            .statuses()
            .iter()
            .any(|(d, s)| d.is_critical() && *s == Status::Fail)
    }

    /// Dimensions that did not pass, worst first.
    pub fn findings(&self) -> Vec<(Dimension, Status)> {
        let mut findings: Vec<_> = self
            .dimensions
            .statuses()
            .into_iter()
            .filter(|(_, s)| *s != Status::Pass)
            .collect();
        findings.sort_by(|a, b| b.1.cmp(&a.1));
        findings
    }
}

/// Per-dimension results, each with the raw measurement behind it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dimensions {
    pub visual_fidelity: VisualScore,
    pub structural_parity: StructuralScore,
    pub functional_parity: FunctionalScore,
    pub ui_state_coverage: UiStateScore,
    pub accessibility_baseline: AccessibilityScore,
    pub performance_guardrail: PerformanceScore,
}

impl Dimensions {
    pub fn statuses(&self) -> [(Dimension, Status); 6] {
        [
            (Dimension::VisualFidelity, self.visual_fidelity.status),
            (Dimension::StructuralParity, self.structural_parity.status),
            (Dimension::FunctionalParity, self.functional_parity.status),
            (Dimension::UiStateCoverage, self.ui_state_coverage.status),
            (
                Dimension::AccessibilityBaseline,
                self.accessibility_baseline.status,
            ),
            (
                Dimension::PerformanceGuardrail,
                self.performance_guardrail.status,
            ),
        ]
    }

    /// Worst status across all dimensions.
    pub fn overall(&self) -> Status {
        self.statuses()
            .into_iter()
            .map(|(_, s)| s)
            .max()
            .unwrap_or(Status::Pass)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualScore {
    pub status: Status,
    pub worst_diff_percent: Option<f64>,
    pub dimension_mismatch: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuralScore {
    pub status: Status,

    /// Summed across captures; wider than a single capture's count.
    pub critical_deltas: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionalScore {
    pub status: Status,
    pub passed: Option<u32>,
    pub failed: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiStateScore {
    pub status: Status,
    pub captured: Option<u32>,
    pub declared: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessibilityScore {
    pub status: Status,
    pub critical_violations: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceScore {
    pub status: Status,
    pub load_time_ms: Option<u64>,
    pub largest_script_kb: Option<u64>,
}
