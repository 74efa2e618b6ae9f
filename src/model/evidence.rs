//! Evidence: raw per-dimension measurements from the capture stage.
//!
//! Every part is optional. A missing part is not an error; the scorer
//! degrades that dimension to needs-review.

use serde::{Deserialize, Serialize};

/// Everything the capture stage measured for one screen in one cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenEvidence {
    pub screen_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visual: Option<VisualEvidence>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structural: Option<StructuralEvidence>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub functional: Option<FunctionalEvidence>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ui_states: Option<UiStateEvidence>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accessibility: Option<AccessibilityEvidence>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance: Option<PerformanceEvidence>,
}

impl ScreenEvidence {
    /// Evidence with nothing measured.
    pub fn absent(screen_id: impl Into<String>) -> Self {
        Self {
            screen_id: screen_id.into(),
            ..Self::default()
        }
    }
}

/// Screenshot comparisons, one per breakpoint or state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualEvidence {
    #[serde(default)]
    pub captures: Vec<VisualCapture>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualCapture {
    pub name: String,

    /// Percentage of differing pixels, 0..=100.
    pub diff_percent: f64,

    /// The compared images had different dimensions.
    #[serde(default)]
    pub dimension_mismatch: bool,
}

/// Structural (DOM/component tree) comparisons.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuralEvidence {
    #[serde(default)]
    pub captures: Vec<StructuralCapture>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuralCapture {
    pub name: String,
    pub critical_deltas: u32,
}

/// E2E interaction-contract check results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionalEvidence {
    #[serde(default)]
    pub passed: u32,
    #[serde(default)]
    pub failed: u32,
}

/// UI states observed during capture.
///
/// `declared` is taken from the manifest when scoring a batch; the
/// capture stage only reports what it saw.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiStateEvidence {
    pub captured: u32,
    #[serde(default)]
    pub declared: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessibilityEvidence {
    pub critical_violations: u32,
}

/// Either measurement may be missing independently.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceEvidence {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_time_ms: Option<u64>,

    /// Size of the largest script payload, in KB.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub largest_script_kb: Option<u64>,
}
