//! Scoring: turn one screen's raw evidence into a scorecard.
//!
//! Each dimension is judged independently. Missing evidence is
//! inconclusive: it yields needs-review, never pass and never fail.
//! The overall verdict is the worst dimension.

use std::collections::HashMap;

use rayon::prelude::*;

use crate::config::Thresholds;
use crate::model::{
    AccessibilityEvidence, AccessibilityScore, Dimensions, FunctionalEvidence, FunctionalScore,
    PerformanceEvidence, PerformanceScore, ScreenEvidence, ScreenManifest, ScreenScorecard, Status,
    StructuralEvidence, StructuralScore, UiStateEvidence, UiStateScore, VisualEvidence,
    VisualScore,
};

/// Scores evidence against a fixed set of thresholds.
#[derive(Debug, Clone, Copy)]
pub struct ScoreAggregator {
    thresholds: Thresholds,
}

impl ScoreAggregator {
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    /// Score one screen.
    pub fn score(&self, screen_id: &str, evidence: &ScreenEvidence) -> ScreenScorecard {
        let dimensions = Dimensions {
            visual_fidelity: self.visual(evidence.visual.as_ref()),
            structural_parity: structural(evidence.structural.as_ref()),
            functional_parity: functional(evidence.functional.as_ref()),
            ui_state_coverage: ui_states(evidence.ui_states.as_ref()),
            accessibility_baseline: accessibility(evidence.accessibility.as_ref()),
            performance_guardrail: self.performance(evidence.performance.as_ref()),
        };
        ScreenScorecard {
            screen_id: screen_id.to_string(),
            overall: dimensions.overall(),
            dimensions,
        }
    }

    /// Score every screen in a batch, in manifest order.
    ///
    /// Screens are scored in parallel. A screen with no evidence file scores
    /// needs-review across the board. The declared UI-state count always
    /// comes from the manifest.
    pub fn score_batch(
        &self,
        manifests: &[ScreenManifest],
        evidence: &HashMap<String, ScreenEvidence>,
    ) -> Vec<ScreenScorecard> {
        manifests
            .par_iter()
            .map(|m| {
                let mut screen = evidence
                    .get(&m.screen_id)
                    .cloned()
                    .unwrap_or_else(|| ScreenEvidence::absent(&m.screen_id));
                if let Some(states) = screen.ui_states.as_mut() {
                    states.declared = u32::try_from(m.ui_states.len()).unwrap_or(u32::MAX);
                }
                self.score(&m.screen_id, &screen)
            })
            .collect()
    }

    fn visual(&self, evidence: Option<&VisualEvidence>) -> VisualScore {
        let captures = evidence.map(|e| e.captures.as_slice()).unwrap_or_default();
        let worst = captures
            .iter()
            .map(|c| c.diff_percent)
            .fold(None, |acc: Option<f64>, d| Some(acc.map_or(d, |a| a.max(d))));
        let dimension_mismatch = captures.iter().any(|c| c.dimension_mismatch);

        let status = match worst {
            None => Status::NeedsReview,
            Some(_) if dimension_mismatch => Status::Fail,
            Some(d) if d < self.thresholds.visual_pass_below => Status::Pass,
            Some(d) if d <= self.thresholds.visual_review_up_to => Status::NeedsReview,
            Some(_) => Status::Fail,
        };

        VisualScore {
            status,
            worst_diff_percent: worst,
            dimension_mismatch,
        }
    }

    fn performance(&self, evidence: Option<&PerformanceEvidence>) -> PerformanceScore {
        let load_time_ms = evidence.and_then(|e| e.load_time_ms);
        let largest_script_kb = evidence.and_then(|e| e.largest_script_kb);

        let over_load = load_time_ms.is_some_and(|t| t > self.thresholds.max_load_time_ms);
        let over_script =
            largest_script_kb.is_some_and(|kb| kb > self.thresholds.max_script_kb);

        let status = if over_load || over_script {
            Status::Fail
        } else if load_time_ms.is_some() && largest_script_kb.is_some() {
            Status::Pass
        } else {
            Status::NeedsReview
        };

        PerformanceScore {
            status,
            load_time_ms,
            largest_script_kb,
        }
    }
}

fn structural(evidence: Option<&StructuralEvidence>) -> StructuralScore {
    let captures = evidence.map(|e| e.captures.as_slice()).unwrap_or_default();
    if captures.is_empty() {
        return StructuralScore {
            status: Status::NeedsReview,
            critical_deltas: None,
        };
    }
    let deltas: u64 = captures.iter().map(|c| u64::from(c.critical_deltas)).sum();
    StructuralScore {
        status: if deltas == 0 { Status::Pass } else { Status::Fail },
        critical_deltas: Some(deltas),
    }
}

fn functional(evidence: Option<&FunctionalEvidence>) -> FunctionalScore {
    let Some(&FunctionalEvidence { passed, failed }) = evidence else {
        return FunctionalScore {
            status: Status::NeedsReview,
            passed: None,
            failed: None,
        };
    };
    let status = if failed > 0 {
        Status::Fail
    } else if passed > 0 {
        Status::Pass
    } else {
        Status::NeedsReview
    };
    FunctionalScore {
        status,
        passed: Some(passed),
        failed: Some(failed),
    }
}

fn ui_states(evidence: Option<&UiStateEvidence>) -> UiStateScore {
    let Some(&UiStateEvidence { captured, declared }) = evidence else {
        return UiStateScore {
            status: Status::NeedsReview,
            captured: None,
            declared: None,
        };
    };
    UiStateScore {
        status: if captured >= declared {
            Status::Pass
        } else {
            Status::Fail
        },
        captured: Some(captured),
        declared: Some(declared),
    }
}

fn accessibility(evidence: Option<&AccessibilityEvidence>) -> AccessibilityScore {
    let critical_violations = evidence.map(|e| e.critical_violations);
    AccessibilityScore {
        status: match critical_violations {
            None => Status::NeedsReview,
            Some(0) => Status::Pass,
            Some(_) => Status::Fail,
        },
        critical_violations,
    }
}
