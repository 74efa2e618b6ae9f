//! Core data model for gauge.
//!
//! These types are the records exchanged with the outside world:
//! manifests in, evidence in, plans, scorecards, summaries and reports out.

mod evidence;
mod issue;
mod manifest;
mod plan;
mod scorecard;
mod summary;

pub use evidence::{
    AccessibilityEvidence, FunctionalEvidence, PerformanceEvidence, ScreenEvidence,
    StructuralCapture, StructuralEvidence, UiStateEvidence, VisualCapture, VisualEvidence,
};
pub use issue::{Issue, IssueKind, Severity};
pub use manifest::{Complexity, Confidence, InteractiveContract, RenderModel, ScreenManifest};
pub use plan::{ExecutionPlan, ORDERING_RULES, PLAN_VERSION, Phase, PlanEntry};
pub use scorecard::{
    AccessibilityScore, Dimension, Dimensions, FunctionalScore, PerformanceScore, ScreenScorecard,
    Status, StructuralScore, UiStateScore, VisualScore,
};
pub use summary::{BatchSummary, CycleRecord, Decision, FailureReport, Finding, ScreenFailure};
