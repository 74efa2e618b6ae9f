//! Batch-level results: summaries, decisions, and the remediation record.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::scorecard::{Dimension, ScreenScorecard, Status};

/// Counts across every screen in a batch for one cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub total: usize,
    pub pass: usize,
    pub needs_review: usize,
    pub fail: usize,

    /// Screens with a failure in a critical dimension.
    pub critical_failures: usize,

    /// Set once the remediation policy has been applied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decision: Option<Decision>,
}

impl BatchSummary {
    /// Fraction of screens that passed. An empty batch counts as fully passing.
    pub fn pass_rate(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        self.pass as f64 / self.total as f64
    }

    /// Fraction of screens that need review. Zero for an empty batch.
    pub fn needs_review_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.needs_review as f64 / self.total as f64
    }
}

/// What the controller decided after a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Decision {
    Accept,
    Retry,
    Exhausted,
}

/// One line of the remediation history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleRecord {
    pub run_id: Uuid,
    pub cycle: u32,
    pub summary: BatchSummary,
    pub scorecards: Vec<ScreenScorecard>,
    pub recorded_at: Timestamp,
}

/// A screen that did not pass, handed to the fixer or to human review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenFailure {
    pub screen_id: String,
    pub overall: Status,
    pub critical: bool,
    pub findings: Vec<Finding>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    pub dimension: Dimension,
    pub status: Status,
}

impl ScreenFailure {
    /// Build a failure entry from a scorecard, or `None` if the screen passed.
    pub fn from_scorecard(card: &ScreenScorecard) -> Option<Self> {
        if card.overall == Status::Pass {
            return None;
        }
        Some(Self {
            screen_id: card.screen_id.clone(),
            overall: card.overall,
            critical: card.is_critical_failure(),
            findings: card
                .findings()
                .into_iter()
                .map(|(dimension, status)| Finding { dimension, status })
                .collect(),
        })
    }
}

/// The per-screen failure report for one cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureReport {
    pub cycle: u32,
    pub summary: BatchSummary,
    pub screens: Vec<ScreenFailure>,
}

impl FailureReport {
    pub fn new(cycle: u32, summary: BatchSummary, scorecards: &[ScreenScorecard]) -> Self {
        Self {
            cycle,
            summary,
            screens: scorecards
                .iter()
                .filter_map(ScreenFailure::from_scorecard)
                .collect(),
        }
    }
}
