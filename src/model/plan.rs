//! Execution plan types: the ordered, dependency-annotated screen sequence.

use serde::{Deserialize, Serialize};

use super::manifest::Complexity;

/// Current plan format version.
pub const PLAN_VERSION: u32 = 1;

/// The ordering rules every canonical plan is sorted by, most significant first.
pub const ORDERING_RULES: [&str; 4] = [
    "phase: foundation < standard < guided",
    "complexity: low < medium < high",
    "dependency count: ascending",
    "screenId: lexicographic",
];

/// The deterministic processing order for one batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionPlan {
    pub plan_version: u32,
    pub ordering_rules: Vec<String>,
    pub screens: Vec<PlanEntry>,
}

impl ExecutionPlan {
    /// Screen ids in plan order.
    pub fn order(&self) -> Vec<String> {
        self.screens.iter().map(|e| e.screen_id.clone()).collect()
    }
}

/// One screen's slot in the plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanEntry {
    pub screen_id: String,
    pub route: String,
    pub complexity: Complexity,
    pub phase: Phase,

    /// 1-based position in the canonical order.
    pub priority: u32,

    /// Screens that must be processed before this one.
    #[serde(default)]
    pub dependencies: Vec<String>,
}

impl PlanEntry {
    /// The canonical sort key: `(phase, complexity, |dependencies|, screenId)`.
    pub fn sort_key(&self) -> (u8, u8, usize, &str) {
        (
            self.phase.rank(),
            self.complexity.rank(),
            self.dependencies.len(),
            &self.screen_id,
        )
    }
}

/// Processing phase.
///
/// `Guided` screens get the most scrutiny; `Foundation` screens are the
/// dependency-free, low-complexity ones processed first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Foundation,
    Standard,
    Guided,
}

impl Phase {
    /// Sort rank: foundation < standard < guided.
    pub fn rank(self) -> u8 {
        match self {
            Self::Foundation => 0,
            Self::Standard => 1,
            Self::Guided => 2,
        }
    }

    /// Derive the phase for a screen from its complexity and dependency count.
    pub fn derive(complexity: Complexity, dependency_count: usize) -> Self {
        match complexity {
            Complexity::High => Self::Guided,
            Complexity::Low if dependency_count == 0 => Self::Foundation,
            _ => Self::Standard,
        }
    }
}
