//! Execution plans: build the canonical order, validate stored plans.
//!
//! The builder runs once per batch. Every later run validates the stored
//! plan against the current manifests instead of rebuilding it, so drift is
//! reported rather than silently absorbed.

mod build;
mod graph;
mod route;
mod validate;

pub use build::build;
pub use route::route_matches;
pub use validate::{PlanValidation, PlanViolation, validate};

use sha2::{Digest, Sha256};

use crate::model::ExecutionPlan;

/// Errors that prevent a plan from being built.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error("dependency cycle: {}", .cycle.join(" -> "))]
    Cycle { cycle: Vec<String> },

    #[error("duplicate screenId: {0}")]
    DuplicateScreen(String),
}

impl From<PlanError> for PlanViolation {
    fn from(error: PlanError) -> Self {
        match error {
            PlanError::Cycle { cycle } => Self::Cycle { cycle },
            PlanError::DuplicateScreen(screen_id) => Self::DuplicateScreen {
                screen_id,
                occurrences: 2,
            },
        }
    }
}

/// The canonical serialized form of a plan, as written to disk.
pub fn render(plan: &ExecutionPlan) -> serde_json::Result<String> {
    let mut json = serde_json::to_string_pretty(plan)?;
    json.push('\n');
    Ok(json)
}

/// Hex SHA-256 of the canonical serialized form.
///
/// Equal fingerprints across runs mean the plan has not drifted.
pub fn fingerprint(plan: &ExecutionPlan) -> serde_json::Result<String> {
    let digest = Sha256::digest(render(plan)?.as_bytes());
    Ok(hex::encode(digest))
}
