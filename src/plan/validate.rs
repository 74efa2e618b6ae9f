//! Plan validation: re-check a stored plan against the current manifests.
//!
//! Every rule is checked and every violation reported, so a drifted plan
//! can be repaired in one pass. The only exception is cycles: the first
//! one found is reported and the rest are not enumerated.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::model::{Complexity, ExecutionPlan, ScreenManifest};

use super::{build::canonical_order, graph::find_cycle};

/// A single broken plan rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "rule", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum PlanViolation {
    #[error("screen {screen_id} has a manifest but is missing from the plan")]
    MissingScreen { screen_id: String },

    #[error("plan screen {screen_id} has no manifest")]
    UnknownScreen { screen_id: String },

    #[error("screen {screen_id} appears {occurrences} times in the plan")]
    DuplicateScreen {
        screen_id: String,
        occurrences: usize,
    },

    #[error("screen {screen_id} depends on itself")]
    SelfDependency { screen_id: String },

    #[error("screen {screen_id} depends on unknown screen {dependency}")]
    DanglingDependency {
        screen_id: String,
        dependency: String,
    },

    #[error("screen {screen_id} lists dependency {dependency} more than once")]
    DuplicateDependency {
        screen_id: String,
        dependency: String,
    },

    #[error("dependency cycle: {}", .cycle.join(" -> "))]
    Cycle { cycle: Vec<String> },

    #[error("screen {screen_id} route is '{plan}' in the plan but '{manifest}' in its manifest")]
    RouteMismatch {
        screen_id: String,
        plan: String,
        manifest: String,
    },

    #[error(
        "screen {screen_id} complexity is {} in the plan but {} in its manifest",
        .plan.as_str(),
        .manifest.as_str()
    )]
    ComplexityMismatch {
        screen_id: String,
        plan: Complexity,
        manifest: Complexity,
    },

    #[error("stored plan cannot be read: {message}")]
    Unreadable { message: String },

    #[error("plan order differs from the canonical order")]
    OrderMismatch {
        expected: Vec<String>,
        actual: Vec<String>,
    },
}

impl PlanViolation {
    /// Broad class of the violation: `graph`, `consistency` or `ordering`.
    pub fn class(&self) -> &'static str {
        match self {
            Self::MissingScreen { .. }
            | Self::UnknownScreen { .. }
            | Self::DuplicateScreen { .. }
            | Self::SelfDependency { .. }
            | Self::DanglingDependency { .. }
            | Self::DuplicateDependency { .. }
            | Self::Cycle { .. } => "graph",
            Self::RouteMismatch { .. }
            | Self::ComplexityMismatch { .. }
            | Self::Unreadable { .. } => "consistency",
            Self::OrderMismatch { .. } => "ordering",
        }
    }
}

/// The result of validating a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanValidation {
    pub valid: bool,
    pub expected_order: Vec<String>,
    pub actual_order: Vec<String>,
    pub errors: Vec<PlanViolation>,
}

/// Validate `plan` against `manifests`.
pub fn validate(plan: &ExecutionPlan, manifests: &[ScreenManifest]) -> PlanValidation {
    let mut errors = Vec::new();

    let by_id: HashMap<&str, &ScreenManifest> = manifests
        .iter()
        .map(|m| (m.screen_id.as_str(), m))
        .collect();

    let mut occurrences: HashMap<&str, usize> = HashMap::new();
    for entry in &plan.screens {
        *occurrences.entry(entry.screen_id.as_str()).or_default() += 1;
    }

    // Coverage.
    for m in manifests {
        if !occurrences.contains_key(m.screen_id.as_str()) {
            errors.push(PlanViolation::MissingScreen {
                screen_id: m.screen_id.clone(),
            });
        }
    }

    let mut checked = HashSet::new();
    for entry in &plan.screens {
        let id = entry.screen_id.as_str();
        if !checked.insert(id) {
            continue;
        }

        let count = occurrences.get(id).copied().unwrap_or_default();
        if count > 1 {
            errors.push(PlanViolation::DuplicateScreen {
                screen_id: id.to_string(),
                occurrences: count,
            });
        }

        match by_id.get(id) {
            None => errors.push(PlanViolation::UnknownScreen {
                screen_id: id.to_string(),
            }),
            Some(m) => {
                if entry.route != m.route {
                    errors.push(PlanViolation::RouteMismatch {
                        screen_id: id.to_string(),
                        plan: entry.route.clone(),
                        manifest: m.route.clone(),
                    });
                }
                if entry.complexity != m.complexity {
                    errors.push(PlanViolation::ComplexityMismatch {
                        screen_id: id.to_string(),
                        plan: entry.complexity,
                        manifest: m.complexity,
                    });
                }
            }
        }
    }

    // Dependencies.
    for entry in &plan.screens {
        let mut listed = HashSet::new();
        for dep in &entry.dependencies {
            if !listed.insert(dep.as_str()) {
                errors.push(PlanViolation::DuplicateDependency {
                    screen_id: entry.screen_id.clone(),
                    dependency: dep.clone(),
                });
                continue;
            }
            if *dep == entry.screen_id {
                errors.push(PlanViolation::SelfDependency {
                    screen_id: entry.screen_id.clone(),
                });
            } else if !occurrences.contains_key(dep.as_str()) {
                errors.push(PlanViolation::DanglingDependency {
                    screen_id: entry.screen_id.clone(),
                    dependency: dep.clone(),
                });
            }
        }
    }

    if let Some(cycle) = find_cycle(
        plan.screens
            .iter()
            .map(|e| (e.screen_id.as_str(), e.dependencies.as_slice())),
    ) {
        errors.push(PlanViolation::Cycle { cycle });
    }

    // Ordering.
    let expected_order = canonical_order(&plan.screens);
    let actual_order = plan.order();
    if expected_order != actual_order {
        errors.push(PlanViolation::OrderMismatch {
            expected: expected_order.clone(),
            actual: actual_order.clone(),
        });
    }

    if !errors.is_empty() {
        tracing::warn!(violations = errors.len(), "execution plan is invalid");
    }

    PlanValidation {
        valid: errors.is_empty(),
        expected_order,
        actual_order,
        errors,
    }
}
