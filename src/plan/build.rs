//! Plan construction: derive dependencies, assign phases, sort canonically.

use std::collections::{BTreeSet, HashSet};

use crate::model::{ExecutionPlan, ORDERING_RULES, PLAN_VERSION, Phase, PlanEntry, ScreenManifest};

use super::{PlanError, graph::find_cycle, route::route_matches};

/// Build the canonical execution plan for a validated manifest set.
///
/// Screen B depends on screen A when one of B's contracts navigates to a
/// route matching A's. The result is a pure function of the manifest set:
/// input order does not affect the output.
pub fn build(manifests: &[ScreenManifest]) -> Result<ExecutionPlan, PlanError> {
    let mut seen = HashSet::new();
    for m in manifests {
        if !seen.insert(m.screen_id.as_str()) {
            return Err(PlanError::DuplicateScreen(m.screen_id.clone()));
        }
    }

    let mut entries: Vec<PlanEntry> = manifests
        .iter()
        .map(|m| {
            let dependencies = derive_dependencies(m, manifests);
            PlanEntry {
                screen_id: m.screen_id.clone(),
                route: m.route.clone(),
                complexity: m.complexity,
                phase: Phase::derive(m.complexity, dependencies.len()),
                priority: 0,
                dependencies,
            }
        })
        .collect();

    sort_canonical(&mut entries);

    if let Some(cycle) = find_cycle(
        entries
            .iter()
            .map(|e| (e.screen_id.as_str(), e.dependencies.as_slice())),
    ) {
        return Err(PlanError::Cycle { cycle });
    }

    for (i, entry) in entries.iter_mut().enumerate() {
        entry.priority = u32::try_from(i + 1).unwrap_or(u32::MAX);
    }

    tracing::info!(screens = entries.len(), "built execution plan");

    Ok(ExecutionPlan {
        plan_version: PLAN_VERSION,
        ordering_rules: ORDERING_RULES.iter().map(|r| (*r).to_string()).collect(),
        screens: entries,
    })
}

/// Screen ids of `entries` in canonical order.
pub fn canonical_order(entries: &[PlanEntry]) -> Vec<String> {
    let mut sorted: Vec<&PlanEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
    sorted.into_iter().map(|e| e.screen_id.clone()).collect()
}

fn sort_canonical(entries: &mut [PlanEntry]) {
    entries.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
}

/// Sorted, de-duplicated ids of the screens `screen` navigates to.
fn derive_dependencies(screen: &ScreenManifest, manifests: &[ScreenManifest]) -> Vec<String> {
    let deps: BTreeSet<&str> = manifests
        .iter()
        .filter(|other| other.screen_id != screen.screen_id)
        .filter(|other| {
            screen
                .navigation_targets()
                .any(|target| route_matches(&other.route, target))
        })
        .map(|other| other.screen_id.as_str())
        .collect();
    deps.into_iter().map(String::from).collect()
}
