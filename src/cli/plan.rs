//! Plan command: validate manifests, then build or re-validate the plan.

use crate::manifest::ManifestLoad;
use crate::plan::{self as execution_plan, PlanViolation};
use crate::report::{PlanSection, ValidationReport};
use crate::storage::{Storage, StorageError};

use super::format::format_violation;
use super::{Exit, load_manifests, write_validation_report};

pub(super) fn cmd_plan(storage: &Storage, rebuild: bool) -> Result<Exit, String> {
    let load = load_manifests(storage)?;
    let report = check_batch(storage, &load, rebuild)?;
    write_validation_report(storage, &report)?;

    if report.is_blocking() {
        return Ok(Exit::Blocked);
    }
    if let Some(section) = &report.execution_plan {
        let action = if section.built { "built" } else { "validated" };
        let fingerprint = section.fingerprint.as_deref().unwrap_or("-");
        eprintln!(
            "Execution plan {action}: {} screen(s), fingerprint {}",
            section.actual_order.len(),
            &fingerprint[..fingerprint.len().min(12)]
        );
    }
    Ok(Exit::Success)
}

/// Validate the manifest batch and, if it is clean, its execution plan.
///
/// Builds and stores the plan when none exists (or on `rebuild`). A stored
/// plan is only ever validated, never rewritten.
pub(super) fn check_batch(
    storage: &Storage,
    load: &ManifestLoad,
    rebuild: bool,
) -> Result<ValidationReport, String> {
    // Fail closed: no plan work on a batch with manifest errors.
    if load.is_blocked() {
        return Ok(ValidationReport::new(load, None));
    }

    let stored = if rebuild {
        None
    } else {
        match storage.load_plan() {
            Ok(stored) => stored,
            // A plan that no longer decodes is a finding, not a crash.
            Err(StorageError::Json { source, .. }) => {
                let violation = PlanViolation::Unreadable {
                    message: source.to_string(),
                };
                eprintln!("{}", format_violation(&violation));
                let section = PlanSection::unbuildable(violation);
                return Ok(ValidationReport::new(load, Some(section)));
            }
            Err(e) => return Err(format!("failed to read execution plan: {e}")),
        }
    };

    let (plan, built) = match stored {
        Some(plan) => (plan, false),
        None => match execution_plan::build(&load.manifests) {
            Ok(plan) => {
                storage
                    .save_plan(&plan)
                    .map_err(|e| format!("failed to write execution plan: {e}"))?;
                (plan, true)
            }
            Err(e) => {
                let violation = PlanViolation::from(e);
                eprintln!("{}", format_violation(&violation));
                let section = PlanSection::unbuildable(violation);
                return Ok(ValidationReport::new(load, Some(section)));
            }
        },
    };

    let validation = execution_plan::validate(&plan, &load.manifests);
    for violation in &validation.errors {
        eprintln!("{}", format_violation(violation));
    }
    let fingerprint = execution_plan::fingerprint(&plan)
        .map_err(|e| format!("failed to fingerprint execution plan: {e}"))?;

    Ok(ValidationReport::new(
        load,
        Some(PlanSection::from_validation(
            validation,
            built,
            Some(fingerprint),
        )),
    ))
}
