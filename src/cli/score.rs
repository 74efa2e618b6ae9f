//! Score command: one scoring pass over the current evidence.

use crate::config::Config;
use crate::model::{BatchSummary, ScreenManifest, ScreenScorecard};
use crate::report::ValidationReport;
use crate::score::ScoreAggregator;
use crate::storage::{Report, Storage};
use crate::summary::summarize;

use super::format::format_summary;
use super::{Exit, in_plan_order, load_manifests, write_validation_report};

/// Exits 0 once the batch is scored, however it scored; only a blocked
/// manifest batch exits non-zero.
pub(super) fn cmd_score(storage: &Storage, config: &Config) -> Result<Exit, String> {
    let load = load_manifests(storage)?;
    if load.is_blocked() {
        write_validation_report(storage, &ValidationReport::new(&load, None))?;
        return Ok(Exit::Blocked);
    }

    let manifests = in_plan_order(storage, &load.manifests)?;
    let (_, summary) = score_and_write(storage, config, &manifests)?;

    eprintln!("{}", format_summary(&summary));
    let json = serde_json::to_string_pretty(&summary)
        .map_err(|e| format!("failed to serialize summary: {e}"))?;
    println!("{json}");
    Ok(Exit::Success)
}

/// Score the batch's current evidence and write the scorecard report.
///
/// Shared with the remediation loop, which calls it once per cycle.
pub(super) fn score_and_write(
    storage: &Storage,
    config: &Config,
    manifests: &[ScreenManifest],
) -> Result<(Vec<ScreenScorecard>, BatchSummary), String> {
    let evidence = storage
        .load_evidence()
        .map_err(|e| format!("failed to read evidence: {e}"))?;
    let scorecards = ScoreAggregator::new(config.thresholds).score_batch(manifests, &evidence);
    let summary = summarize(&scorecards);

    storage
        .write_report(Report::Scorecards, &scorecards)
        .map_err(|e| format!("failed to write scorecards: {e}"))?;
    storage
        .write_report(Report::BatchSummary, &summary)
        .map_err(|e| format!("failed to write batch summary: {e}"))?;

    tracing::info!(
        screens = scorecards.len(),
        evidence = evidence.len(),
        pass = summary.pass,
        fail = summary.fail,
        "scored batch"
    );
    Ok((scorecards, summary))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;
    use std::path::Path;

    use serde_json::json;
    use tempfile::TempDir;

    use crate::model::Status;

    fn write_json(dir: &Path, sub: &str, name: &str, value: &serde_json::Value) {
        fs::create_dir_all(dir.join(sub)).unwrap();
        fs::write(dir.join(sub).join(format!("{name}.json")), value.to_string()).unwrap();
    }

    fn manifest(id: &str) -> serde_json::Value {
        json!({
            "screenId": id,
            "route": format!("/{id}"),
            "complexity": "low",
            "interactiveContracts": [{"trigger": "click"}],
            "uiStates": ["default", "loading"],
            "renderModel": {"components": {"root": {}}},
        })
    }

    fn passing_evidence(id: &str) -> serde_json::Value {
        json!({
            "screenId": id,
            "visual": {"captures": [{"name": "default", "diffPercent": 0.5}]},
            "structural": {"captures": [{"name": "default", "criticalDeltas": 0}]},
            "functional": {"passed": 4, "failed": 0},
            "uiStates": {"captured": 2},
            "accessibility": {"criticalViolations": 0},
            "performance": {"loadTimeMs": 900, "largestScriptKb": 120},
        })
    }

    #[test]
    fn scores_and_writes_reports() {
        let dir = TempDir::new().unwrap();
        write_json(dir.path(), "manifests", "home", &manifest("home"));
        write_json(dir.path(), "manifests", "cart", &manifest("cart"));
        write_json(dir.path(), "evidence", "home", &passing_evidence("home"));
        let storage = Storage::new(dir.path());

        let load = load_manifests(&storage).unwrap();
        let (cards, summary) =
            score_and_write(&storage, &Config::default(), &load.manifests).unwrap();

        let home = cards.iter().find(|c| c.screen_id == "home").unwrap();
        let cart = cards.iter().find(|c| c.screen_id == "cart").unwrap();
        assert_eq!(home.overall, Status::Pass);
        assert_eq!(cart.overall, Status::NeedsReview);
        assert_eq!(summary.total, 2);
        assert_eq!(summary.pass, 1);
        assert_eq!(summary.needs_review, 1);

        assert!(storage.report_path(Report::Scorecards).exists());
        assert!(storage.report_path(Report::BatchSummary).exists());
    }

    #[test]
    fn failing_screens_still_exit_zero() {
        let dir = TempDir::new().unwrap();
        write_json(dir.path(), "manifests", "home", &manifest("home"));
        let mut evidence = passing_evidence("home");
        evidence["functional"] = json!({"passed": 1, "failed": 3});
        write_json(dir.path(), "evidence", "home", &evidence);
        let storage = Storage::new(dir.path());

        let exit = cmd_score(&storage, &Config::default()).unwrap();

        assert_eq!(exit, Exit::Success);
        let summary: BatchSummary = serde_json::from_str(
            &fs::read_to_string(storage.report_path(Report::BatchSummary)).unwrap(),
        )
        .unwrap();
        assert_eq!((summary.fail, summary.critical_failures), (1, 1));
    }

    #[test]
    fn blocked_batch_writes_only_validation_report() {
        let dir = TempDir::new().unwrap();
        write_json(dir.path(), "manifests", "home", &json!({"screenId": "home"}));
        let storage = Storage::new(dir.path());

        let exit = cmd_score(&storage, &Config::default()).unwrap();

        assert_eq!(exit, Exit::Blocked);
        assert!(storage.report_path(Report::Validation).exists());
        assert!(!storage.report_path(Report::Scorecards).exists());
    }
}
