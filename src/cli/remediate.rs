//! Remediate command: the score → fix loop over a batch directory.

use std::io::{self, BufRead, Write};
use std::process::Command;

use crate::config::{Config, RemediationPolicy};
use crate::model::{CycleRecord, FailureReport, ScreenManifest, ScreenScorecard};
use crate::remediate::{Controller, EvidenceSource, Fixer, RemediationError, State};
use crate::report::ValidationReport;
use crate::storage::{Report, Storage};

use super::format::{format_failure, format_summary};
use super::plan::check_batch;
use super::score::score_and_write;
use super::{Exit, in_plan_order, load_manifests, write_validation_report};

pub(super) fn cmd_remediate(
    storage: &Storage,
    config: &Config,
    policy: RemediationPolicy,
    fix_command: &[String],
) -> Result<Exit, String> {
    let load = load_manifests(storage)?;
    let accepted = match load.accepted() {
        Ok(manifests) => manifests,
        Err(rejected) => {
            write_validation_report(storage, &ValidationReport::new(&load, None))?;
            eprintln!("{rejected}");
            return Ok(Exit::Blocked);
        }
    };

    let report = check_batch(storage, &load, false)?;
    write_validation_report(storage, &report)?;
    if report.is_blocking() {
        return Ok(Exit::Blocked);
    }
    let manifests = in_plan_order(storage, accepted)?;
    tracing::debug!(max_cycles = policy.cycle_limit(), "starting remediation");

    let mut source = BatchEvidence {
        storage,
        config,
        manifests: &manifests,
    };
    let controller = Controller::new(policy);
    let outcome = match fix_command.split_first() {
        Some((program, args)) => {
            let mut fixer = CommandFixer {
                storage,
                program,
                args,
            };
            controller.run(&mut source, &mut fixer)
        }
        None => controller.run(&mut source, &mut CheckpointFixer { storage }),
    }
    .map_err(|e| e.to_string())?;

    eprintln!("{}", format_summary(&outcome.summary));
    let json = serde_json::to_string_pretty(&outcome.summary)
        .map_err(|e| format!("failed to serialize summary: {e}"))?;
    println!("{json}");

    match outcome.state {
        State::Accepted => {
            eprintln!("Batch accepted after {} cycle(s)", outcome.cycles);
            Ok(Exit::Success)
        }
        State::Exhausted | State::Running(_) => {
            let path = storage
                .write_report(Report::Exceptions, &outcome.exceptions)
                .map_err(|e| format!("failed to write exceptions: {e}"))?;
            eprintln!(
                "Remediation exhausted after {} cycle(s); {} screen(s) need human review → {}",
                outcome.cycles,
                outcome.exceptions.len(),
                path.display()
            );
            for failure in &outcome.exceptions {
                eprintln!("{}", format_failure(failure));
            }
            Ok(Exit::Exhausted)
        }
    }
}

/// Scores whatever evidence is on disk at the start of each cycle.
struct BatchEvidence<'a> {
    storage: &'a Storage,
    config: &'a Config,
    manifests: &'a [ScreenManifest],
}

impl EvidenceSource for BatchEvidence<'_> {
    fn collect(&mut self, cycle: u32) -> Result<Vec<ScreenScorecard>, RemediationError> {
        let (scorecards, _) = score_and_write(self.storage, self.config, self.manifests)
            .map_err(|message| RemediationError::Evidence { cycle, message })?;
        Ok(scorecards)
    }

    fn record(&mut self, record: &CycleRecord) -> Result<(), RemediationError> {
        self.storage.append_history(record)?;
        self.storage.write_report(Report::BatchSummary, &record.summary)?;
        Ok(())
    }
}

fn write_failure_report(
    storage: &Storage,
    report: &FailureReport,
) -> Result<(), RemediationError> {
    storage.write_report(Report::FailureReport, report)?;
    Ok(())
}

/// Runs an external command as the fix step and waits for it to exit.
struct CommandFixer<'a> {
    storage: &'a Storage,
    program: &'a str,
    args: &'a [String],
}

impl Fixer for CommandFixer<'_> {
    fn fix(&mut self, report: &FailureReport) -> Result<(), RemediationError> {
        write_failure_report(self.storage, report)?;
        let fix_err = |message: String| RemediationError::Fix {
            cycle: report.cycle,
            message,
        };

        tracing::info!(program = self.program, cycle = report.cycle, "running fix command");
        let status = Command::new(self.program)
            .args(self.args)
            .env(
                "GAUGE_FAILURE_REPORT",
                self.storage.report_path(Report::FailureReport),
            )
            .env("GAUGE_CYCLE", report.cycle.to_string())
            .env("GAUGE_BATCH", self.storage.root())
            .status()
            .map_err(|e| fix_err(format!("failed to run {}: {e}", self.program)))?;

        if !status.success() {
            return Err(fix_err(format!("{} exited with {status}", self.program)));
        }
        Ok(())
    }
}

/// Pauses for a human: shows the failures and waits for Enter.
struct CheckpointFixer<'a> {
    storage: &'a Storage,
}

impl Fixer for CheckpointFixer<'_> {
    fn fix(&mut self, report: &FailureReport) -> Result<(), RemediationError> {
        write_failure_report(self.storage, report)?;
        let fix_err = |message: String| RemediationError::Fix {
            cycle: report.cycle,
            message,
        };

        eprintln!(
            "Cycle {} not accepted: {}",
            report.cycle,
            format_summary(&report.summary)
        );
        for failure in &report.screens {
            eprintln!("{}", format_failure(failure));
        }
        eprint!(
            "Fix the screens above ({}), then press Enter to re-score: ",
            self.storage.report_path(Report::FailureReport).display()
        );
        io::stderr()
            .flush()
            .map_err(|e| fix_err(format!("failed to prompt: {e}")))?;

        let mut line = String::new();
        let read = io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|e| fix_err(format!("failed to read stdin: {e}")))?;
        if read == 0 {
            return Err(fix_err("stdin closed at checkpoint".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;
    use std::path::Path;

    use serde_json::json;
    use tempfile::TempDir;

    use crate::model::{Decision, ScreenFailure};

    fn policy(max_cycles: u32) -> RemediationPolicy {
        RemediationPolicy {
            enabled: true,
            max_cycles,
            min_pass_rate: 1.0,
            max_needs_review_rate: 0.0,
            require_zero_critical_failures: true,
            strict_pass_required: false,
        }
    }

    fn batch() -> (TempDir, Storage) {
        let dir = TempDir::new().unwrap();
        let manifests = dir.path().join("manifests");
        fs::create_dir_all(&manifests).unwrap();
        let manifest = json!({
            "screenId": "home",
            "route": "/",
            "complexity": "low",
            "interactiveContracts": [{"trigger": "click"}],
            "uiStates": ["default"],
            "renderModel": {"components": {"root": {}}},
        });
        fs::write(manifests.join("home.json"), manifest.to_string()).unwrap();
        let storage = Storage::new(dir.path());
        (dir, storage)
    }

    fn write_passing_evidence(path: &Path) {
        let evidence = json!({
            "screenId": "home",
            "visual": {"captures": [{"name": "default", "diffPercent": 0.0}]},
            "structural": {"captures": [{"name": "default", "criticalDeltas": 0}]},
            "functional": {"passed": 3, "failed": 0},
            "uiStates": {"captured": 1},
            "accessibility": {"criticalViolations": 0},
            "performance": {"loadTimeMs": 800, "largestScriptKb": 90},
        });
        fs::write(path, evidence.to_string()).unwrap();
    }

    fn args(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn exhausts_and_writes_exceptions() {
        let (_dir, storage) = batch();

        let exit = cmd_remediate(&storage, &Config::default(), policy(2), &args(&["true"]))
            .unwrap();

        assert_eq!(exit, Exit::Exhausted);
        let history = storage.load_history().unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].summary.decision, Some(Decision::Exhausted));

        let exceptions: Vec<ScreenFailure> = serde_json::from_str(
            &fs::read_to_string(storage.report_path(Report::Exceptions)).unwrap(),
        )
        .unwrap();
        assert_eq!(exceptions.len(), 1);
        assert_eq!(exceptions[0].screen_id, "home");
        assert!(storage.report_path(Report::FailureReport).exists());
    }

    #[test]
    fn accepts_after_fix_command_supplies_evidence() {
        let (dir, storage) = batch();
        write_passing_evidence(&dir.path().join("fixed.json"));
        let script = r#"mkdir -p "$GAUGE_BATCH/evidence" && test "$GAUGE_CYCLE" = 1 && test -f "$GAUGE_FAILURE_REPORT" && cp "$GAUGE_BATCH/fixed.json" "$GAUGE_BATCH/evidence/home.json""#;

        let exit = cmd_remediate(
            &storage,
            &Config::default(),
            policy(3),
            &args(&["sh", "-c", script]),
        )
        .unwrap();

        assert_eq!(exit, Exit::Success);
        let history = storage.load_history().unwrap();
        let decisions: Vec<_> = history.iter().map(|r| r.summary.decision).collect();
        assert_eq!(decisions, [Some(Decision::Retry), Some(Decision::Accept)]);
        assert!(!storage.report_path(Report::Exceptions).exists());
    }

    #[test]
    fn failing_fix_command_aborts() {
        let (_dir, storage) = batch();

        let err = cmd_remediate(&storage, &Config::default(), policy(3), &args(&["false"]))
            .unwrap_err();

        assert!(err.contains("fix step failed after cycle 1"));
        assert_eq!(storage.load_history().unwrap().len(), 1);
    }

    #[test]
    fn blocked_batch_never_scores() {
        let (dir, storage) = batch();
        fs::write(dir.path().join("manifests").join("bad.json"), "[]").unwrap();

        let exit = cmd_remediate(&storage, &Config::default(), policy(3), &args(&["true"]))
            .unwrap();

        assert_eq!(exit, Exit::Blocked);
        assert!(storage.load_history().unwrap().is_empty());
        assert!(storage.report_path(Report::Validation).exists());
        assert!(storage.load_plan().unwrap().is_none());
    }

    #[test]
    fn torn_history_does_not_block_a_new_run() {
        let (dir, storage) = batch();
        let reports = dir.path().join("reports");
        fs::create_dir_all(&reports).unwrap();
        fs::write(storage.history_path(), "{\"runId\":\n").unwrap();

        let exit = cmd_remediate(&storage, &Config::default(), policy(1), &args(&["true"]))
            .unwrap();

        assert_eq!(exit, Exit::Exhausted);
        assert_eq!(storage.load_history().unwrap().len(), 1);
    }
}
