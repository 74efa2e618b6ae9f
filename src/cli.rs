//! CLI interface for gauge.
//!
//! Every subcommand works on one batch directory (`--batch`, default `.`).
//! Machine-readable JSON goes to stdout or to files under `reports/`;
//! human-readable summaries go to stderr.
//!
//! Exit codes: 0 on success or acceptance, 1 on a blocking validation
//! issue or any error, 2 when remediation is exhausted.

mod format;
mod plan;
mod remediate;
mod score;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::manifest::{self, ManifestLoad};
use crate::model::ScreenManifest;
use crate::report::ValidationReport;
use crate::storage::{Report, Storage};

use format::format_issue;

/// Gauge: plan, score and remediate a screen migration batch.
#[derive(Debug, Parser)]
#[command(name = "gauge", after_long_help = WORKFLOW_HELP)]
pub struct Cli {
    /// Batch directory containing `manifests/` and `evidence/`.
    #[arg(long, global = true, default_value = ".")]
    batch: PathBuf,

    /// Config file (defaults to `gauge.toml` in the batch directory).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

const WORKFLOW_HELP: &str = r"Workflow: migrating a batch
  1. gauge --batch ./batch plan
     → validates manifests, writes execution-plan.json on first run
  2. (build and capture screens in plan order into ./batch/evidence/)
  3. gauge --batch ./batch score
     → prints the batch summary, writes reports/scorecards.json
  4. gauge --batch ./batch remediate --fix-command ./fix.sh
     → loops score → fix until accepted or max-cycles is reached";

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Validate manifests and build or re-validate the execution plan.
    ///
    /// Builds `execution-plan.json` when none exists; otherwise validates the
    /// stored plan against the current manifests without changing it.
    /// Always writes `reports/validation-report.json`.
    Plan {
        /// Rebuild the plan even if one is stored.
        #[arg(long)]
        rebuild: bool,
    },

    /// Score the current evidence once and print the batch summary.
    Score,

    /// Run the remediation loop under the configured policy.
    ///
    /// Between cycles the fix step runs: `--fix-command` if given (with
    /// `GAUGE_FAILURE_REPORT` and `GAUGE_CYCLE` set), otherwise an interactive
    /// checkpoint that waits for Enter.
    Remediate {
        /// Command to run as the fix step, followed by its arguments.
        #[arg(long, num_args = 1.., allow_hyphen_values = true)]
        fix_command: Vec<String>,
    },
}

/// How the process should exit when no error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    Success,
    Blocked,
    Exhausted,
}

impl Exit {
    pub fn code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::Blocked => 1,
            Self::Exhausted => 2,
        }
    }
}

/// Run the CLI, returning an error message on failure.
pub fn run() -> Result<Exit, String> {
    let cli = Cli::parse();
    let storage = Storage::new(&cli.batch);
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| cli.batch.join(Config::FILE_NAME));

    match cli.command {
        Command::Plan { rebuild } => plan::cmd_plan(&storage, rebuild),
        Command::Score => {
            let config = Config::load_or_default(&config_path).map_err(|e| e.to_string())?;
            score::cmd_score(&storage, &config)
        }
        Command::Remediate { fix_command } => {
            let config = Config::load(&config_path).map_err(|e| e.to_string())?;
            let policy = config.policy().map_err(|e| e.to_string())?;
            remediate::cmd_remediate(&storage, &config, policy, &fix_command)
        }
    }
}

/// Read and validate the batch's manifests.
fn load_manifests(storage: &Storage) -> Result<ManifestLoad, String> {
    let sources = storage
        .load_manifest_sources()
        .map_err(|e| format!("failed to read manifests: {e}"))?;
    let load = manifest::validate(&sources);
    tracing::info!(
        screens = load.manifests.len(),
        issues = load.issues.len(),
        errors = load.error_count(),
        "loaded manifests"
    );
    Ok(load)
}

/// Write the validation report and print its issues to stderr.
fn write_validation_report(storage: &Storage, report: &ValidationReport) -> Result<(), String> {
    for issue in &report.issues {
        eprintln!("{}", format_issue(issue));
    }
    let path = storage
        .write_report(Report::Validation, report)
        .map_err(|e| format!("failed to write validation report: {e}"))?;
    eprintln!(
        "{} screen(s), {} issue(s), {} error(s) → {}",
        report.total_screens,
        report.total_issues,
        report.total_errors,
        path.display()
    );
    Ok(())
}

/// Manifests in stored-plan order, or in load order when no plan is stored.
fn in_plan_order(
    storage: &Storage,
    manifests: &[ScreenManifest],
) -> Result<Vec<ScreenManifest>, String> {
    let plan = storage
        .load_plan()
        .map_err(|e| format!("failed to read execution plan: {e}"))?;
    let Some(plan) = plan else {
        return Ok(manifests.to_vec());
    };

    let plan_ids = plan.screens.iter().map(|e| e.screen_id.as_str());
    let manifest_ids = manifests.iter().map(|m| m.screen_id.as_str());

    let mut ordered: Vec<ScreenManifest> = Vec::with_capacity(manifests.len());
    for id in plan_ids.chain(manifest_ids) {
        if ordered.iter().any(|o| o.screen_id == id) {
            continue;
        }
        if let Some(m) = manifests.iter().find(|m| m.screen_id == id) {
            ordered.push(m.clone());
        }
    }
    Ok(ordered)
}
