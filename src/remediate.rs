//! Remediation: score, decide, fix, and score again, up to a hard cap.
//!
//! The controller is a small state machine:
//!
//! ```text
//! Running(1) ─▶ score ─▶ accepted? ─yes─▶ Accepted
//!                 ▲          │no
//!                 │          ├─ cycle < max ─▶ fix (blocks) ─▶ Running(cycle + 1)
//!                 └──────────┘
//!                            └─ cycle = max ─▶ Exhausted
//! ```
//!
//! "Not accepted" is an ordinary outcome, not an error. Errors are reserved
//! for collaborators that could not do their job at all.

use jiff::Timestamp;
use uuid::Uuid;

use crate::config::RemediationPolicy;
use crate::model::{
    BatchSummary, CycleRecord, Decision, FailureReport, ScreenFailure, ScreenScorecard,
};
use crate::storage::StorageError;
use crate::summary::summarize;

/// Errors from the controller's collaborators.
#[derive(Debug, thiserror::Error)]
pub enum RemediationError {
    #[error("failed to collect evidence for cycle {cycle}: {message}")]
    Evidence { cycle: u32, message: String },

    #[error("fix step failed after cycle {cycle}: {message}")]
    Fix { cycle: u32, message: String },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Produces fresh scorecards for the current code state.
pub trait EvidenceSource {
    /// Score every screen for `cycle`. Called once per cycle.
    fn collect(&mut self, cycle: u32) -> Result<Vec<ScreenScorecard>, RemediationError>;

    /// Retain a finished cycle. The default keeps nothing.
    fn record(&mut self, _record: &CycleRecord) -> Result<(), RemediationError> {
        Ok(())
    }
}

/// The external fix step: the loop's one suspension point.
///
/// `fix` must block until the fixer (a human at a checkpoint, or an
/// automated agent) has finished and new evidence can be collected.
pub trait Fixer {
    fn fix(&mut self, report: &FailureReport) -> Result<(), RemediationError>;
}

/// Where the controller stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Running(u32),
    Accepted,
    Exhausted,
}

/// How a remediation run ended.
#[derive(Debug, Clone)]
pub struct Outcome {
    pub run_id: Uuid,

    /// `Accepted` or `Exhausted`.
    pub state: State,

    /// Cycles actually run.
    pub cycles: u32,

    /// Summary of the last cycle, decision included.
    pub summary: BatchSummary,

    /// Screens not passing at exhaustion, for human review. Empty when accepted.
    pub exceptions: Vec<ScreenFailure>,
}

impl RemediationPolicy {
    /// Whether a batch summary meets this policy.
    pub fn accepts(&self, summary: &BatchSummary) -> bool {
        if self.strict_pass_required {
            return summary.fail == 0 && summary.needs_review == 0;
        }
        summary.pass_rate() >= self.min_pass_rate
            && summary.needs_review_rate() <= self.max_needs_review_rate
            && (!self.require_zero_critical_failures || summary.critical_failures == 0)
    }

    /// The effective cycle cap: one cycle when remediation is disabled.
    pub fn cycle_limit(&self) -> u32 {
        if self.enabled {
            self.max_cycles.max(1)
        } else {
            1
        }
    }
}

/// Decide what follows `cycle`.
pub fn decide(policy: &RemediationPolicy, summary: &BatchSummary, cycle: u32) -> Decision {
    if policy.accepts(summary) {
        Decision::Accept
    } else if cycle < policy.cycle_limit() {
        Decision::Retry
    } else {
        Decision::Exhausted
    }
}

/// Drives the remediation loop under one policy.
#[derive(Debug, Clone, Copy)]
pub struct Controller {
    policy: RemediationPolicy,
}

impl Controller {
    pub fn new(policy: RemediationPolicy) -> Self {
        Self { policy }
    }

    /// Run cycles until the batch is accepted or the cycle cap is reached.
    pub fn run(
        &self,
        source: &mut impl EvidenceSource,
        fixer: &mut impl Fixer,
    ) -> Result<Outcome, RemediationError> {
        let run_id = Uuid::new_v4();
        let mut state = State::Running(1);
        let mut last = BatchSummary::default();
        let mut exceptions = Vec::new();
        let mut cycles = 0;

        while let State::Running(cycle) = state {
            cycles = cycle;
            let scorecards = source.collect(cycle)?;
            let mut summary = summarize(&scorecards);
            let decision = decide(&self.policy, &summary, cycle);
            summary.decision = Some(decision);

            tracing::info!(
                cycle,
                total = summary.total,
                pass = summary.pass,
                needs_review = summary.needs_review,
                fail = summary.fail,
                critical = summary.critical_failures,
                ?decision,
                "remediation cycle decided"
            );

            source.record(&CycleRecord {
                run_id,
                cycle,
                summary,
                scorecards: scorecards.clone(),
                recorded_at: Timestamp::now(),
            })?;
            last = summary;

            state = match decision {
                Decision::Accept => State::Accepted,
                Decision::Retry => {
                    let report = FailureReport::new(cycle, summary, &scorecards);
                    tracing::info!(cycle, screens = report.screens.len(), "waiting on fix step");
                    fixer.fix(&report)?;
                    State::Running(cycle + 1)
                }
                Decision::Exhausted => {
                    exceptions = scorecards
                        .iter()
                        .filter_map(ScreenFailure::from_scorecard)
                        .collect();
                    tracing::warn!(
                        cycle,
                        exceptions = exceptions.len(),
                        "remediation exhausted; routing screens to human review"
                    );
                    State::Exhausted
                }
            };
        }

        Ok(Outcome {
            run_id,
            state,
            cycles,
            summary: last,
            exceptions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::model::{
        AccessibilityScore, Dimensions, FunctionalScore, PerformanceScore, Status,
        StructuralScore, UiStateScore, VisualScore,
    };

    fn policy() -> RemediationPolicy {
        RemediationPolicy {
            enabled: true,
            max_cycles: 3,
            min_pass_rate: 0.9,
            max_needs_review_rate: 0.05,
            require_zero_critical_failures: true,
            strict_pass_required: false,
        }
    }

    fn summary(
        total: usize,
        pass: usize,
        needs_review: usize,
        fail: usize,
        critical: usize,
    ) -> BatchSummary {
        BatchSummary {
            total,
            pass,
            needs_review,
            fail,
            critical_failures: critical,
            decision: None,
        }
    }

    /// A scorecard whose structural dimension carries `status`; every other dimension passes.
    fn card(id: &str, status: Status) -> ScreenScorecard {
        let dimensions = Dimensions {
            visual_fidelity: VisualScore {
                status: Status::Pass,
                worst_diff_percent: Some(0.0),
                dimension_mismatch: false,
            },
            structural_parity: StructuralScore {
                status,
                critical_deltas: None,
            },
            functional_parity: FunctionalScore {
                status: Status::Pass,
                passed: Some(1),
                failed: Some(0),
            },
            ui_state_coverage: UiStateScore {
                status: Status::Pass,
                captured: Some(0),
                declared: Some(0),
            },
            accessibility_baseline: AccessibilityScore {
                status: Status::Pass,
                critical_violations: Some(0),
            },
            performance_guardrail: PerformanceScore {
                status: Status::Pass,
                load_time_ms: Some(1),
                largest_script_kb: Some(1),
            },
        };
        ScreenScorecard {
            screen_id: id.into(),
            overall: dimensions.overall(),
            dimensions,
        }
    }

    /// Serves one scripted batch per cycle, repeating the last one.
    struct Scripted {
        cycles: Vec<Vec<ScreenScorecard>>,
        collected: u32,
        recorded: Vec<CycleRecord>,
    }

    impl Scripted {
        fn new(cycles: Vec<Vec<ScreenScorecard>>) -> Self {
            Self {
                cycles,
                collected: 0,
                recorded: Vec::new(),
            }
        }
    }

    impl EvidenceSource for Scripted {
        fn collect(&mut self, cycle: u32) -> Result<Vec<ScreenScorecard>, RemediationError> {
            self.collected += 1;
            assert_eq!(cycle, self.collected);
            let i = (cycle as usize - 1).min(self.cycles.len() - 1);
            Ok(self.cycles[i].clone())
        }

        fn record(&mut self, record: &CycleRecord) -> Result<(), RemediationError> {
            self.recorded.push(record.clone());
            Ok(())
        }
    }

    #[derive(Default)]
    struct CountingFixer {
        reports: Vec<FailureReport>,
    }

    impl Fixer for CountingFixer {
        fn fix(&mut self, report: &FailureReport) -> Result<(), RemediationError> {
            self.reports.push(report.clone());
            Ok(())
        }
    }

    #[test]
    fn threshold_policy_tolerates_one_non_critical_failure() {
        assert!(policy().accepts(&summary(20, 19, 0, 1, 0)));
    }

    #[test]
    fn threshold_policy_rejects_critical_failure() {
        assert!(!policy().accepts(&summary(20, 19, 0, 1, 1)));

        let lenient = RemediationPolicy {
            require_zero_critical_failures: false,
            ..policy()
        };
        assert!(lenient.accepts(&summary(20, 19, 0, 1, 1)));
    }

    #[test]
    fn threshold_policy_checks_both_rates() {
        assert!(!policy().accepts(&summary(20, 17, 0, 3, 0)));
        assert!(!policy().accepts(&summary(20, 18, 2, 0, 0)));
        assert!(policy().accepts(&summary(20, 19, 1, 0, 0)));
    }

    #[test]
    fn strict_policy_requires_every_screen_to_pass() {
        let strict = RemediationPolicy {
            strict_pass_required: true,
            ..policy()
        };
        assert!(strict.accepts(&summary(3, 3, 0, 0, 0)));
        assert!(!strict.accepts(&summary(3, 2, 1, 0, 0)));
        assert!(!strict.accepts(&summary(20, 19, 0, 1, 0)));
    }

    #[test]
    fn decisions_respect_the_cap() {
        let p = policy();
        let failing = summary(2, 0, 0, 2, 2);
        assert_eq!(decide(&p, &failing, 1), Decision::Retry);
        assert_eq!(decide(&p, &failing, 2), Decision::Retry);
        assert_eq!(decide(&p, &failing, 3), Decision::Exhausted);
        assert_eq!(decide(&p, &summary(2, 2, 0, 0, 0), 3), Decision::Accept);
    }

    #[test]
    fn exhausts_after_max_cycles_without_a_fourth() {
        let mut source = Scripted::new(vec![vec![
            card("a", Status::Fail),
            card("b", Status::Pass),
        ]]);
        let mut fixer = CountingFixer::default();

        let outcome = Controller::new(policy()).run(&mut source, &mut fixer).unwrap();

        assert_eq!(outcome.state, State::Exhausted);
        assert_eq!(outcome.cycles, 3);
        assert_eq!(source.collected, 3);
        assert_eq!(fixer.reports.len(), 2);
        assert_eq!(outcome.summary.decision, Some(Decision::Exhausted));
        assert_eq!(outcome.exceptions.len(), 1);
        assert_eq!(outcome.exceptions[0].screen_id, "a");
        assert!(outcome.exceptions[0].critical);
    }

    #[test]
    fn accepts_once_fixed_and_stops() {
        let mut source = Scripted::new(vec![
            vec![card("a", Status::Fail)],
            vec![card("a", Status::Pass)],
        ]);
        let mut fixer = CountingFixer::default();

        let outcome = Controller::new(policy()).run(&mut source, &mut fixer).unwrap();

        assert_eq!(outcome.state, State::Accepted);
        assert_eq!(outcome.cycles, 2);
        assert_eq!(fixer.reports.len(), 1);
        assert_eq!(fixer.reports[0].cycle, 1);
        assert_eq!(fixer.reports[0].screens[0].screen_id, "a");
        assert!(outcome.exceptions.is_empty());

        let decisions: Vec<_> = source.recorded.iter().map(|r| r.summary.decision).collect();
        assert_eq!(decisions, [Some(Decision::Retry), Some(Decision::Accept)]);
        assert!(source.recorded.iter().all(|r| r.run_id == outcome.run_id));
    }

    #[test]
    fn accepted_first_cycle_never_invokes_fixer() {
        let mut source = Scripted::new(vec![vec![card("a", Status::Pass)]]);
        let mut fixer = CountingFixer::default();

        let outcome = Controller::new(policy()).run(&mut source, &mut fixer).unwrap();

        assert_eq!(outcome.state, State::Accepted);
        assert_eq!(outcome.cycles, 1);
        assert!(fixer.reports.is_empty());
    }

    #[test]
    fn disabled_policy_runs_a_single_cycle() {
        let disabled = RemediationPolicy {
            enabled: false,
            ..policy()
        };
        let mut source = Scripted::new(vec![vec![card("a", Status::NeedsReview)]]);
        let mut fixer = CountingFixer::default();

        let outcome = Controller::new(disabled).run(&mut source, &mut fixer).unwrap();

        assert_eq!(outcome.state, State::Exhausted);
        assert_eq!(outcome.cycles, 1);
        assert!(fixer.reports.is_empty());
        assert_eq!(outcome.exceptions[0].overall, Status::NeedsReview);
    }

    #[test]
    fn fixer_error_stops_the_loop() {
        struct Broken;
        impl Fixer for Broken {
            fn fix(&mut self, report: &FailureReport) -> Result<(), RemediationError> {
                Err(RemediationError::Fix {
                    cycle: report.cycle,
                    message: "exit status 1".into(),
                })
            }
        }

        let mut source = Scripted::new(vec![vec![card("a", Status::Fail)]]);
        let err = Controller::new(policy())
            .run(&mut source, &mut Broken)
            .unwrap_err();

        assert!(matches!(err, RemediationError::Fix { cycle: 1, .. }));
        assert_eq!(source.collected, 1);
    }
}
