//! Output formatting for CLI display.

use crate::model::{BatchSummary, Decision, Issue, IssueKind, ScreenFailure};
use crate::plan::PlanViolation;

/// Format a manifest issue for stderr.
pub(super) fn format_issue(issue: &Issue) -> String {
    match issue.kind {
        IssueKind::Schema => format!("{issue} (schema)"),
        IssueKind::Semantic => issue.to_string(),
    }
}

/// Format a plan violation for stderr.
pub(super) fn format_violation(violation: &PlanViolation) -> String {
    format!("[plan/{}] {violation}", violation.class())
}

/// One-line batch summary, rates included.
pub(super) fn format_summary(summary: &BatchSummary) -> String {
    let mut line = format!(
        "{} screen(s): {} pass, {} needs review, {} fail, {} critical (pass rate {:.1}%)",
        summary.total,
        summary.pass,
        summary.needs_review,
        summary.fail,
        summary.critical_failures,
        summary.pass_rate() * 100.0
    );
    if let Some(decision) = summary.decision {
        let verb = match decision {
            Decision::Accept => "accepted",
            Decision::Retry => "retrying",
            Decision::Exhausted => "exhausted",
        };
        line.push_str(&format!(" → {verb}"));
    }
    line
}

/// A failing screen with the dimensions that did not pass.
pub(super) fn format_failure(failure: &ScreenFailure) -> String {
    let findings = failure
        .findings
        .iter()
        .map(|f| format!("{}={}", f.dimension, f.status))
        .collect::<Vec<_>>()
        .join(", ");
    let marker = if failure.critical { " [critical]" } else { "" };
    format!(
        "  {} {}{marker}: {findings}",
        failure.screen_id, failure.overall
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::model::{Dimension, Finding, Status};

    #[test]
    fn issue_marks_schema_errors() {
        let issue = Issue::error("home", IssueKind::Schema, "missing required field route");
        assert_eq!(
            format_issue(&issue),
            "[error] home: missing required field route (schema)"
        );
        assert_eq!(
            format_issue(&Issue::warn("home", "no UI states declared")),
            "[warn] home: no UI states declared"
        );
    }

    #[test]
    fn violation_carries_its_class() {
        let v = PlanViolation::Cycle {
            cycle: vec!["a".into(), "b".into(), "a".into()],
        };
        let line = format_violation(&v);
        assert!(line.starts_with("[plan/graph] "));
        assert!(line.contains("a -> b -> a"));
    }

    #[test]
    fn summary_line() {
        let summary = BatchSummary {
            total: 20,
            pass: 19,
            needs_review: 0,
            fail: 1,
            critical_failures: 0,
            decision: Some(Decision::Accept),
        };
        assert_eq!(
            format_summary(&summary),
            "20 screen(s): 19 pass, 0 needs review, 1 fail, 0 critical (pass rate 95.0%) → accepted"
        );
    }

    #[test]
    fn failure_lists_findings() {
        let failure = ScreenFailure {
            screen_id: "checkout".into(),
            overall: Status::Fail,
            critical: true,
            findings: vec![
                Finding {
                    dimension: Dimension::FunctionalParity,
                    status: Status::Fail,
                },
                Finding {
                    dimension: Dimension::VisualFidelity,
                    status: Status::NeedsReview,
                },
            ],
        };
        assert_eq!(
            format_failure(&failure),
            "  checkout FAIL [critical]: functionalParity=FAIL, visualFidelity=NEEDS_REVIEW"
        );
    }
}
