//! Batch summaries: reduce every scorecard in a cycle to counts.

use crate::model::{BatchSummary, ScreenScorecard, Status};

/// Count screens by overall status and tally critical failures.
///
/// Call only once every screen has been scored: the summary is the
/// barrier between per-screen scoring and the batch decision.
pub fn summarize(scorecards: &[ScreenScorecard]) -> BatchSummary {
    let mut summary = BatchSummary {
        total: scorecards.len(),
        ..BatchSummary::default()
    };
    for card in scorecards {
        match card.overall {
            Status::Pass => summary.pass += 1,
            Status::NeedsReview => summary.needs_review += 1,
            Status::Fail => summary.fail += 1,
        }
        if card.is_critical_failure() {
            summary.critical_failures += 1;
        }
    }
    summary
}
