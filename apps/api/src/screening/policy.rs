//! Acceptance threshold applied on top of the model's verdict.
//!
//! An `accept` is only kept when at least `MIN_MATCHED_CRITERIA` criteria matched.
//! Applied after every model call; pure and idempotent.

use crate::screening::verdict::{Verdict, VerdictResult};

pub const MIN_MATCHED_CRITERIA: u32 = 3;

pub fn apply_policy(raw: VerdictResult) -> VerdictResult {
    if raw.verdict == Verdict::Accept && raw.matches_count < MIN_MATCHED_CRITERIA {
        return VerdictResult {
            verdict: Verdict::Reject,
            reason: override_reason(raw.matches_count),
            ..raw
        };
    }
    raw
}

fn override_reason(matches_count: u32) -> String {
    format!(
        "Only {matches_count} criteria matched; at least {MIN_MATCHED_CRITERIA} are required to accept the candidate."
    )
}
