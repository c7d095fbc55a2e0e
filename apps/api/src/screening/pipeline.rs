//! End-to-end screening: normalize → request verdict → apply policy.

use tracing::{info, warn};

use crate::llm_client::CompletionService;
use crate::screening::normalizer::{normalize, ResumeRecord};
use crate::screening::policy::apply_policy;
use crate::screening::verdict::{request_verdict, Verdict, VerdictResult};

/// What the caller hands to the pipeline.
#[derive(Debug, Clone)]
pub enum ResumeInput {
    /// Structured resume from the job board; normalized before prompting.
    Record(ResumeRecord),
    /// Text already extracted from an uploaded document; used as-is.
    Text(String),
}

impl ResumeInput {
    fn into_text(self) -> String {
        match self {
            ResumeInput::Record(record) => normalize(&record),
            ResumeInput::Text(text) => text,
        }
    }
}

/// Runs one evaluation. Always returns a result; persistence is the caller's job.
pub async fn evaluate_candidate(
    llm: &dyn CompletionService,
    input: ResumeInput,
    criteria: Option<&str>,
) -> VerdictResult {
    let text = input.into_text();
    let raw = request_verdict(llm, &text, criteria).await;
    let raw_verdict = raw.verdict;

    let result = apply_policy(raw);
    if raw_verdict != result.verdict {
        warn!(
            matches_count = result.matches_count,
            "Model accepted below the match threshold; verdict overridden to reject"
        );
    }
    if result.is_success() {
        info!(verdict = ?result.verdict, matches_count = result.matches_count, "Candidate evaluated");
    }
    result
}
