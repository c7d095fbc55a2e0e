//! Asks the model whether a resume satisfies the vacancy criteria.
//!
//! `request_verdict` never fails: transport errors, non-2xx answers and malformed
//! JSON are folded into an error-status `VerdictResult` so callers branch on
//! `status` instead of on error types.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::llm_client::{call_json, CompletionRequest, CompletionService};
use crate::screening::prompts::{build_verdict_prompt, verdict_system, DEFAULT_CRITERIA};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationStatus {
    Success,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Accept,
    Reject,
    Undetermined,
    /// Sentinel carried by error-status results.
    Error,
}

impl Verdict {
    /// Maps the model's label onto a verdict. Anything other than the two
    /// labels the prompt allows is `Undetermined`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "accept" => Verdict::Accept,
            "reject" => Verdict::Reject,
            _ => Verdict::Undetermined,
        }
    }

    /// The label as stored in a serialized result.
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Accept => "accept",
            Verdict::Reject => "reject",
            Verdict::Undetermined => "undetermined",
            Verdict::Error => "error",
        }
    }
}

/// Outcome of one screening call, stored verbatim as a candidate's analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerdictResult {
    pub status: EvaluationStatus,
    pub verdict: Verdict,
    pub reason: String,
    pub matches_count: u32,
    pub matched_criteria: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl VerdictResult {
    pub fn failure(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            status: EvaluationStatus::Error,
            verdict: Verdict::Error,
            reason: message.clone(),
            matches_count: 0,
            matched_criteria: Vec::new(),
            error: Some(message),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == EvaluationStatus::Success
    }
}

/// The model's answer as it arrives; every field may be missing.
/// Counts may come as numbers or numeric strings; non-string criteria are skipped.
#[derive(Debug, Deserialize)]
struct RawVerdict {
    #[serde(default)]
    verdict: Option<String>,
    #[serde(default)]
    reason: Option<String>,
    #[serde(default, deserialize_with = "loose_count")]
    matches_count: Option<i64>,
    #[serde(default, deserialize_with = "loose_strings")]
    matched_criteria: Option<Vec<String>>,
}

fn loose_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    let count = match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f as i64))
        }
        _ => None,
    };
    Ok(count)
}

fn loose_strings<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Vec<String>>, D::Error> {
    let strings = match Value::deserialize(deserializer)? {
        Value::Array(items) => Some(
            items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
        ),
        _ => None,
    };
    Ok(strings)
}

impl From<RawVerdict> for VerdictResult {
    fn from(raw: RawVerdict) -> Self {
        VerdictResult {
            status: EvaluationStatus::Success,
            verdict: raw
                .verdict
                .as_deref()
                .map(Verdict::from_label)
                .unwrap_or(Verdict::Undetermined),
            reason: raw.reason.unwrap_or_default(),
            matches_count: raw
                .matches_count
                .map(|n| u32::try_from(n.max(0)).unwrap_or(u32::MAX))
                .unwrap_or(0),
            matched_criteria: raw.matched_criteria.unwrap_or_default(),
            error: None,
        }
    }
}

/// Criteria actually sent to the model: the caller's, or the default when blank.
pub fn effective_criteria(criteria: Option<&str>) -> &str {
    criteria
        .filter(|c| !c.trim().is_empty())
        .unwrap_or(DEFAULT_CRITERIA)
}

/// Asks the model for a raw verdict on `resume_text`. The policy is NOT applied here.
pub async fn request_verdict(
    llm: &dyn CompletionService,
    resume_text: &str,
    criteria: Option<&str>,
) -> VerdictResult {
    let prompt = build_verdict_prompt(effective_criteria(criteria), resume_text);
    let request = CompletionRequest::json(&verdict_system(), prompt);

    match call_json::<RawVerdict>(llm, &request).await {
        Ok(raw) => raw.into(),
        Err(e) => {
            warn!(error = %e, "Verdict request failed");
            VerdictResult::failure(e.to_string())
        }
    }
}
