// All LLM prompt constants for the screening module.
// Reuses the JSON-only fragment from llm_client::prompts.

use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::screening::policy::MIN_MATCHED_CRITERIA;

/// Substituted when a vacancy carries no criteria of its own.
pub const DEFAULT_CRITERIA: &str =
    "evaluate the candidate for general adequacy and fit against standard requirements";

const VERDICT_ROLE: &str = "You are an HR analyst who screens resumes against hiring criteria.";

const PROFILE_ROLE: &str =
    "You are an experienced recruiter who writes vacancy profiles for hiring managers.";

/// System prompt for resume verdicts.
pub fn verdict_system() -> String {
    format!("{VERDICT_ROLE} {JSON_ONLY_SYSTEM}")
}

/// System prompt for vacancy profile generation.
pub fn profile_system() -> String {
    format!("{PROFILE_ROLE} {JSON_ONLY_SYSTEM}")
}

/// Verdict prompt: the criteria first, then the normalized resume.
pub fn build_verdict_prompt(criteria: &str, resume_text: &str) -> String {
    format!(
        r#"Analyze the candidate's resume against the following criteria:
{criteria}

RESUME:
{resume_text}

Return a JSON object with this EXACT schema (no extra fields):
{{
  "verdict": "accept" | "reject",
  "reason": "Short justification, 1-2 sentences",
  "matches_count": 0,
  "matched_criteria": ["criterion the resume clearly satisfies"]
}}

RULES:
1. "verdict" must be exactly "accept" or "reject"
2. Count a criterion as matched only when the resume gives direct evidence for it
3. "matches_count" is the number of entries in "matched_criteria"
4. Answer "accept" only when at least {MIN_MATCHED_CRITERIA} criteria are matched
5. Return ONLY the JSON object"#
    )
}

/// Profile prompt for a bare job title.
pub fn build_profile_prompt(title: &str) -> String {
    format!(
        r#"Create a vacancy profile for the job title: "{title}"

Return a JSON object with this EXACT schema (no extra fields):
{{
  "hard_skills": ["technical skill"],
  "soft_skills": ["interpersonal skill"],
  "description": "2-3 sentence description of the role and its responsibilities",
  "criteria": "Numbered list of 5-7 concrete, checkable criteria for screening resumes"
}}

RULES:
1. List 5-10 hard skills and 3-5 soft skills, most important first
2. Every criterion must be verifiable from a resume (experience, skills, education)
3. Return ONLY the JSON object"#
    )
}
