//! Profile generation: synthesises a vacancy profile from a bare job title.
//! The generated `criteria` text is what `request_verdict` later screens against.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::llm_client::{call_json, CompletionRequest, CompletionService};
use crate::screening::prompts::{build_profile_prompt, profile_system};
use crate::screening::verdict::EvaluationStatus;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VacancyProfile {
    pub status: EvaluationStatus,
    pub hard_skills: String,
    pub soft_skills: String,
    pub description: String,
    pub criteria: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl VacancyProfile {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            status: EvaluationStatus::Error,
            hard_skills: String::new(),
            soft_skills: String::new(),
            description: String::new(),
            criteria: String::new(),
            error: Some(message.into()),
        }
    }
}

/// The model may answer with a list or with already-flattened text.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TextOrList {
    Text(String),
    List(Vec<String>),
}

impl TextOrList {
    fn flatten(self, separator: &str) -> String {
        match self {
            TextOrList::Text(text) => text,
            TextOrList::List(items) => items.join(separator),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawProfile {
    #[serde(default)]
    hard_skills: Option<TextOrList>,
    #[serde(default)]
    soft_skills: Option<TextOrList>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    criteria: Option<TextOrList>,
}

impl From<RawProfile> for VacancyProfile {
    fn from(raw: RawProfile) -> Self {
        let flatten = |field: Option<TextOrList>, sep: &str| {
            field.map(|f| f.flatten(sep)).unwrap_or_default()
        };
        VacancyProfile {
            status: EvaluationStatus::Success,
            hard_skills: flatten(raw.hard_skills, ", "),
            soft_skills: flatten(raw.soft_skills, ", "),
            description: raw.description.unwrap_or_default(),
            criteria: flatten(raw.criteria, "\n"),
            error: None,
        }
    }
}

pub async fn request_vacancy_profile(llm: &dyn CompletionService, title: &str) -> VacancyProfile {
    let request = CompletionRequest::json(&profile_system(), build_profile_prompt(title));

    match call_json::<RawProfile>(llm, &request).await {
        Ok(raw) => raw.into(),
        Err(e) => {
            warn!(error = %e, title, "Vacancy profile request failed");
            VacancyProfile::failure(e.to_string())
        }
    }
}
