use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::models::candidate::NewCandidate;
use crate::records::{candidates, vacancies};
use crate::screening::extraction::extract_document_text;
use crate::screening::normalizer::ResumeRecord;
use crate::screening::pipeline::{evaluate_candidate, ResumeInput};
use crate::screening::profile::{request_vacancy_profile, VacancyProfile};
use crate::screening::verdict::VerdictResult;
use crate::state::AppState;

const PREVIEW_CHARS: usize = 500;

static LAST_UPLOAD_ID: AtomicI64 = AtomicI64::new(0);

#[derive(Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub full_resume: Option<ResumeRecord>,
    #[serde(default)]
    pub criteria: Option<String>,
}

#[derive(Deserialize)]
pub struct GenerateVacancyRequest {
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Serialize)]
pub struct UploadResponse {
    pub filename: String,
    /// First characters of the extracted text, for display.
    pub text: String,
    pub analysis: VerdictResult,
}

/// POST /api/analyze
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<VerdictResult>, AppError> {
    let record = req
        .full_resume
        .ok_or_else(|| AppError::Validation("full_resume is required".to_string()))?;

    let result = evaluate_candidate(
        state.llm.as_ref(),
        ResumeInput::Record(record),
        req.criteria.as_deref(),
    )
    .await;
    Ok(Json(result))
}

/// POST /api/vacancies/generate
pub async fn handle_generate_vacancy(
    State(state): State<AppState>,
    Json(req): Json<GenerateVacancyRequest>,
) -> Result<Json<VacancyProfile>, AppError> {
    let title = req
        .title
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::Validation("title is required".to_string()))?;

    Ok(Json(request_vacancy_profile(state.llm.as_ref(), title.trim()).await))
}

#[derive(Default)]
struct UploadForm {
    file: Option<(String, Bytes)>,
    user_id: Option<String>,
    vacancy_id: Option<String>,
}

async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(e.to_string()))?;
                form.file = Some((filename, bytes));
            }
            "user_id" | "vacancy_id" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(e.to_string()))?;
                if name == "user_id" {
                    form.user_id = Some(value);
                } else {
                    form.vacancy_id = Some(value);
                }
            }
            _ => {}
        }
    }

    Ok(form)
}

fn preview(text: &str) -> String {
    let head: String = text.chars().take(PREVIEW_CHARS).collect();
    format!("{head}...")
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

/// Candidate id for an uploaded resume: the current unix time, bumped past the
/// last id handed out so uploads within one second never share a row.
fn next_upload_id() -> i64 {
    let now = unix_now();
    let previous = LAST_UPLOAD_ID
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| Some(now.max(last + 1)))
        .unwrap_or(now);
    now.max(previous + 1)
}

/// POST /api/upload_resume
///
/// Extracts the resume text, screens it against the vacancy's criteria and
/// stores the result as a new candidate of that vacancy.
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let form = read_upload_form(multipart).await?;

    let (filename, bytes) = form
        .file
        .ok_or_else(|| AppError::Validation("file is required".to_string()))?;
    let user_id = form
        .user_id
        .ok_or_else(|| AppError::Validation("user_id is required".to_string()))?;
    let vacancy_id: i64 = form
        .vacancy_id
        .as_deref()
        .map(str::trim)
        .ok_or_else(|| AppError::Validation("vacancy_id is required".to_string()))?
        .parse()
        .map_err(|_| AppError::Validation("vacancy_id must be an integer".to_string()))?;

    let document = tokio::task::spawn_blocking(move || extract_document_text(&filename, &bytes))
        .await
        .map_err(|e| AppError::Internal(e.into()))?
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let vacancy = vacancies::get_vacancy(&state.db, vacancy_id, &user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Vacancy not found".to_string()))?;

    let analysis = evaluate_candidate(
        state.llm.as_ref(),
        ResumeInput::Text(document.text.clone()),
        vacancy.pro_talk_criteria.as_deref(),
    )
    .await;

    let candidate = NewCandidate {
        id: next_upload_id(),
        user_id,
        vacancy_id,
        full_name: document.filename.clone(),
        analysis_result: Some(serde_json::to_string(&analysis).map_err(anyhow::Error::from)?),
        resume_url: Some("local_file".to_string()),
        ..Default::default()
    };
    candidates::save_candidate(&state.db, &candidate).await?;

    info!(
        "Uploaded resume {} screened for vacancy {vacancy_id}: {}",
        document.filename,
        analysis.verdict.as_str()
    );

    Ok(Json(UploadResponse {
        text: preview(&document.text),
        filename: document.filename,
        analysis,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_truncates_by_chars() {
        let long = "ж".repeat(600);
        let short = preview(&long);
        assert_eq!(short.chars().count(), PREVIEW_CHARS + 3);
        assert!(short.ends_with("..."));
    }

    #[test]
    fn test_preview_of_short_text_still_gets_ellipsis() {
        assert_eq!(preview("short"), "short...");
    }

    #[test]
    fn test_upload_ids_are_unique_and_increasing() {
        let ids: Vec<i64> = (0..50).map(|_| next_upload_id()).collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
        assert!(ids[0] >= unix_now() - 1);
    }

    #[test]
    fn test_analyze_request_tolerates_missing_fields() {
        let req: AnalyzeRequest = serde_json::from_str("{}").unwrap();
        assert!(req.full_resume.is_none());
        assert!(req.criteria.is_none());
    }

    #[test]
    fn test_analyze_request_accepts_wrong_section_types() {
        let req: AnalyzeRequest =
            serde_json::from_str(r#"{"full_resume": {"skill_set": "Rust", "salary": 100}}"#).unwrap();
        let record = req.full_resume.unwrap();
        assert!(record.skill_set.is_none());
        assert!(record.salary.is_none());
    }
}
