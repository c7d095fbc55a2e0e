use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::AppError;
use crate::models::candidate::{CandidateView, NewCandidate};
use crate::models::profile::{ProfileUpdate, ProfileView};
use crate::models::vacancy::{NewVacancy, VacancyRow};
use crate::records::stats::{dashboard_stats, DashboardStats};
use crate::records::{candidates, profiles, vacancies};
use crate::state::AppState;

#[derive(Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    fn ok() -> Json<Self> {
        Json(SuccessResponse { success: true })
    }
}

/// Candidate payload from the web app. `salary` and `analysis_result` arrive
/// either as text or as JSON values and are stored as text.
#[derive(Deserialize)]
pub struct SaveCandidateRequest {
    pub id: i64,
    pub user_id: String,
    pub vacancy_id: i64,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub salary: Option<Value>,
    #[serde(default)]
    pub resume_url: Option<String>,
    #[serde(default)]
    pub analysis_result: Option<Value>,
}

fn value_to_text(value: Option<Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(text) => Some(text),
        other => Some(other.to_string()),
    }
}

impl From<SaveCandidateRequest> for NewCandidate {
    fn from(req: SaveCandidateRequest) -> Self {
        NewCandidate {
            id: req.id,
            user_id: req.user_id,
            vacancy_id: req.vacancy_id,
            full_name: req.full_name.unwrap_or_default(),
            analysis_result: value_to_text(req.analysis_result),
            email: req.email,
            phone: req.phone,
            salary: value_to_text(req.salary),
            resume_url: req.resume_url,
        }
    }
}

/// GET /api/profile/:user_id
pub async fn handle_get_profile(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ProfileView>, AppError> {
    let profile = profiles::get_or_create_profile(&state.db, &user_id).await?;
    Ok(Json(profile.into()))
}

/// PUT /api/profile/:user_id
pub async fn handle_update_profile(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<ProfileView>, AppError> {
    profiles::get_or_create_profile(&state.db, &user_id).await?;
    let profile = profiles::update_profile(&state.db, &user_id, &update)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile {user_id} not found")))?;
    Ok(Json(profile.into()))
}

/// POST /api/vacancies
pub async fn handle_save_vacancy(
    State(state): State<AppState>,
    Json(vacancy): Json<NewVacancy>,
) -> Result<Json<SuccessResponse>, AppError> {
    vacancies::save_vacancy(&state.db, &vacancy).await?;
    Ok(SuccessResponse::ok())
}

/// GET /api/vacancies/list/:user_id
pub async fn handle_list_vacancies(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<VacancyRow>>, AppError> {
    Ok(Json(vacancies::list_vacancies(&state.db, &user_id).await?))
}

/// GET /api/vacancies/:vacancy_id/:user_id
pub async fn handle_get_vacancy(
    State(state): State<AppState>,
    Path((vacancy_id, user_id)): Path<(i64, String)>,
) -> Result<Json<VacancyRow>, AppError> {
    vacancies::get_vacancy(&state.db, vacancy_id, &user_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Vacancy not found".to_string()))
}

/// POST /api/candidates
pub async fn handle_save_candidate(
    State(state): State<AppState>,
    Json(req): Json<SaveCandidateRequest>,
) -> Result<Json<SuccessResponse>, AppError> {
    candidates::save_candidate(&state.db, &req.into()).await?;
    Ok(SuccessResponse::ok())
}

/// GET /api/candidates/list/:user_id/:vacancy_id
pub async fn handle_list_candidates(
    State(state): State<AppState>,
    Path((user_id, vacancy_id)): Path<(String, i64)>,
) -> Result<Json<Vec<CandidateView>>, AppError> {
    let rows = candidates::list_candidates(&state.db, &user_id, vacancy_id).await?;
    Ok(Json(rows.into_iter().map(CandidateView::from).collect()))
}

/// GET /api/candidates/:candidate_id/:user_id
pub async fn handle_get_candidate(
    State(state): State<AppState>,
    Path((candidate_id, user_id)): Path<(i64, String)>,
) -> Result<Json<CandidateView>, AppError> {
    candidates::get_candidate(&state.db, candidate_id, &user_id)
        .await?
        .map(|row| Json(row.into()))
        .ok_or_else(|| AppError::NotFound("Candidate not found".to_string()))
}

/// GET /api/dashboard/stats/:user_id
pub async fn handle_dashboard_stats(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<DashboardStats>, AppError> {
    Ok(Json(dashboard_stats(&state.db, &user_id).await?))
}
