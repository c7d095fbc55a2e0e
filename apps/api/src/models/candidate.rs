use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CandidateRow {
    pub id: i64,
    pub user_id: String,
    pub vacancy_id: Option<i64>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub salary: Option<String>,
    pub resume_url: Option<String>,
    /// Serialized `VerdictResult` (or whatever the client stored).
    pub analysis_result: Option<String>,
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Default)]
pub struct NewCandidate {
    pub id: i64,
    pub user_id: String,
    pub vacancy_id: i64,
    pub full_name: String,
    pub analysis_result: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub salary: Option<String>,
    pub resume_url: Option<String>,
}

/// Candidate as returned to the web app, with the analysis decoded when it is JSON.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateView {
    pub id: i64,
    pub user_id: String,
    pub vacancy_id: Option<i64>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub salary: Option<String>,
    pub resume_url: Option<String>,
    pub analysis_result: Option<Value>,
    pub created_at: Option<NaiveDateTime>,
}

impl From<CandidateRow> for CandidateView {
    fn from(row: CandidateRow) -> Self {
        let analysis_result = row.analysis_result.map(|raw| {
            serde_json::from_str::<Value>(&raw).unwrap_or(Value::String(raw))
        });

        CandidateView {
            id: row.id,
            user_id: row.user_id,
            vacancy_id: row.vacancy_id,
            full_name: row.full_name,
            email: row.email,
            phone: row.phone,
            salary: row.salary,
            resume_url: row.resume_url,
            analysis_result,
            created_at: row.created_at,
        }
    }
}
