use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct VacancyRow {
    /// hh.ru vacancy id.
    pub id: i64,
    pub user_id: String,
    pub title: String,
    /// Screening criteria handed to the verdict pipeline.
    pub pro_talk_criteria: Option<String>,
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewVacancy {
    pub id: i64,
    pub user_id: String,
    pub title: String,
    #[serde(default)]
    pub pro_talk_criteria: Option<String>,
}
