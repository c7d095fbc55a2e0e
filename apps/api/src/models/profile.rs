use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

/// A recruiter's profile as stored. `telegram_chat_ids` is a JSON array encoded
/// as text and `is_paid` is 0/1.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProfileRow {
    pub id: String,
    pub company_name: Option<String>,
    pub company_description: Option<String>,
    pub hh_client_id: Option<String>,
    pub hh_employer_id: Option<String>,
    pub hh_access_token: Option<String>,
    pub hh_refresh_token: Option<String>,
    pub telegram_chat_ids: Option<String>,
    pub is_paid: i64,
    pub email_provider: Option<String>,
    pub email_address: Option<String>,
    pub email_access_token: Option<String>,
    pub email_refresh_token: Option<String>,
    pub email_token_expiry: Option<String>,
    pub created_at: Option<NaiveDateTime>,
}

/// Partial profile update. Only `Some` fields are written.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub company_name: Option<String>,
    pub company_description: Option<String>,
    pub hh_client_id: Option<String>,
    pub hh_employer_id: Option<String>,
    pub hh_access_token: Option<String>,
    pub hh_refresh_token: Option<String>,
    pub telegram_chat_ids: Option<Vec<Value>>,
    pub is_paid: Option<bool>,
    pub email_provider: Option<String>,
    pub email_address: Option<String>,
    pub email_access_token: Option<String>,
    pub email_refresh_token: Option<String>,
    pub email_token_expiry: Option<String>,
}

/// Profile as the web app sees it: chat ids decoded, `is_paid` as a bool.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileView {
    pub id: String,
    pub company_name: Option<String>,
    pub company_description: Option<String>,
    pub hh_client_id: Option<String>,
    pub hh_employer_id: Option<String>,
    pub hh_access_token: Option<String>,
    pub hh_refresh_token: Option<String>,
    pub telegram_chat_ids: Vec<Value>,
    pub is_paid: bool,
    pub email_provider: Option<String>,
    pub email_address: Option<String>,
    pub email_token_expiry: Option<String>,
    pub created_at: Option<NaiveDateTime>,
}

impl From<ProfileRow> for ProfileView {
    fn from(row: ProfileRow) -> Self {
        let telegram_chat_ids = row
            .telegram_chat_ids
            .as_deref()
            .and_then(|raw| serde_json::from_str::<Vec<Value>>(raw).ok())
            .unwrap_or_default();

        ProfileView {
            id: row.id,
            company_name: row.company_name,
            company_description: row.company_description,
            hh_client_id: row.hh_client_id,
            hh_employer_id: row.hh_employer_id,
            hh_access_token: row.hh_access_token,
            hh_refresh_token: row.hh_refresh_token,
            telegram_chat_ids,
            is_paid: row.is_paid != 0,
            email_provider: row.email_provider,
            email_address: row.email_address,
            email_token_expiry: row.email_token_expiry,
            created_at: row.created_at,
        }
    }
}
