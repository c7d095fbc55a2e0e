use serde_json::Value;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::info;

use crate::models::profile::{ProfileRow, ProfileUpdate};

pub async fn get_profile(pool: &SqlitePool, user_id: &str) -> Result<Option<ProfileRow>, sqlx::Error> {
    sqlx::query_as::<_, ProfileRow>("SELECT * FROM profiles WHERE id = ?")
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

/// Inserts an empty profile with no Telegram chats.
pub async fn create_profile(pool: &SqlitePool, user_id: &str) -> Result<ProfileRow, sqlx::Error> {
    sqlx::query("INSERT OR IGNORE INTO profiles (id, telegram_chat_ids) VALUES (?, '[]')")
        .bind(user_id)
        .execute(pool)
        .await?;

    info!("Created profile for user {user_id}");

    sqlx::query_as::<_, ProfileRow>("SELECT * FROM profiles WHERE id = ?")
        .bind(user_id)
        .fetch_one(pool)
        .await
}

pub async fn get_or_create_profile(pool: &SqlitePool, user_id: &str) -> Result<ProfileRow, sqlx::Error> {
    match get_profile(pool, user_id).await? {
        Some(profile) => Ok(profile),
        None => create_profile(pool, user_id).await,
    }
}

/// Writes the `Some` fields of `update`. Returns the profile as stored afterwards,
/// or `None` when no profile exists for `user_id`.
pub async fn update_profile(
    pool: &SqlitePool,
    user_id: &str,
    update: &ProfileUpdate,
) -> Result<Option<ProfileRow>, sqlx::Error> {
    let text_columns: [(&str, &Option<String>); 11] = [
        ("company_name", &update.company_name),
        ("company_description", &update.company_description),
        ("hh_client_id", &update.hh_client_id),
        ("hh_employer_id", &update.hh_employer_id),
        ("hh_access_token", &update.hh_access_token),
        ("hh_refresh_token", &update.hh_refresh_token),
        ("email_provider", &update.email_provider),
        ("email_address", &update.email_address),
        ("email_access_token", &update.email_access_token),
        ("email_refresh_token", &update.email_refresh_token),
        ("email_token_expiry", &update.email_token_expiry),
    ];

    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE profiles SET ");
    let mut assignments = builder.separated(", ");
    let mut touched = 0;

    for (column, value) in text_columns {
        if let Some(value) = value {
            assignments.push(format!("{column} = "));
            assignments.push_bind_unseparated(value.clone());
            touched += 1;
        }
    }
    if let Some(chat_ids) = &update.telegram_chat_ids {
        assignments.push("telegram_chat_ids = ");
        assignments.push_bind_unseparated(Value::Array(chat_ids.clone()).to_string());
        touched += 1;
    }
    if let Some(is_paid) = update.is_paid {
        assignments.push("is_paid = ");
        assignments.push_bind_unseparated(i64::from(is_paid));
        touched += 1;
    }

    if touched > 0 {
        builder.push(" WHERE id = ");
        builder.push_bind(user_id);
        builder.build().execute(pool).await?;
        info!("Updated {touched} profile field(s) for user {user_id}");
    }

    get_profile(pool, user_id).await
}
