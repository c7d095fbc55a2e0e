use anyhow::Result;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tracing::info;

/// Opens the single-file SQLite store and makes sure the tables exist.
pub async fn create_pool(database_url: &str) -> Result<SqlitePool> {
    info!("Connecting to SQLite at {database_url}...");

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    init_schema(&pool).await?;

    info!("SQLite store ready");
    Ok(pool)
}

/// Creates the profile, vacancy and candidate tables if they are missing.
/// Rows are keyed by external ids (hh.ru vacancy ids, Telegram user ids), so no
/// foreign keys are declared.
async fn init_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS profiles (
            id TEXT PRIMARY KEY,
            company_name TEXT,
            company_description TEXT,
            hh_client_id TEXT,
            hh_employer_id TEXT,
            hh_access_token TEXT,
            hh_refresh_token TEXT,
            telegram_chat_ids TEXT,
            is_paid INTEGER NOT NULL DEFAULT 0,
            email_provider TEXT,
            email_address TEXT,
            email_access_token TEXT,
            email_refresh_token TEXT,
            email_token_expiry TEXT,
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS vacancies (
            id INTEGER PRIMARY KEY,
            user_id TEXT NOT NULL,
            title TEXT NOT NULL,
            pro_talk_criteria TEXT,
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS candidates (
            id INTEGER PRIMARY KEY,
            user_id TEXT NOT NULL,
            vacancy_id INTEGER,
            full_name TEXT,
            email TEXT,
            phone TEXT,
            salary TEXT,
            resume_url TEXT,
            analysis_result TEXT,
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
