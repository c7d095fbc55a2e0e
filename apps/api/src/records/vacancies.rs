use sqlx::SqlitePool;
use tracing::info;

use crate::models::vacancy::{NewVacancy, VacancyRow};

/// Inserts the vacancy, replacing any existing row with the same id.
pub async fn save_vacancy(pool: &SqlitePool, vacancy: &NewVacancy) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT OR REPLACE INTO vacancies (id, user_id, title, pro_talk_criteria) VALUES (?, ?, ?, ?)",
    )
    .bind(vacancy.id)
    .bind(&vacancy.user_id)
    .bind(&vacancy.title)
    .bind(&vacancy.pro_talk_criteria)
    .execute(pool)
    .await?;

    info!("Saved vacancy {} for user {}", vacancy.id, vacancy.user_id);
    Ok(())
}

pub async fn get_vacancy(
    pool: &SqlitePool,
    vacancy_id: i64,
    user_id: &str,
) -> Result<Option<VacancyRow>, sqlx::Error> {
    sqlx::query_as::<_, VacancyRow>("SELECT * FROM vacancies WHERE id = ? AND user_id = ?")
        .bind(vacancy_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

/// All vacancies of a user, newest first.
pub async fn list_vacancies(pool: &SqlitePool, user_id: &str) -> Result<Vec<VacancyRow>, sqlx::Error> {
    sqlx::query_as::<_, VacancyRow>(
        "SELECT * FROM vacancies WHERE user_id = ? ORDER BY created_at DESC, rowid DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}
