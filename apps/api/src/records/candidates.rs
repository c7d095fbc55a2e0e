use sqlx::SqlitePool;
use tracing::info;

use crate::models::candidate::{CandidateRow, NewCandidate};

/// Inserts the candidate, replacing any existing row with the same id.
pub async fn save_candidate(pool: &SqlitePool, candidate: &NewCandidate) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT OR REPLACE INTO candidates
            (id, user_id, vacancy_id, full_name, analysis_result, email, phone, salary, resume_url)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(candidate.id)
    .bind(&candidate.user_id)
    .bind(candidate.vacancy_id)
    .bind(&candidate.full_name)
    .bind(&candidate.analysis_result)
    .bind(&candidate.email)
    .bind(&candidate.phone)
    .bind(&candidate.salary)
    .bind(&candidate.resume_url)
    .execute(pool)
    .await?;

    info!(
        "Saved candidate {} for vacancy {} (user {})",
        candidate.id, candidate.vacancy_id, candidate.user_id
    );
    Ok(())
}

pub async fn get_candidate(
    pool: &SqlitePool,
    candidate_id: i64,
    user_id: &str,
) -> Result<Option<CandidateRow>, sqlx::Error> {
    sqlx::query_as::<_, CandidateRow>("SELECT * FROM candidates WHERE id = ? AND user_id = ?")
        .bind(candidate_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

/// Candidates attached to one vacancy, newest first.
pub async fn list_candidates(
    pool: &SqlitePool,
    user_id: &str,
    vacancy_id: i64,
) -> Result<Vec<CandidateRow>, sqlx::Error> {
    sqlx::query_as::<_, CandidateRow>(
        r#"
        SELECT * FROM candidates
        WHERE user_id = ? AND vacancy_id = ?
        ORDER BY created_at DESC, rowid DESC
        "#,
    )
    .bind(user_id)
    .bind(vacancy_id)
    .fetch_all(pool)
    .await
}
