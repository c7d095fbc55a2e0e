use serde::Serialize;
use sqlx::SqlitePool;

use crate::screening::verdict::Verdict;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub vacancies: i64,
    pub candidates: i64,
    pub accepted: i64,
    pub rejected: i64,
}

/// Counts a user's vacancies and candidates, and splits candidates by the
/// verdict stored in their analysis. Rows whose analysis is missing or not
/// JSON are counted as candidates only.
pub async fn dashboard_stats(pool: &SqlitePool, user_id: &str) -> Result<DashboardStats, sqlx::Error> {
    let vacancies: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM vacancies WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(pool)
        .await?;

    let candidates: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM candidates WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(pool)
        .await?;

    let accepted = count_with_verdict(pool, user_id, Verdict::Accept).await?;
    let rejected = count_with_verdict(pool, user_id, Verdict::Reject).await?;

    Ok(DashboardStats {
        vacancies,
        candidates,
        accepted,
        rejected,
    })
}

async fn count_with_verdict(
    pool: &SqlitePool,
    user_id: &str,
    verdict: Verdict,
) -> Result<i64, sqlx::Error> {
    // json_extract raises on malformed text, so it only runs behind json_valid.
    sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM candidates
        WHERE user_id = ?
          AND (CASE WHEN json_valid(analysis_result)
                    THEN json_extract(analysis_result, '$.verdict') END) = ?
        "#,
    )
    .bind(user_id)
    .bind(verdict.as_str())
    .fetch_one(pool)
    .await
}
