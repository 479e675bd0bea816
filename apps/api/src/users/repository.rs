use anyhow::Result;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::user::{Candidate, UserRow};

pub async fn get_user(pool: &PgPool, user_id: Uuid) -> Result<Option<UserRow>> {
    Ok(
        sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(pool)
            .await?,
    )
}

/// Every user as a canonical candidate, in sign-up order. Ranking relies on
/// this order to break score ties.
pub async fn list_candidates(pool: &PgPool) -> Result<Vec<Candidate>> {
    let rows = sqlx::query_as::<_, UserRow>("SELECT * FROM users ORDER BY created_at ASC, id ASC")
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(UserRow::into_candidate).collect())
}

/// Writes the skill list to both `skills` and the legacy `tech_stack` column.
pub async fn update_skills(pool: &PgPool, user_id: Uuid, skills: &[String]) -> Result<Option<UserRow>> {
    let row = sqlx::query_as::<_, UserRow>(
        "UPDATE users SET skills = $1, tech_stack = $1 WHERE id = $2 RETURNING *",
    )
    .bind(skills)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    if row.is_some() {
        info!("Updated {} skills for user {user_id}", skills.len());
    }
    Ok(row)
}
