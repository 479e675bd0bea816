pub mod handlers;
pub mod repository;

use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::Candidate;

/// Loads the canonical record for a session user, 404 if the account is gone.
pub async fn load_candidate(pool: &PgPool, user_id: Uuid) -> Result<Candidate, AppError> {
    repository::get_user(pool, user_id)
        .await?
        .map(|row| row.into_candidate())
        .ok_or_else(|| AppError::NotFound(format!("User {user_id} not found")))
}
