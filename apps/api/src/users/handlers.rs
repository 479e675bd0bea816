use axum::{extract::State, Json};
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::project::skill_list;
use crate::models::user::Candidate;
use crate::session::Session;
use crate::state::AppState;
use crate::users::{load_candidate, repository};

#[derive(Debug, Deserialize)]
pub struct UpdateSkillsRequest {
    #[serde(default, deserialize_with = "skill_list")]
    pub skills: Vec<String>,
}

/// GET /api/users/me
pub async fn handle_get_me(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<Candidate>, AppError> {
    Ok(Json(load_candidate(&state.db, session.user_id).await?))
}

/// PUT /api/users/me/skills
///
/// Replaces the caller's skills. Blank entries are dropped; everything else is
/// stored as sent.
pub async fn handle_update_skills(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<UpdateSkillsRequest>,
) -> Result<Json<Candidate>, AppError> {
    let skills = clean_skill_input(request.skills);

    let row = repository::update_skills(&state.db, session.user_id, &skills)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", session.user_id)))?;

    Ok(Json(row.into_candidate()))
}

fn clean_skill_input(skills: Vec<String>) -> Vec<String> {
    skills.into_iter().filter(|s| !s.trim().is_empty()).collect()
}
