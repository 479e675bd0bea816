//! Axum route handlers that feed fetched snapshots into the matching engine.

use std::collections::HashSet;

use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;
use crate::matching::demand::{skills_analytics, SkillsAnalytics};
use crate::matching::ranker::{
    match_candidates, recommend_projects, CandidateMatches, ProjectRecommendation,
};
use crate::matching::ViewerContext;
use crate::models::project::Role;
use crate::projects::handlers::require_owned_project;
use crate::projects::repository as projects;
use crate::session::Session;
use crate::state::AppState;
use crate::users::{load_candidate, repository as users};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchProfilesRequest {
    #[serde(default)]
    pub roles: Option<Vec<Role>>,
    #[serde(default)]
    pub project_id: Option<Uuid>,
}

/// Parses the body by hand so a missing or non-array `roles` is a 400 rather
/// than the extractor's 422.
pub fn parse_match_request(body: Value) -> Result<MatchProfilesRequest, AppError> {
    let request: MatchProfilesRequest = serde_json::from_value(body)
        .map_err(|e| AppError::Validation(format!("Invalid match request: {e}")))?;

    if request.roles.is_none() && request.project_id.is_none() {
        return Err(AppError::Validation(
            "roles or projectId is required".to_string(),
        ));
    }
    Ok(request)
}

/// POST /api/projects/match-profiles
///
/// Finds the best-fitting users for a set of roles. With `projectId` the
/// caller must own the project; its open roles are used when `roles` is
/// omitted and anyone who already applied is left out.
pub async fn handle_match_profiles(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<Value>,
) -> Result<Json<CandidateMatches>, AppError> {
    let request = parse_match_request(body)?;

    let mut excluded: HashSet<Uuid> = HashSet::from([session.user_id]);
    let roles = match request.project_id {
        Some(project_id) => {
            let project = require_owned_project(&state, project_id, session.user_id).await?;
            excluded.extend(projects::applicant_ids(&state.db, project_id).await?);
            request.roles.unwrap_or_else(|| {
                project.roles.into_iter().filter(|r| r.is_open()).collect()
            })
        }
        None => request.roles.unwrap_or_default(),
    };

    if roles.is_empty() {
        return Err(AppError::Validation(
            "At least one role is required to match against".to_string(),
        ));
    }

    let candidates = users::list_candidates(&state.db).await?;
    let result = match_candidates(&roles, &candidates, &excluded);

    debug!(
        "match-profiles: {} roles, {} candidates, {} matches",
        roles.len(),
        candidates.len(),
        result.total_matches
    );
    Ok(Json(result))
}

/// GET /api/dashboard/recommendations
pub async fn handle_recommendations(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<Vec<ProjectRecommendation>>, AppError> {
    let viewer = viewer_context(&state, session).await?;

    let open_projects = projects::list_open_projects(&state.db).await?;
    let applied = projects::applied_project_ids(&state.db, viewer.user_id).await?;

    Ok(Json(recommend_projects(&viewer, &open_projects, &applied)))
}

/// GET /api/dashboard/skills-analytics
pub async fn handle_skills_analytics(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<SkillsAnalytics>, AppError> {
    let viewer = viewer_context(&state, session).await?;
    let open_projects = projects::list_open_projects(&state.db).await?;

    Ok(Json(skills_analytics(&viewer.skills, &open_projects)))
}

async fn viewer_context(state: &AppState, session: Session) -> Result<ViewerContext, AppError> {
    let candidate = load_candidate(&state.db, session.user_id).await?;
    Ok(ViewerContext {
        user_id: candidate.id,
        skills: candidate.skills,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_requires_roles_or_project() {
        assert!(matches!(
            parse_match_request(json!({})),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_parse_rejects_non_array_roles() {
        assert!(matches!(
            parse_match_request(json!({"roles": "backend"})),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_parse_accepts_roles_with_missing_optional_skills() {
        let request = parse_match_request(json!({
            "roles": [{"roleName": "Backend", "mandatorySkills": ["Go"], "needed": 1}]
        }))
        .unwrap();

        let roles = request.roles.unwrap();
        assert_eq!(roles.len(), 1);
        assert!(roles[0].optional_skills.is_empty());
        assert!(request.project_id.is_none());
    }

    #[test]
    fn test_parse_accepts_project_only() {
        let id = Uuid::new_v4();
        let request = parse_match_request(json!({"projectId": id})).unwrap();
        assert_eq!(request.project_id, Some(id));
        assert!(request.roles.is_none());
    }
}
