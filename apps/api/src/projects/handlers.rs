//! Axum route handlers for projects, applications and membership.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::application::{ApplicationRow, ApplicationStatus};
use crate::models::project::{Project, ProjectStatus, Role};
use crate::projects::{repository, suggestions};
use crate::session::Session;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub roles: Vec<Role>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyRequest {
    pub role_name: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: ApplicationStatus,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusResponse {
    pub application: ApplicationRow,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<Project>,
}

#[derive(Debug, Deserialize)]
pub struct SuggestRolesRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct SuggestRolesResponse {
    pub roles: Vec<Role>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/projects
pub async fn handle_create_project(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<CreateProjectRequest>,
) -> Result<(StatusCode, Json<Project>), AppError> {
    let title = request.title.trim();
    if title.is_empty() {
        return Err(AppError::Validation("title cannot be empty".to_string()));
    }
    let roles = validate_new_roles(request.roles)?;

    let project =
        repository::insert_project(&state.db, session.user_id, title, &request.description, &roles)
            .await?;

    Ok((StatusCode::CREATED, Json(project)))
}

/// GET /api/projects/:id
pub async fn handle_get_project(
    State(state): State<AppState>,
    _session: Session,
    Path(project_id): Path<Uuid>,
) -> Result<Json<Project>, AppError> {
    Ok(Json(require_project(&state, project_id).await?))
}

/// POST /api/projects/:id/apply
pub async fn handle_apply(
    State(state): State<AppState>,
    session: Session,
    Path(project_id): Path<Uuid>,
    Json(request): Json<ApplyRequest>,
) -> Result<(StatusCode, Json<ApplicationRow>), AppError> {
    let project = require_project(&state, project_id).await?;

    if project.owner_id == session.user_id {
        return Err(AppError::Forbidden);
    }
    if project.status != ProjectStatus::Open {
        return Err(AppError::Validation(
            "This project is no longer accepting applications".to_string(),
        ));
    }
    let role = project
        .roles
        .iter()
        .find(|r| r.role_name == request.role_name)
        .ok_or_else(|| AppError::NotFound(format!("Role '{}' not found", request.role_name)))?;
    if !role.is_open() {
        return Err(AppError::Validation(format!(
            "Role '{}' is already full",
            role.role_name
        )));
    }

    let application =
        repository::insert_application(&state.db, project_id, session.user_id, &role.role_name)
            .await?;

    Ok((StatusCode::CREATED, Json(application)))
}

/// GET /api/projects/:id/applications
pub async fn handle_list_applications(
    State(state): State<AppState>,
    session: Session,
    Path(project_id): Path<Uuid>,
) -> Result<Json<Vec<ApplicationRow>>, AppError> {
    require_owned_project(&state, project_id, session.user_id).await?;
    Ok(Json(
        repository::list_applications(&state.db, project_id).await?,
    ))
}

/// PATCH /api/applications/:id/status
///
/// Owner-driven pipeline: shortlist, interview, accept or reject. Accepting
/// fills the role and may complete the project. An invalid move is a 400; a
/// move the application no longer allows by the time it is locked is a 409.
pub async fn handle_update_application_status(
    State(state): State<AppState>,
    session: Session,
    Path(application_id): Path<Uuid>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<UpdateStatusResponse>, AppError> {
    let application = repository::get_application(&state.db, application_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Application {application_id} not found")))?;

    require_owned_project(&state, application.project_id, session.user_id).await?;

    let current = ApplicationStatus::parse(&application.status).ok_or_else(|| {
        anyhow::anyhow!(
            "application {} has unknown status '{}'",
            application.id,
            application.status
        )
    })?;
    if !current.can_transition_to(request.status) {
        return Err(AppError::Validation(format!(
            "Cannot move application from {} to {}",
            current.as_str(),
            request.status.as_str()
        )));
    }

    let response = if request.status == ApplicationStatus::Accepted {
        let (application, project) =
            repository::accept_application(&state.db, application_id).await?;
        UpdateStatusResponse {
            application,
            project: Some(project),
        }
    } else {
        UpdateStatusResponse {
            application: repository::set_application_status(
                &state.db,
                application_id,
                request.status,
            )
            .await?,
            project: None,
        }
    };

    Ok(Json(response))
}

/// DELETE /api/projects/:id/members/:user_id
///
/// Frees the member's seat; a COMPLETED project reopens.
pub async fn handle_remove_member(
    State(state): State<AppState>,
    session: Session,
    Path((project_id, member_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Project>, AppError> {
    require_owned_project(&state, project_id, session.user_id).await?;
    Ok(Json(
        repository::remove_member(&state.db, project_id, member_id).await?,
    ))
}

/// POST /api/projects/suggest-roles
pub async fn handle_suggest_roles(
    State(state): State<AppState>,
    _session: Session,
    Json(request): Json<SuggestRolesRequest>,
) -> Result<Json<SuggestRolesResponse>, AppError> {
    if request.title.trim().is_empty() && request.description.trim().is_empty() {
        return Err(AppError::Validation(
            "title or description is required".to_string(),
        ));
    }

    let roles = suggestions::suggest_roles(&state.llm, &request.title, &request.description).await?;
    Ok(Json(SuggestRolesResponse { roles }))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

pub(crate) async fn require_project(state: &AppState, project_id: Uuid) -> Result<Project, AppError> {
    repository::get_project(&state.db, project_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Project {project_id} not found")))
}

pub(crate) async fn require_owned_project(
    state: &AppState,
    project_id: Uuid,
    user_id: Uuid,
) -> Result<Project, AppError> {
    let project = require_project(state, project_id).await?;
    if project.owner_id != user_id {
        return Err(AppError::Forbidden);
    }
    Ok(project)
}

/// New roles need a unique, non-empty name and a headcount; nobody is seated
/// yet.
fn validate_new_roles(roles: Vec<Role>) -> Result<Vec<Role>, AppError> {
    let mut seen = std::collections::HashSet::new();
    roles
        .into_iter()
        .map(|mut role| {
            role.role_name = role.role_name.trim().to_string();
            if role.role_name.is_empty() {
                return Err(AppError::Validation("roleName cannot be empty".to_string()));
            }
            if role.needed == 0 {
                return Err(AppError::Validation(format!(
                    "Role '{}' must need at least one person",
                    role.role_name
                )));
            }
            if !seen.insert(role.role_name.clone()) {
                return Err(AppError::Validation(format!(
                    "Duplicate role '{}'",
                    role.role_name
                )));
            }
            role.filled = 0;
            Ok(role)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn roles(value: serde_json::Value) -> Vec<Role> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_new_roles_reset_filled_and_trim_names() {
        let validated = validate_new_roles(roles(json!([
            {"roleName": " Backend ", "mandatorySkills": ["Go"], "needed": 2, "filled": 2}
        ])))
        .unwrap();

        assert_eq!(validated[0].role_name, "Backend");
        assert_eq!(validated[0].filled, 0);
        assert!(validated[0].is_open());
    }

    #[test]
    fn test_new_roles_require_headcount() {
        let result = validate_new_roles(roles(json!([{"roleName": "Backend"}])));
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_new_roles_reject_blank_and_duplicate_names() {
        let blank = validate_new_roles(roles(json!([{"roleName": "  ", "needed": 1}])));
        assert!(matches!(blank, Err(AppError::Validation(_))));

        let duplicate = validate_new_roles(roles(json!([
            {"roleName": "Design", "needed": 1},
            {"roleName": "Design ", "needed": 1}
        ])));
        assert!(matches!(duplicate, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_update_status_request_uses_upper_case() {
        let request: UpdateStatusRequest =
            serde_json::from_value(json!({"status": "SHORTLISTED"})).unwrap();
        assert_eq!(request.status, ApplicationStatus::Shortlisted);
        assert!(serde_json::from_value::<UpdateStatusRequest>(json!({"status": "hired"})).is_err());
    }
}
