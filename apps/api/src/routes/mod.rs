pub mod health;

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};

use crate::matching::handlers as matching;
use crate::projects::handlers as projects;
use crate::state::AppState;
use crate::users::handlers as users;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Users
        .route("/api/users/me", get(users::handle_get_me))
        .route("/api/users/me/skills", put(users::handle_update_skills))
        // Projects
        .route("/api/projects", post(projects::handle_create_project))
        .route(
            "/api/projects/match-profiles",
            post(matching::handle_match_profiles),
        )
        .route(
            "/api/projects/suggest-roles",
            post(projects::handle_suggest_roles),
        )
        .route("/api/projects/:id", get(projects::handle_get_project))
        .route("/api/projects/:id/apply", post(projects::handle_apply))
        .route(
            "/api/projects/:id/applications",
            get(projects::handle_list_applications),
        )
        .route(
            "/api/projects/:id/members/:user_id",
            delete(projects::handle_remove_member),
        )
        .route(
            "/api/applications/:id/status",
            patch(projects::handle_update_application_status),
        )
        // Dashboard
        .route(
            "/api/dashboard/recommendations",
            get(matching::handle_recommendations),
        )
        .route(
            "/api/dashboard/skills-analytics",
            get(matching::handle_skills_analytics),
        )
        .with_state(state)
}
