use std::collections::HashSet;

use anyhow::Result;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::application::{ApplicationRow, ApplicationStatus};
use crate::models::project::{Project, ProjectRow, Role};
use crate::projects::lifecycle::{derive_status, fill_role, vacate_role};

/// Inserts a new project. Status is derived from the roles, which is OPEN for
/// any project with an unfilled role.
pub async fn insert_project(
    pool: &PgPool,
    owner_id: Uuid,
    title: &str,
    description: &str,
    roles: &[Role],
) -> Result<Project> {
    let row = sqlx::query_as::<_, ProjectRow>(
        r#"
        INSERT INTO projects (id, owner_id, title, description, status, roles)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(owner_id)
    .bind(title)
    .bind(description)
    .bind(derive_status(roles).as_str())
    .bind(Json(roles))
    .fetch_one(pool)
    .await?;

    info!("Created project {} for owner {owner_id}", row.id);
    Project::try_from(row)
}

pub async fn get_project(pool: &PgPool, project_id: Uuid) -> Result<Option<Project>> {
    let row = sqlx::query_as::<_, ProjectRow>("SELECT * FROM projects WHERE id = $1")
        .bind(project_id)
        .fetch_optional(pool)
        .await?;
    row.map(Project::try_from).transpose()
}

/// All OPEN projects in creation order. Ranking relies on this order to break
/// score ties.
pub async fn list_open_projects(pool: &PgPool) -> Result<Vec<Project>> {
    sqlx::query_as::<_, ProjectRow>(
        "SELECT * FROM projects WHERE status = 'OPEN' ORDER BY created_at ASC, id ASC",
    )
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(Project::try_from)
    .collect()
}

/// Projects the user has any application record for, whatever its status.
pub async fn applied_project_ids(pool: &PgPool, user_id: Uuid) -> Result<HashSet<Uuid>> {
    let ids: Vec<Uuid> =
        sqlx::query_scalar("SELECT DISTINCT project_id FROM applications WHERE applicant_id = $1")
            .bind(user_id)
            .fetch_all(pool)
            .await?;
    Ok(ids.into_iter().collect())
}

pub async fn applicant_ids(pool: &PgPool, project_id: Uuid) -> Result<HashSet<Uuid>> {
    let ids: Vec<Uuid> =
        sqlx::query_scalar("SELECT DISTINCT applicant_id FROM applications WHERE project_id = $1")
            .bind(project_id)
            .fetch_all(pool)
            .await?;
    Ok(ids.into_iter().collect())
}

pub async fn insert_application(
    pool: &PgPool,
    project_id: Uuid,
    applicant_id: Uuid,
    role_name: &str,
) -> Result<ApplicationRow, AppError> {
    let inserted = sqlx::query_as::<_, ApplicationRow>(
        r#"
        INSERT INTO applications (id, project_id, applicant_id, role_name, status)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(project_id)
    .bind(applicant_id)
    .bind(role_name)
    .bind(ApplicationStatus::Pending.as_str())
    .fetch_one(pool)
    .await;

    match inserted {
        Ok(row) => {
            info!("User {applicant_id} applied to project {project_id} as '{role_name}'");
            Ok(row)
        }
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => Err(
            AppError::Conflict("You have already applied to this project".to_string()),
        ),
        Err(e) => Err(e.into()),
    }
}

pub async fn get_application(pool: &PgPool, application_id: Uuid) -> Result<Option<ApplicationRow>> {
    Ok(
        sqlx::query_as::<_, ApplicationRow>("SELECT * FROM applications WHERE id = $1")
            .bind(application_id)
            .fetch_optional(pool)
            .await?,
    )
}

pub async fn list_applications(pool: &PgPool, project_id: Uuid) -> Result<Vec<ApplicationRow>> {
    Ok(sqlx::query_as::<_, ApplicationRow>(
        "SELECT * FROM applications WHERE project_id = $1 ORDER BY created_at ASC, id ASC",
    )
    .bind(project_id)
    .fetch_all(pool)
    .await?)
}

/// Moves an application to a status that does not touch headcount. The move
/// is checked against the status held under the row lock.
pub async fn set_application_status(
    pool: &PgPool,
    application_id: Uuid,
    status: ApplicationStatus,
) -> Result<ApplicationRow, AppError> {
    let mut tx = pool.begin().await?;

    let application = lock_application(&mut tx, application_id).await?;
    ensure_transition(&application, status)?;

    let updated = sqlx::query_as::<_, ApplicationRow>(
        "UPDATE applications SET status = $1 WHERE id = $2 RETURNING *",
    )
    .bind(status.as_str())
    .bind(application_id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(updated)
}

/// Accepts an application: fills its role and re-derives the project status
/// in one transaction. Locks the application before the project, the same
/// order `remove_member` uses.
pub async fn accept_application(
    pool: &PgPool,
    application_id: Uuid,
) -> Result<(ApplicationRow, Project), AppError> {
    let mut tx = pool.begin().await?;

    let application = lock_application(&mut tx, application_id).await?;
    ensure_transition(&application, ApplicationStatus::Accepted)?;

    let mut project = lock_project(&mut tx, application.project_id).await?;
    fill_role(&mut project.roles, &application.role_name)?;
    let project = save_roles(&mut tx, project).await?;

    let accepted = sqlx::query_as::<_, ApplicationRow>(
        "UPDATE applications SET status = $1 WHERE id = $2 RETURNING *",
    )
    .bind(ApplicationStatus::Accepted.as_str())
    .bind(application.id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    info!(
        "Accepted application {} into '{}' on project {} (status {})",
        application.id,
        application.role_name,
        project.id,
        project.status.as_str()
    );
    Ok((accepted, project))
}

/// Removes an accepted member: vacates their role and re-derives the project
/// status in one transaction.
pub async fn remove_member(
    pool: &PgPool,
    project_id: Uuid,
    member_id: Uuid,
) -> Result<Project, AppError> {
    let mut tx = pool.begin().await?;

    let membership = sqlx::query_as::<_, ApplicationRow>(
        r#"
        SELECT * FROM applications
        WHERE project_id = $1 AND applicant_id = $2 AND status = $3
        FOR UPDATE
        "#,
    )
    .bind(project_id)
    .bind(member_id)
    .bind(ApplicationStatus::Accepted.as_str())
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| {
        AppError::NotFound(format!("User {member_id} is not a member of project {project_id}"))
    })?;

    let mut project = lock_project(&mut tx, project_id).await?;
    vacate_role(&mut project.roles, &membership.role_name)?;
    let project = save_roles(&mut tx, project).await?;

    sqlx::query("UPDATE applications SET status = $1 WHERE id = $2")
        .bind(ApplicationStatus::Removed.as_str())
        .bind(membership.id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    info!(
        "Removed member {member_id} from '{}' on project {project_id} (status {})",
        membership.role_name,
        project.status.as_str()
    );
    Ok(project)
}

async fn lock_application(
    tx: &mut Transaction<'_, Postgres>,
    application_id: Uuid,
) -> Result<ApplicationRow, AppError> {
    sqlx::query_as::<_, ApplicationRow>("SELECT * FROM applications WHERE id = $1 FOR UPDATE")
        .bind(application_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Application {application_id} not found")))
}

/// Rejects a move the locked row no longer allows, e.g. a second accept of
/// the same application or an accept racing a reject.
fn ensure_transition(locked: &ApplicationRow, next: ApplicationStatus) -> Result<(), AppError> {
    let current = ApplicationStatus::parse(&locked.status).ok_or_else(|| {
        anyhow::anyhow!(
            "application {} has unknown status '{}'",
            locked.id,
            locked.status
        )
    })?;
    if !current.can_transition_to(next) {
        return Err(AppError::Conflict(format!(
            "Application is already {} and cannot move to {}",
            current.as_str(),
            next.as_str()
        )));
    }
    Ok(())
}

async fn lock_project(
    tx: &mut Transaction<'_, Postgres>,
    project_id: Uuid,
) -> Result<Project, AppError> {
    let row = sqlx::query_as::<_, ProjectRow>("SELECT * FROM projects WHERE id = $1 FOR UPDATE")
        .bind(project_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Project {project_id} not found")))?;
    Ok(Project::try_from(row)?)
}

async fn save_roles(
    tx: &mut Transaction<'_, Postgres>,
    mut project: Project,
) -> Result<Project, AppError> {
    project.status = derive_status(&project.roles);
    sqlx::query("UPDATE projects SET roles = $1, status = $2 WHERE id = $3")
        .bind(Json(&project.roles))
        .bind(project.status.as_str())
        .bind(project.id)
        .execute(&mut **tx)
        .await?;
    Ok(project)
}
