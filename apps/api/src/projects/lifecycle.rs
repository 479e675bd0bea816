//! Role headcount bookkeeping and the OPEN/COMPLETED project status it drives.

use thiserror::Error;

use crate::models::project::{ProjectStatus, Role};

#[derive(Debug, Error, PartialEq)]
pub enum LifecycleError {
    #[error("Role '{0}' does not exist on this project")]
    UnknownRole(String),

    #[error("Role '{0}' is already full")]
    RoleFull(String),

    #[error("Role '{0}' has no members to remove")]
    RoleEmpty(String),
}

/// COMPLETED once every role is filled; a project with no roles stays OPEN.
pub fn derive_status(roles: &[Role]) -> ProjectStatus {
    if !roles.is_empty() && roles.iter().all(|r| r.filled >= r.needed) {
        ProjectStatus::Completed
    } else {
        ProjectStatus::Open
    }
}

pub fn fill_role(roles: &mut [Role], role_name: &str) -> Result<(), LifecycleError> {
    let role = find_role(roles, role_name)?;
    if !role.is_open() {
        return Err(LifecycleError::RoleFull(role_name.to_string()));
    }
    role.filled += 1;
    Ok(())
}

pub fn vacate_role(roles: &mut [Role], role_name: &str) -> Result<(), LifecycleError> {
    let role = find_role(roles, role_name)?;
    if role.filled == 0 {
        return Err(LifecycleError::RoleEmpty(role_name.to_string()));
    }
    role.filled -= 1;
    Ok(())
}

fn find_role<'a>(roles: &'a mut [Role], role_name: &str) -> Result<&'a mut Role, LifecycleError> {
    roles
        .iter_mut()
        .find(|r| r.role_name == role_name)
        .ok_or_else(|| LifecycleError::UnknownRole(role_name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role(name: &str, needed: u32, filled: u32) -> Role {
        Role {
            role_name: name.to_string(),
            mandatory_skills: vec!["Rust".to_string()],
            optional_skills: vec![],
            needed,
            filled,
        }
    }

    #[test]
    fn test_status_completed_only_when_all_filled() {
        assert_eq!(
            derive_status(&[role("a", 1, 1), role("b", 2, 1)]),
            ProjectStatus::Open
        );
        assert_eq!(
            derive_status(&[role("a", 1, 1), role("b", 2, 2)]),
            ProjectStatus::Completed
        );
    }

    #[test]
    fn test_project_without_roles_stays_open() {
        assert_eq!(derive_status(&[]), ProjectStatus::Open);
    }

    #[test]
    fn test_last_fill_completes_and_removal_reopens() {
        let mut roles = vec![role("Backend", 1, 0), role("Design", 1, 1)];

        fill_role(&mut roles, "Backend").unwrap();
        assert_eq!(roles[0].filled, 1);
        assert_eq!(derive_status(&roles), ProjectStatus::Completed);

        vacate_role(&mut roles, "Design").unwrap();
        assert_eq!(roles[1].filled, 0);
        assert_eq!(derive_status(&roles), ProjectStatus::Open);
    }

    #[test]
    fn test_fill_rejects_full_role() {
        let mut roles = vec![role("Backend", 1, 1)];
        assert_eq!(
            fill_role(&mut roles, "Backend"),
            Err(LifecycleError::RoleFull("Backend".to_string()))
        );
        assert_eq!(roles[0].filled, 1);
    }

    #[test]
    fn test_vacate_rejects_empty_role() {
        let mut roles = vec![role("Backend", 1, 0)];
        assert_eq!(
            vacate_role(&mut roles, "Backend"),
            Err(LifecycleError::RoleEmpty("Backend".to_string()))
        );
    }

    #[test]
    fn test_unknown_role() {
        let mut roles = vec![role("Backend", 1, 0)];
        assert_eq!(
            fill_role(&mut roles, "backend"),
            Err(LifecycleError::UnknownRole("backend".to_string()))
        );
    }
}
