use anyhow::anyhow;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// Reads a skill list that may be absent or `null` as an empty list.
pub fn skill_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// A named position within a project. Open while `filled < needed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub role_name: String,
    #[serde(default, deserialize_with = "skill_list")]
    pub mandatory_skills: Vec<String>,
    #[serde(default, deserialize_with = "skill_list")]
    pub optional_skills: Vec<String>,
    #[serde(default)]
    pub needed: u32,
    #[serde(default)]
    pub filled: u32,
}

impl Role {
    pub fn is_open(&self) -> bool {
        self.filled < self.needed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectStatus {
    Open,
    Completed,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Open => "OPEN",
            ProjectStatus::Completed => "COMPLETED",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "OPEN" => Some(ProjectStatus::Open),
            "COMPLETED" => Some(ProjectStatus::Completed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct ProjectRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub status: String,
    pub roles: Json<Vec<Role>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub status: ProjectStatus,
    pub roles: Vec<Role>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<ProjectRow> for Project {
    type Error = anyhow::Error;

    fn try_from(row: ProjectRow) -> Result<Self, Self::Error> {
        let status = ProjectStatus::parse(&row.status)
            .ok_or_else(|| anyhow!("project {} has unknown status '{}'", row.id, row.status))?;

        Ok(Project {
            id: row.id,
            owner_id: row.owner_id,
            title: row.title,
            description: row.description,
            status,
            roles: row.roles.0,
            created_at: row.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_role_null_and_missing_skill_lists_are_empty() {
        let role: Role = serde_json::from_value(json!({
            "roleName": "Designer",
            "mandatorySkills": null,
            "needed": 1
        }))
        .unwrap();

        assert!(role.mandatory_skills.is_empty());
        assert!(role.optional_skills.is_empty());
        assert_eq!(role.filled, 0);
        assert!(role.is_open());
    }

    #[test]
    fn test_role_is_open_tracks_headcount() {
        let mut role: Role = serde_json::from_value(json!({
            "roleName": "Backend",
            "mandatorySkills": ["Go"],
            "needed": 2,
            "filled": 1
        }))
        .unwrap();
        assert!(role.is_open());

        role.filled = 2;
        assert!(!role.is_open());
    }

    #[test]
    fn test_status_round_trips_through_column_text() {
        for status in [ProjectStatus::Open, ProjectStatus::Completed] {
            assert_eq!(ProjectStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ProjectStatus::parse("open"), None);
    }

    #[test]
    fn test_unknown_status_row_is_rejected() {
        let row = ProjectRow {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            title: "t".to_string(),
            description: "d".to_string(),
            status: "ARCHIVED".to_string(),
            roles: Json(vec![]),
            created_at: Utc::now(),
        };
        assert!(Project::try_from(row).is_err());
    }
}
