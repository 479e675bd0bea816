use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A user exactly as stored. Skills live in two columns: `skills` and the
/// legacy `tech_stack`. Writers keep both in sync; readers go through
/// [`UserRow::into_candidate`].
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub skills: Option<Vec<String>>,
    pub tech_stack: Option<Vec<String>>,
}

/// Canonical user record handed to the matching engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub skills: Vec<String>,
}

impl UserRow {
    /// Merges the two skill columns: `skills` wins when populated, otherwise
    /// `tech_stack`, otherwise empty.
    pub fn into_candidate(self) -> Candidate {
        let skills = match (self.skills, self.tech_stack) {
            (Some(skills), _) if !skills.is_empty() => skills,
            (_, Some(tech_stack)) => tech_stack,
            _ => Vec::new(),
        };

        Candidate {
            id: self.id,
            name: self.name,
            email: self.email,
            skills,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(skills: Option<Vec<&str>>, tech_stack: Option<Vec<&str>>) -> UserRow {
        let owned = |v: Vec<&str>| -> Vec<String> { v.into_iter().map(String::from).collect() };
        UserRow {
            id: Uuid::new_v4(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            skills: skills.map(owned),
            tech_stack: tech_stack.map(owned),
        }
    }

    #[test]
    fn test_skills_column_preferred() {
        let candidate = row(Some(vec!["Rust"]), Some(vec!["Go"])).into_candidate();
        assert_eq!(candidate.skills, vec!["Rust"]);
    }

    #[test]
    fn test_falls_back_to_tech_stack_when_skills_empty() {
        let candidate = row(Some(vec![]), Some(vec!["Go", "Docker"])).into_candidate();
        assert_eq!(candidate.skills, vec!["Go", "Docker"]);

        let candidate = row(None, Some(vec!["Go"])).into_candidate();
        assert_eq!(candidate.skills, vec!["Go"]);
    }

    #[test]
    fn test_no_skill_columns_yields_empty() {
        assert!(row(None, None).into_candidate().skills.is_empty());
    }
}
