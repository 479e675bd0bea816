use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatus {
    Pending,
    Shortlisted,
    Interviewing,
    Accepted,
    Rejected,
    Removed,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "PENDING",
            ApplicationStatus::Shortlisted => "SHORTLISTED",
            ApplicationStatus::Interviewing => "INTERVIEWING",
            ApplicationStatus::Accepted => "ACCEPTED",
            ApplicationStatus::Rejected => "REJECTED",
            ApplicationStatus::Removed => "REMOVED",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "PENDING" => Some(ApplicationStatus::Pending),
            "SHORTLISTED" => Some(ApplicationStatus::Shortlisted),
            "INTERVIEWING" => Some(ApplicationStatus::Interviewing),
            "ACCEPTED" => Some(ApplicationStatus::Accepted),
            "REJECTED" => Some(ApplicationStatus::Rejected),
            "REMOVED" => Some(ApplicationStatus::Removed),
            _ => None,
        }
    }

    /// Transitions an owner may apply directly. `Accepted -> Removed` is only
    /// reachable through member removal.
    pub fn can_transition_to(&self, next: ApplicationStatus) -> bool {
        use ApplicationStatus::*;
        matches!(
            (self, next),
            (Pending, Shortlisted | Interviewing | Accepted | Rejected)
                | (Shortlisted, Interviewing | Accepted | Rejected)
                | (Interviewing, Accepted | Rejected)
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRow {
    pub id: Uuid,
    pub project_id: Uuid,
    pub applicant_id: Uuid,
    pub role_name: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}
