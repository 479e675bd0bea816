// Skill-match scoring engine.
// Pure and synchronous: callers fetch users, projects and applications first
// and hand in materialized snapshots. Nothing here touches the database.

pub mod demand;
pub mod handlers;
pub mod normalize;
pub mod ranker;
pub mod scorer;

use uuid::Uuid;

/// The acting user, passed explicitly into ranking instead of read from
/// request-global session state.
#[derive(Debug, Clone)]
pub struct ViewerContext {
    pub user_id: Uuid,
    pub skills: Vec<String>,
}
