//! Recommendation Ranker — turns per-entity scores into capped, ordered lists.
//!
//! Sorting is stable: entities with equal scores keep the order the caller
//! fetched them in. Repositories fetch in a fixed order so results are
//! deterministic.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::matching::scorer::best_role_match;
use crate::matching::ViewerContext;
use crate::models::project::{Project, ProjectStatus, Role};
use crate::models::user::Candidate;

pub const CANDIDATE_MATCH_LIMIT: usize = 20;
pub const PROJECT_RECOMMENDATION_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateMatch {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub skills: Vec<String>,
    pub matched_role: String,
    pub match_score: u32,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateMatches {
    pub matches: Vec<CandidateMatch>,
    pub total_matches: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRecommendation {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub owner_id: Uuid,
    pub roles: Vec<Role>,
    pub match_score: u32,
}

/// Scores each candidate not in `excluded` against `roles`, keeping the best
/// role per candidate. Returns the top 20 plus the uncapped match count.
pub fn match_candidates(
    roles: &[Role],
    candidates: &[Candidate],
    excluded: &HashSet<Uuid>,
) -> CandidateMatches {
    let mut matches: Vec<CandidateMatch> = candidates
        .iter()
        .filter(|c| !excluded.contains(&c.id))
        .filter_map(|candidate| {
            let best = best_role_match(roles, &candidate.skills)?;
            Some(CandidateMatch {
                id: candidate.id,
                name: candidate.name.clone(),
                email: candidate.email.clone(),
                skills: candidate.skills.clone(),
                matched_role: best.role_name,
                match_score: best.result.score,
                matched_skills: best.result.matched_skills(),
                missing_skills: best.result.missing_skills,
            })
        })
        .collect();

    let total_matches = matches.len();
    matches.sort_by(|a, b| b.match_score.cmp(&a.match_score));
    matches.truncate(CANDIDATE_MATCH_LIMIT);

    CandidateMatches {
        matches,
        total_matches,
    }
}

/// Ranks OPEN projects for the viewer by their best role score.
///
/// Skips projects the viewer owns or has applied to. A viewer without any
/// skills gets the first 10 OPEN projects they don't own, scored 0.
pub fn recommend_projects(
    viewer: &ViewerContext,
    projects: &[Project],
    applied_project_ids: &HashSet<Uuid>,
) -> Vec<ProjectRecommendation> {
    let browsable = projects
        .iter()
        .filter(|p| p.status == ProjectStatus::Open && p.owner_id != viewer.user_id);

    if viewer.skills.is_empty() {
        return browsable
            .take(PROJECT_RECOMMENDATION_LIMIT)
            .map(|p| recommendation(p, 0))
            .collect();
    }

    let mut recommendations: Vec<ProjectRecommendation> = browsable
        .filter(|p| !applied_project_ids.contains(&p.id))
        .filter_map(|p| {
            let open_roles: Vec<Role> = p.roles.iter().filter(|r| r.is_open()).cloned().collect();
            let best = best_role_match(&open_roles, &viewer.skills)?;
            Some(recommendation(p, best.result.score))
        })
        .collect();

    recommendations.sort_by(|a, b| b.match_score.cmp(&a.match_score));
    recommendations.truncate(PROJECT_RECOMMENDATION_LIMIT);
    recommendations
}

fn recommendation(project: &Project, match_score: u32) -> ProjectRecommendation {
    ProjectRecommendation {
        id: project.id,
        title: project.title.clone(),
        description: project.description.clone(),
        owner_id: project.owner_id,
        roles: project.roles.clone(),
        match_score,
    }
}
