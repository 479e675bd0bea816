//! Candidate Scorer — weighted overlap between a role's skill tags and a
//! candidate's declared skills.
//!
//! Algorithm:
//! 1. mandatory_score = matched_mandatory / |mandatory| × 70 (0 if no mandatory skills)
//! 2. optional_score  = matched_optional  / |optional|  × 30 (0 if no optional skills)
//! 3. score = round(mandatory_score + optional_score), always within 0..=100
//!
//! A role counts as a match only when at least one mandatory skill matched, or
//! the role has no mandatory skills and at least one optional skill matched.

use std::collections::HashSet;

use crate::matching::normalize::{skill_key, skill_keys};
use crate::models::project::Role;

pub const MANDATORY_WEIGHT: f64 = 70.0;
pub const OPTIONAL_WEIGHT: f64 = 30.0;

#[derive(Debug, Clone, PartialEq)]
pub struct RoleScore {
    pub score: u32,
    /// Normalized keys of the role's mandatory skills the candidate has.
    pub matched_mandatory: Vec<String>,
    /// Normalized keys of the role's optional skills the candidate has.
    pub matched_optional: Vec<String>,
    /// Mandatory skills the candidate lacks, spelled as the role spells them.
    pub missing_skills: Vec<String>,
    mandatory_is_empty: bool,
}

impl RoleScore {
    pub fn is_match(&self) -> bool {
        !self.matched_mandatory.is_empty()
            || (self.mandatory_is_empty && !self.matched_optional.is_empty())
    }

    /// Mandatory matches followed by optional matches.
    pub fn matched_skills(&self) -> Vec<String> {
        self.matched_mandatory
            .iter()
            .chain(self.matched_optional.iter())
            .cloned()
            .collect()
    }
}

/// The best matching role for one candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct RoleMatch {
    pub role_name: String,
    pub result: RoleScore,
}

pub fn score_role(role: &Role, candidate_skills: &[String]) -> RoleScore {
    let candidate = skill_keys(candidate_skills);

    let mut matched_mandatory = Vec::new();
    let mut missing_skills = Vec::new();
    for skill in &role.mandatory_skills {
        let key = skill_key(skill);
        if candidate.contains(&key) {
            matched_mandatory.push(key);
        } else {
            missing_skills.push(skill.clone());
        }
    }

    let matched_optional = matched_keys(&role.optional_skills, &candidate);

    let mandatory_score = weighted_fraction(
        matched_mandatory.len(),
        role.mandatory_skills.len(),
        MANDATORY_WEIGHT,
    );
    let optional_score = weighted_fraction(
        matched_optional.len(),
        role.optional_skills.len(),
        OPTIONAL_WEIGHT,
    );

    RoleScore {
        score: (mandatory_score + optional_score).round() as u32,
        matched_mandatory,
        matched_optional,
        missing_skills,
        mandatory_is_empty: role.mandatory_skills.is_empty(),
    }
}

/// Scores every role and keeps the single highest-scoring match. Ties keep
/// the earlier role.
pub fn best_role_match(roles: &[Role], candidate_skills: &[String]) -> Option<RoleMatch> {
    if candidate_skills.is_empty() {
        return None;
    }

    let mut best: Option<RoleMatch> = None;
    for role in roles {
        let result = score_role(role, candidate_skills);
        if !result.is_match() {
            continue;
        }
        let beats_best = best
            .as_ref()
            .map(|current| result.score > current.result.score)
            .unwrap_or(true);
        if beats_best {
            best = Some(RoleMatch {
                role_name: role.role_name.clone(),
                result,
            });
        }
    }
    best
}

fn matched_keys(skills: &[String], candidate: &HashSet<String>) -> Vec<String> {
    skills
        .iter()
        .map(|s| skill_key(s))
        .filter(|key| candidate.contains(key))
        .collect()
}

fn weighted_fraction(matched: usize, total: usize, weight: f64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (matched as f64 / total as f64) * weight
}
