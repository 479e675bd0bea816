//! Role Demand Aggregator — tallies which skills open projects are asking for
//! and how much of that demand a user already covers.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::matching::normalize::{skill_key, skill_keys};
use crate::models::project::{Project, ProjectStatus};

const TOP_DEMANDED_LIMIT: usize = 10;
const RECOMMENDED_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillDemand {
    pub skill: String,
    pub demand: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemandedSkill {
    pub skill: String,
    pub demand: u32,
    pub user_has: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillBreakdown {
    pub skill: String,
    pub project_matches: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillsAnalytics {
    pub user_skills: Vec<String>,
    pub coverage_percentage: u32,
    pub top_demanded_skills: Vec<DemandedSkill>,
    pub recommended_skills: Vec<SkillDemand>,
    pub user_skill_breakdown: Vec<SkillBreakdown>,
}

/// Counts every mandatory and optional skill occurrence across the roles of
/// OPEN projects. Repeats inside one role each count.
///
/// Sorted by demand, highest first; equal demand keeps first-seen order.
pub fn aggregate_demand(projects: &[Project]) -> Vec<SkillDemand> {
    let mut tallies: Vec<SkillDemand> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    let open_roles = projects
        .iter()
        .filter(|p| p.status == ProjectStatus::Open)
        .flat_map(|p| p.roles.iter());

    for role in open_roles {
        for skill in role.mandatory_skills.iter().chain(role.optional_skills.iter()) {
            let key = skill_key(skill);
            match index.get(&key) {
                Some(&i) => tallies[i].demand += 1,
                None => {
                    index.insert(key.clone(), tallies.len());
                    tallies.push(SkillDemand {
                        skill: key,
                        demand: 1,
                    });
                }
            }
        }
    }

    tallies.sort_by(|a, b| b.demand.cmp(&a.demand));
    tallies
}

/// Share of distinct demanded skills the user has, as a rounded percentage.
pub fn coverage_percentage(demand: &[SkillDemand], user_skills: &[String]) -> u32 {
    if demand.is_empty() {
        return 0;
    }
    let user = skill_keys(user_skills);
    let covered = demand.iter().filter(|d| user.contains(&d.skill)).count();
    ((covered as f64 / demand.len() as f64) * 100.0).round() as u32
}

pub fn skills_analytics(user_skills: &[String], projects: &[Project]) -> SkillsAnalytics {
    let demand = aggregate_demand(projects);
    let user = skill_keys(user_skills);

    let top_demanded_skills = demand
        .iter()
        .take(TOP_DEMANDED_LIMIT)
        .map(|d| DemandedSkill {
            skill: d.skill.clone(),
            demand: d.demand,
            user_has: user.contains(&d.skill),
        })
        .collect();

    let recommended_skills = demand
        .iter()
        .filter(|d| !user.contains(&d.skill))
        .take(RECOMMENDED_LIMIT)
        .cloned()
        .collect();

    SkillsAnalytics {
        user_skills: user_skills.to_vec(),
        coverage_percentage: coverage_percentage(&demand, user_skills),
        top_demanded_skills,
        recommended_skills,
        user_skill_breakdown: skill_breakdown(user_skills, projects),
    }
}

/// For each declared user skill, the number of OPEN projects with at least one
/// role naming it.
fn skill_breakdown(user_skills: &[String], projects: &[Project]) -> Vec<SkillBreakdown> {
    let project_skill_sets: Vec<HashSet<String>> = projects
        .iter()
        .filter(|p| p.status == ProjectStatus::Open)
        .map(|p| {
            p.roles
                .iter()
                .flat_map(|r| r.mandatory_skills.iter().chain(r.optional_skills.iter()))
                .map(|s| skill_key(s))
                .collect()
        })
        .collect();

    user_skills
        .iter()
        .map(|skill| {
            let key = skill_key(skill);
            let project_matches = project_skill_sets
                .iter()
                .filter(|set| set.contains(&key))
                .count() as u32;
            SkillBreakdown {
                skill: skill.clone(),
                project_matches,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::project::Role;
    use chrono::Utc;
    use uuid::Uuid;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn role(mandatory: &[&str], optional: &[&str]) -> Role {
        Role {
            role_name: "Contributor".to_string(),
            mandatory_skills: strings(mandatory),
            optional_skills: strings(optional),
            needed: 1,
            filled: 0,
        }
    }

    fn project(status: ProjectStatus, roles: Vec<Role>) -> Project {
        Project {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            title: "Side project".to_string(),
            description: String::new(),
            status,
            roles,
            created_at: Utc::now(),
        }
    }

    fn demand_of(demand: &[SkillDemand], skill: &str) -> Option<u32> {
        demand.iter().find(|d| d.skill == skill).map(|d| d.demand)
    }

    #[test]
    fn test_demand_across_two_open_projects() {
        let projects = vec![
            project(ProjectStatus::Open, vec![role(&["Go"], &[])]),
            project(ProjectStatus::Open, vec![role(&["Go", "Rust"], &[])]),
        ];
        let demand = aggregate_demand(&projects);

        assert_eq!(demand.len(), 2);
        assert_eq!(demand_of(&demand, "go"), Some(2));
        assert_eq!(demand_of(&demand, "rust"), Some(1));
        assert_eq!(coverage_percentage(&demand, &strings(&["go"])), 50);
    }

    #[test]
    fn test_completed_projects_ignored() {
        let projects = vec![
            project(ProjectStatus::Completed, vec![role(&["Go"], &["Docker"])]),
            project(ProjectStatus::Open, vec![role(&["Rust"], &[])]),
        ];
        let demand = aggregate_demand(&projects);
        assert_eq!(demand, vec![SkillDemand { skill: "rust".to_string(), demand: 1 }]);
    }

    #[test]
    fn test_duplicates_within_role_each_count() {
        let projects = vec![project(ProjectStatus::Open, vec![role(&["Go", "go"], &["GO"])])];
        assert_eq!(demand_of(&aggregate_demand(&projects), "go"), Some(3));
    }

    #[test]
    fn test_sorted_by_demand_with_first_seen_ties() {
        let projects = vec![project(
            ProjectStatus::Open,
            vec![role(&["Figma", "Go"], &[]), role(&["Go", "Rust"], &[])],
        )];
        let order: Vec<_> = aggregate_demand(&projects)
            .into_iter()
            .map(|d| d.skill)
            .collect();
        assert_eq!(order, vec!["go", "figma", "rust"]);
    }

    #[test]
    fn test_coverage_zero_without_demand() {
        assert_eq!(coverage_percentage(&[], &strings(&["go"])), 0);
    }

    #[test]
    fn test_coverage_rounds() {
        let projects = vec![project(ProjectStatus::Open, vec![role(&["a", "b", "c"], &[])])];
        let demand = aggregate_demand(&projects);
        // 1/3 -> 33, 2/3 -> 67
        assert_eq!(coverage_percentage(&demand, &strings(&["A"])), 33);
        assert_eq!(coverage_percentage(&demand, &strings(&["a", "B"])), 67);
    }

    #[test]
    fn test_analytics_shape() {
        let projects = vec![
            project(ProjectStatus::Open, vec![role(&["Go", "Postgres"], &["Docker"])]),
            project(ProjectStatus::Open, vec![role(&["Go"], &["Kubernetes"])]),
            project(ProjectStatus::Completed, vec![role(&["Go"], &[])]),
        ];
        let analytics = skills_analytics(&strings(&["Go", "Elm"]), &projects);

        assert_eq!(analytics.user_skills, vec!["Go", "Elm"]);
        // go, postgres, docker, kubernetes -> 1 of 4
        assert_eq!(analytics.coverage_percentage, 25);
        assert_eq!(analytics.top_demanded_skills[0].skill, "go");
        assert_eq!(analytics.top_demanded_skills[0].demand, 2);
        assert!(analytics.top_demanded_skills[0].user_has);
        assert!(!analytics.top_demanded_skills[1].user_has);

        let recommended: Vec<_> = analytics
            .recommended_skills
            .iter()
            .map(|d| d.skill.as_str())
            .collect();
        assert_eq!(recommended, vec!["postgres", "docker", "kubernetes"]);

        assert_eq!(
            analytics.user_skill_breakdown,
            vec![
                SkillBreakdown { skill: "Go".to_string(), project_matches: 2 },
                SkillBreakdown { skill: "Elm".to_string(), project_matches: 0 },
            ]
        );
    }

    #[test]
    fn test_analytics_caps_lists() {
        let many: Vec<String> = (0..15).map(|i| format!("skill-{i}")).collect();
        let many_refs: Vec<&str> = many.iter().map(String::as_str).collect();
        let projects = vec![project(ProjectStatus::Open, vec![role(&many_refs[..], &[])])];

        let analytics = skills_analytics(&[], &projects);
        assert_eq!(analytics.top_demanded_skills.len(), 10);
        assert_eq!(analytics.recommended_skills.len(), 5);
        assert_eq!(analytics.coverage_percentage, 0);
        assert!(analytics.user_skill_breakdown.is_empty());
    }

    #[test]
    fn test_analytics_serializes_camel_case() {
        let analytics = skills_analytics(&strings(&["go"]), &[]);
        let value = serde_json::to_value(&analytics).unwrap();
        assert!(value.get("coveragePercentage").is_some());
        assert!(value.get("topDemandedSkills").is_some());
        assert!(value.get("userSkillBreakdown").is_some());
    }
}
