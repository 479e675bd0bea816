use std::collections::HashSet;

/// Comparison key for a skill: case-folded, nothing else. "React.js" and
/// "React" stay distinct; surrounding whitespace is kept.
pub fn skill_key(skill: &str) -> String {
    skill.to_lowercase()
}

pub fn skill_keys(skills: &[String]) -> HashSet<String> {
    skills.iter().map(|s| skill_key(s)).collect()
}
