//! AI role suggestions — drafts the role list for a new project from its
//! title and description.

use crate::errors::AppError;
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::LlmClient;
use crate::models::project::Role;
use crate::projects::prompts::{ROLE_SUGGESTION_PERSONA, ROLE_SUGGESTION_PROMPT_TEMPLATE};

pub const MAX_SUGGESTED_ROLES: usize = 6;

pub async fn suggest_roles(
    llm: &LlmClient,
    title: &str,
    description: &str,
) -> Result<Vec<Role>, AppError> {
    let prompt = ROLE_SUGGESTION_PROMPT_TEMPLATE
        .replace("{title}", title)
        .replace("{description}", description);
    let system = format!("{ROLE_SUGGESTION_PERSONA} {JSON_ONLY_SYSTEM}");

    let raw = llm
        .call_json::<Vec<Role>>(&prompt, &system)
        .await
        .map_err(|e| AppError::Llm(format!("Role suggestion failed: {e}")))?;

    Ok(sanitize_suggestions(raw))
}

/// Model output is untrusted: drop nameless roles and blank skills, force a
/// headcount of at least 1 with nobody filled, and cap the list.
pub fn sanitize_suggestions(raw: Vec<Role>) -> Vec<Role> {
    raw.into_iter()
        .filter_map(|role| {
            let role_name = role.role_name.trim().to_string();
            if role_name.is_empty() {
                return None;
            }
            Some(Role {
                role_name,
                mandatory_skills: clean_skills(role.mandatory_skills),
                optional_skills: clean_skills(role.optional_skills),
                needed: role.needed.max(1),
                filled: 0,
            })
        })
        .take(MAX_SUGGESTED_ROLES)
        .collect()
}

fn clean_skills(skills: Vec<String>) -> Vec<String> {
    skills
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
