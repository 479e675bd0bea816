// Prompts for AI role suggestions on new projects.

/// Persona for role suggestions; the JSON-only rules are appended at call time.
pub const ROLE_SUGGESTION_PERSONA: &str = "You are an experienced technical lead who \
    staffs small volunteer side-projects. You break a project idea into the few \
    roles a team needs and tag each with concrete, commonly used skill names.";

/// Role suggestion prompt. Replace `{title}` and `{description}` before sending.
pub const ROLE_SUGGESTION_PROMPT_TEMPLATE: &str = r#"Suggest the team roles for this side-project.

Title: {title}
Description:
{description}

Return a JSON array with this EXACT schema (no extra fields):
[
  {
    "roleName": "Backend Developer",
    "mandatorySkills": ["Go", "PostgreSQL"],
    "optionalSkills": ["Docker"],
    "needed": 1
  }
]

Rules:
- Between 1 and 6 roles.
- Use short, conventional skill names ("React", "Figma", "Python"), one technology per entry.
- mandatorySkills: what the role cannot work without. optionalSkills: helpful extras.
- needed: how many people the role needs, at least 1.
"#;
