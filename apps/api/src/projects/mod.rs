// Projects: creation, applications, membership and AI role suggestions.
// Headcount rules live in lifecycle; handlers never edit `filled` directly.

pub mod handlers;
pub mod lifecycle;
pub mod prompts;
pub mod repository;
pub mod suggestions;
