use sqlx::PgPool;

use crate::llm_client::LlmClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Completion client for AI role suggestions (Groq or Gemini per config).
    pub llm: LlmClient,
}
