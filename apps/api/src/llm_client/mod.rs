/// LLM Client — the single point of entry for hosted completion APIs.
///
/// Two providers are supported behind one client: Groq (OpenAI-compatible chat
/// completions) and Gemini (generateContent). The provider is picked once at
/// startup from config; callers never branch on it.
use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

const GROQ_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const GROQ_MODEL: &str = "llama-3.3-70b-versatile";
pub const GEMINI_MODEL: &str = "gemini-1.5-flash";
const MAX_TOKENS: u32 = 2048;
const MAX_RETRIES: u32 = 3;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    Groq,
    Gemini,
}

impl LlmProvider {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "groq" => Some(LlmProvider::Groq),
            "gemini" => Some(LlmProvider::Gemini),
            _ => None,
        }
    }

    pub fn model(&self) -> &'static str {
        match self {
            LlmProvider::Groq => GROQ_MODEL,
            LlmProvider::Gemini => GEMINI_MODEL,
        }
    }
}

/// Provider-neutral completion result.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmResponse {
    pub text: Option<String>,
    pub input_tokens: u32,
    pub output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GroqResponse {
    choices: Vec<GroqChoice>,
    #[serde(default)]
    usage: Option<GroqUsage>,
}

#[derive(Debug, Deserialize)]
struct GroqChoice {
    message: GroqMessage,
}

#[derive(Debug, Deserialize)]
struct GroqMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GroqUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    usage_metadata: Option<GeminiUsage>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

impl From<GroqResponse> for LlmResponse {
    fn from(response: GroqResponse) -> Self {
        let (input_tokens, output_tokens) = response
            .usage
            .map(|u| (u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();
        LlmResponse {
            text: response
                .choices
                .into_iter()
                .find_map(|c| c.message.content),
            input_tokens,
            output_tokens,
        }
    }
}

impl From<GeminiResponse> for LlmResponse {
    fn from(response: GeminiResponse) -> Self {
        let (input_tokens, output_tokens) = response
            .usage_metadata
            .map(|u| (u.prompt_token_count, u.candidates_token_count))
            .unwrap_or_default();
        let text = response
            .candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|content| content.parts)
            .find_map(|part| part.text);
        LlmResponse {
            text,
            input_tokens,
            output_tokens,
        }
    }
}

/// Pulls a human-readable message out of either provider's error envelope:
/// both use `{"error": {"message": ...}}`.
fn api_error_message(body: String) -> String {
    serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or(body)
}

fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Error kept for a retryable response; surfaced only once retries run out.
fn retryable_error(status: StatusCode, body: String) -> Option<LlmError> {
    if status == StatusCode::TOO_MANY_REQUESTS {
        Some(LlmError::RateLimited {
            retries: MAX_RETRIES,
        })
    } else if status.is_server_error() {
        Some(LlmError::Api {
            status: status.as_u16(),
            message: api_error_message(body),
        })
    } else {
        None
    }
}

/// Wraps the configured provider with retry logic and structured output helpers.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    provider: LlmProvider,
    api_key: String,
}

impl LlmClient {
    pub fn new(provider: LlmProvider, api_key: String) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self {
            client,
            provider,
            api_key,
        })
    }

    pub fn provider(&self) -> LlmProvider {
        self.provider
    }

    fn request(&self, prompt: &str, system: &str) -> RequestBuilder {
        match self.provider {
            LlmProvider::Groq => self
                .client
                .post(GROQ_API_URL)
                .bearer_auth(&self.api_key)
                .json(&json!({
                    "model": GROQ_MODEL,
                    "max_tokens": MAX_TOKENS,
                    "messages": [
                        {"role": "system", "content": system},
                        {"role": "user", "content": prompt}
                    ]
                })),
            LlmProvider::Gemini => self
                .client
                .post(format!("{GEMINI_API_BASE}/{GEMINI_MODEL}:generateContent"))
                .query(&[("key", self.api_key.as_str())])
                .json(&json!({
                    "systemInstruction": {"parts": [{"text": system}]},
                    "contents": [{"role": "user", "parts": [{"text": prompt}]}],
                    "generationConfig": {"maxOutputTokens": MAX_TOKENS}
                })),
        }
    }

    /// Makes a raw completion call, normalizing the provider's response.
    /// Retries on 429 (rate limit) and 5xx errors with exponential backoff.
    pub async fn call(&self, prompt: &str, system: &str) -> Result<LlmResponse, LlmError> {
        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s
                let delay = Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = match self.request(prompt, system).send().await {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if is_retryable(status) {
                let body = response.text().await.unwrap_or_default();
                warn!("LLM API returned {}: {}", status, body);
                last_error = retryable_error(status, body);
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message: api_error_message(body),
                });
            }

            let llm_response: LlmResponse = match self.provider {
                LlmProvider::Groq => response.json::<GroqResponse>().await?.into(),
                LlmProvider::Gemini => response.json::<GeminiResponse>().await?.into(),
            };

            debug!(
                provider = ?self.provider,
                "LLM call succeeded: input_tokens={}, output_tokens={}",
                llm_response.input_tokens,
                llm_response.output_tokens
            );

            return Ok(llm_response);
        }

        Err(last_error.unwrap_or(LlmError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }

    /// Calls the LLM and deserializes the text response as JSON.
    /// The prompt must instruct the model to return valid JSON.
    pub async fn call_json<T: DeserializeOwned>(
        &self,
        prompt: &str,
        system: &str,
    ) -> Result<T, LlmError> {
        let response = self.call(prompt, system).await?;

        let text = response.text.as_deref().ok_or(LlmError::EmptyContent)?;

        // Models sometimes wrap JSON in markdown fences despite instructions
        let text = strip_json_fences(text);

        serde_json::from_str(text).map_err(LlmError::Parse)
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let stripped = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"));
    match stripped {
        Some(inner) => inner
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(inner.trim_start()),
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n[1, 2]\n```";
        assert_eq!(strip_json_fences(input), "[1, 2]");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "  {\"key\": \"value\"}\n";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_provider_parse() {
        assert_eq!(LlmProvider::parse("Groq"), Some(LlmProvider::Groq));
        assert_eq!(LlmProvider::parse(" gemini "), Some(LlmProvider::Gemini));
        assert_eq!(LlmProvider::parse("openai"), None);
    }

    #[test]
    fn test_groq_response_normalized() {
        let raw: GroqResponse = serde_json::from_value(json!({
            "choices": [{"message": {"role": "assistant", "content": "[]"}}],
            "usage": {"prompt_tokens": 12, "completion_tokens": 3, "total_tokens": 15}
        }))
        .unwrap();
        let response = LlmResponse::from(raw);

        assert_eq!(response.text.as_deref(), Some("[]"));
        assert_eq!(response.input_tokens, 12);
        assert_eq!(response.output_tokens, 3);
    }

    #[test]
    fn test_gemini_response_normalized() {
        let raw: GeminiResponse = serde_json::from_value(json!({
            "candidates": [{"content": {"role": "model", "parts": [{"text": "{\"ok\":true}"}]}}],
            "usageMetadata": {"promptTokenCount": 40, "candidatesTokenCount": 8}
        }))
        .unwrap();
        let response = LlmResponse::from(raw);

        assert_eq!(response.text.as_deref(), Some("{\"ok\":true}"));
        assert_eq!(response.input_tokens, 40);
        assert_eq!(response.output_tokens, 8);
    }

    #[test]
    fn test_gemini_blocked_response_has_no_text() {
        let raw: GeminiResponse = serde_json::from_value(json!({
            "promptFeedback": {"blockReason": "SAFETY"}
        }))
        .unwrap();
        assert_eq!(LlmResponse::from(raw).text, None);
    }

    #[test]
    fn test_rate_limit_reported_after_retries() {
        let error = retryable_error(StatusCode::TOO_MANY_REQUESTS, "slow down".to_string());
        assert!(matches!(
            error,
            Some(LlmError::RateLimited { retries }) if retries == MAX_RETRIES
        ));
    }

    #[test]
    fn test_server_error_uses_envelope_message() {
        let body = r#"{"error": {"message": "model overloaded"}}"#.to_string();
        match retryable_error(StatusCode::SERVICE_UNAVAILABLE, body) {
            Some(LlmError::Api { status, message }) => {
                assert_eq!(status, 503);
                assert_eq!(message, "model overloaded");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_client_errors_not_retried() {
        assert!(!is_retryable(StatusCode::BAD_REQUEST));
        assert!(retryable_error(StatusCode::UNAUTHORIZED, String::new()).is_none());
        assert!(is_retryable(StatusCode::BAD_GATEWAY));
    }

    #[test]
    fn test_api_error_message_extracts_nested_message() {
        let body = r#"{"error": {"message": "Invalid API Key", "type": "invalid_request_error"}}"#;
        assert_eq!(api_error_message(body.to_string()), "Invalid API Key");
        assert_eq!(api_error_message("plain".to_string()), "plain");
    }
}
