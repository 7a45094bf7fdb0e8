/// LLM Client — the single point of entry for all Gemini API calls.
///
/// ARCHITECTURAL RULE: No other module may call the Gemini API directly.
/// Handlers depend on the `CompletionModel` trait, never on `LlmClient`.
///
/// Model: gemini-2.5-pro (hardcoded — do not make configurable to prevent drift)
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
/// The model used for all LLM calls.
/// This is intentionally hardcoded to prevent accidental drift.
pub const MODEL: &str = "gemini-2.5-pro";
/// Low temperature biases the model toward deterministic, schema-following output.
pub const TEMPERATURE: f32 = 0.4;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    role: &'a str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
}

impl GenerateResponse {
    /// Text of the first part of the first candidate, if the response has one.
    pub fn text(&self) -> Option<&str> {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .and_then(|c| c.parts.first())
            .and_then(|p| p.text.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

/// Prompt in, free text out. Implemented by `LlmClient`; tests substitute fakes.
#[async_trait]
pub trait CompletionModel: Send + Sync {
    /// Returns the reply text, or an empty string when the model response
    /// carries no usable text.
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}

/// The single LLM client used by all handlers.
/// Wraps the Gemini `generateContent` endpoint: one non-streaming call, no retries.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl LlmClient {
    pub fn new(api_key: String) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()?,
            api_key,
            base_url: GEMINI_API_URL.to_string(),
        })
    }

    /// Points the client at a different API root (local proxies, test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Makes a raw call to the Gemini API, returning the decoded response object.
    ///
    /// A 2xx body that does not match the expected shape decodes to an empty
    /// response rather than an error.
    pub async fn call(&self, prompt: &str) -> Result<GenerateResponse, LlmError> {
        let request_body = GenerateRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
            },
        };

        let url = format!("{}/models/{}:generateContent", self.base_url, MODEL);
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            // Try to parse error message
            let message = serde_json::from_str::<GeminiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed = serde_json::from_str::<GenerateResponse>(&body).unwrap_or_else(|e| {
            warn!("Unexpected Gemini response shape: {e}");
            GenerateResponse::default()
        });

        if let Some(usage) = &parsed.usage_metadata {
            debug!(
                "LLM call succeeded: prompt_tokens={}, candidate_tokens={}",
                usage.prompt_token_count, usage.candidates_token_count
            );
        }

        Ok(parsed)
    }
}

#[async_trait]
impl CompletionModel for LlmClient {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let response = self.call(prompt).await?;
        Ok(response.text().unwrap_or_default().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GENERATE_PATH: &str = "/models/gemini-2.5-pro:generateContent";

    fn client_for(server: &mockito::ServerGuard) -> LlmClient {
        LlmClient::new("fake-key".to_string())
            .unwrap()
            .with_base_url(server.url())
    }

    #[tokio::test]
    async fn test_complete_returns_first_candidate_text() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", GENERATE_PATH)
            .match_header("x-goog-api-key", "fake-key")
            .match_body(mockito::Matcher::PartialJsonString(
                r#"{"generationConfig": {"temperature": 0.4}}"#.to_string(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"first"},{"text":"second"}]}},
                    {"content":{"parts":[{"text":"other"}]}}],
                    "usageMetadata":{"promptTokenCount":12,"candidatesTokenCount":3}}"#,
            )
            .create_async()
            .await;

        let reply = client_for(&server).complete("hello").await.unwrap();
        assert_eq!(reply, "first");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_complete_unexpected_shape_is_empty_text() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", GENERATE_PATH)
            .with_status(200)
            .with_body(r#"{"candidates":"nope"}"#)
            .create_async()
            .await;

        let reply = client_for(&server).complete("hello").await.unwrap();
        assert_eq!(reply, "");
    }

    #[tokio::test]
    async fn test_complete_no_candidates_is_empty_text() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", GENERATE_PATH)
            .with_status(200)
            .with_body(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#)
            .create_async()
            .await;

        let reply = client_for(&server).complete("hello").await.unwrap();
        assert_eq!(reply, "");
    }

    #[tokio::test]
    async fn test_api_error_is_not_retried() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", GENERATE_PATH)
            .with_status(500)
            .with_body(r#"{"error":{"code":500,"message":"backend unavailable"}}"#)
            .expect(1)
            .create_async()
            .await;

        let err = client_for(&server).complete("hello").await.unwrap_err();
        match err {
            LlmError::Api { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "backend unavailable");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_api_error_with_plain_body() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", GENERATE_PATH)
            .with_status(403)
            .with_body("forbidden")
            .create_async()
            .await;

        let err = client_for(&server).complete("hello").await.unwrap_err();
        assert!(matches!(err, LlmError::Api { status: 403, ref message } if message == "forbidden"));
    }
}
