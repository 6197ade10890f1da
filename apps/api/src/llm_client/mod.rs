/// LLM Client: the single point of entry for text-generation calls.
///
/// ARCHITECTURAL RULE: No other module may call the Generative Language API directly.
/// Exactly one request is issued per call. Failures are returned immediately, never retried.
///
/// Model: gemini-1.5-flash-latest (hardcoded, not configurable)
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// The model used for every generation request.
pub const MODEL: &str = "gemini-1.5-flash-latest";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Network error while contacting the generation service: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Authentication with the generation service failed (status {status}): {message}")]
    Auth { status: u16, message: String },

    #[error("Generation service error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Request was blocked by the content policy: {reason}")]
    Blocked { reason: String },

    #[error("Malformed response from the generation service: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Generation service returned no text")]
    EmptyContent,
}

/// A text-completion backend. The workflow only ever talks to this trait, so tests and
/// alternative providers can be swapped in without touching handlers.
///
/// Carried in `AppState` as `Arc<dyn TextGenerator>`.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
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

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub prompt_feedback: Option<PromptFeedback>,
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<CandidateContent>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    pub block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
}

impl GenerateContentResponse {
    /// Concatenates the text parts of the first candidate.
    pub fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        (!text.trim().is_empty()).then_some(text)
    }

    /// Converts the response into the generated text, classifying policy blocks
    /// and empty completions as failures.
    pub fn into_text(self) -> Result<String, LlmError> {
        if let Some(reason) = self
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.clone())
        {
            return Err(LlmError::Blocked { reason });
        }

        if let Some(text) = self.text() {
            return Ok(text);
        }

        match self
            .candidates
            .first()
            .and_then(|c| c.finish_reason.as_deref())
        {
            Some(reason @ ("SAFETY" | "BLOCKLIST" | "PROHIBITED_CONTENT" | "RECITATION")) => {
                Err(LlmError::Blocked {
                    reason: reason.to_string(),
                })
            }
            _ => Err(LlmError::EmptyContent),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// The generation client used by the SOP workflow.
/// Wraps the `generateContent` endpoint of the Generative Language API.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl LlmClient {
    /// `api_base` is the versioned API root, e.g. `https://generativelanguage.googleapis.com/v1beta`.
    /// No request timeout is set here; the network stack decides.
    pub fn new(api_key: String, api_base: &str) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder()
                .user_agent(concat!("sop-api/", env!("CARGO_PKG_VERSION")))
                .build()?,
            api_key,
            endpoint: format!(
                "{}/models/{}:generateContent",
                api_base.trim_end_matches('/'),
                MODEL
            ),
        })
    }

    /// Makes a single call to the model and returns the decoded response.
    pub async fn call(&self, prompt: &str) -> Result<GenerateContentResponse, LlmError> {
        let request_body = GenerateContentRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = error_message(&body);
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => LlmError::Auth {
                    status: status.as_u16(),
                    message,
                },
                _ => LlmError::Api {
                    status: status.as_u16(),
                    message,
                },
            });
        }

        let decoded: GenerateContentResponse = serde_json::from_str(&body)?;

        if let Some(usage) = &decoded.usage_metadata {
            debug!(
                "LLM call succeeded: prompt_tokens={}, candidate_tokens={}",
                usage.prompt_token_count, usage.candidates_token_count
            );
        }

        Ok(decoded)
    }
}

#[async_trait]
impl TextGenerator for LlmClient {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        self.call(prompt).await?.into_text()
    }
}

/// Pulls the human-readable message out of an API error body, falling back to the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.trim().to_string())
}
