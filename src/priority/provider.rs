//! Model-fallback classification port.
//!
//! The classifier only reaches this port when no pattern, emoji, or
//! severity strategy matched. The trait keeps the external completion
//! service behind a narrow, mockable seam; the HTTP implementation talks
//! to any chat-completion shaped endpoint and parses a strict-JSON reply.
//! All failure modes surface as `ProviderError`; deciding what happens
//! next (the default classification) is the classifier's job, not ours.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::level::PriorityLevel;

/// Errors from the model classification call.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Classification request failed: {0}")]
    Request(String),

    #[error("Classification response malformed: {0}")]
    Malformed(String),

    #[error("No classification provider configured")]
    Unconfigured,
}

/// A level guess returned by the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderClassification {
    pub level: PriorityLevel,
    /// In [0, 1]; the HTTP implementation clamps before returning.
    pub confidence: f64,
    pub reasoning: String,
}

/// Narrow port to the external completion service.
#[async_trait]
pub trait ClassifyProvider: Send + Sync {
    async fn classify_text(&self, text: &str) -> Result<ProviderClassification, ProviderError>;
}

/// A provider for deployments without a model endpoint. Always errors,
/// which the classifier turns into the default classification.
pub struct UnconfiguredProvider;

#[async_trait]
impl ClassifyProvider for UnconfiguredProvider {
    async fn classify_text(&self, _text: &str) -> Result<ProviderClassification, ProviderError> {
        Err(ProviderError::Unconfigured)
    }
}

// ---------------------------------------------------------------------------
// HTTP implementation
// ---------------------------------------------------------------------------

/// Connection settings for the HTTP provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    /// Base URL of a chat-completion shaped API (no trailing slash).
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    /// Whole-request deadline enforced on the HTTP client.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

const CLASSIFY_SYSTEM_PROMPT: &str = "You classify the priority of a work request. \
Respond with ONLY a JSON object, no prose and no code fences: \
{\"level\": \"P0\"|\"P1\"|\"P2\"|\"P3\", \"confidence\": 0.0-1.0, \"reasoning\": \"one short sentence\"}. \
P0 = drop-everything emergency, P1 = important and time-sensitive, \
P2 = normal work, P3 = nice to have.";

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: String,
}

/// What the model is asked to emit.
#[derive(Deserialize)]
struct RawClassification {
    level: String,
    confidence: f64,
    #[serde(default)]
    reasoning: String,
}

/// `ClassifyProvider` over a chat-completion HTTP endpoint.
pub struct HttpClassifyProvider {
    client: reqwest::Client,
    config: ProviderConfig,
}

impl HttpClassifyProvider {
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ProviderError::Request(e.to_string()))?;
        Ok(Self { client, config })
    }

    /// Parse the model reply into a classification. Tolerates code fences
    /// and surrounding whitespace; rejects unknown levels outright so a
    /// hallucinated level never reaches the scoring math.
    fn parse_reply(content: &str) -> Result<ProviderClassification, ProviderError> {
        let trimmed = strip_code_fences(content);
        let raw: RawClassification = serde_json::from_str(trimmed)
            .map_err(|e| ProviderError::Malformed(format!("{e}: {trimmed}")))?;

        let level = PriorityLevel::parse(&raw.level)
            .ok_or_else(|| ProviderError::Malformed(format!("unknown level '{}'", raw.level)))?;

        Ok(ProviderClassification {
            level,
            confidence: raw.confidence.clamp(0.0, 1.0),
            reasoning: if raw.reasoning.is_empty() {
                format!("model classified as {level}")
            } else {
                raw.reasoning
            },
        })
    }
}

/// Strip a surrounding markdown code fence, if present.
fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

#[async_trait]
impl ClassifyProvider for HttpClassifyProvider {
    async fn classify_text(&self, text: &str) -> Result<ProviderClassification, ProviderError> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: CLASSIFY_SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: text,
                },
            ],
            temperature: 0.0,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ProviderError::Request(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;

        let content = body
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .ok_or_else(|| ProviderError::Malformed("empty choices".to_string()))?;

        Self::parse_reply(content)
    }
}
