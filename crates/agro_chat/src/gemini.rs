//! Gemini adapter for the generation provider.
//!
//! Sends the prompt as a single user turn to the Generative Language
//! `generateContent` endpoint. Failed calls are reported, never retried.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ProviderError, ProviderResult};
use crate::provider::GenerationProvider;
use crate::settings::ChatSettings;

/// Model used when neither settings nor environment choose one
pub const DEFAULT_MODEL: &str = "gemini-1.5-pro";

/// Public Generative Language API root
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Environment variable holding the API key by default
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Gemini-backed generation provider.
pub struct GeminiProvider {
    api_key: String,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl GeminiProvider {
    /// Create a provider with explicit credentials
    pub fn new(api_key: impl Into<String>, model: Option<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: DEFAULT_BASE_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Point the provider at another API root (proxies, test servers)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Create a provider from settings, reading the key from the environment
    /// variable the settings name.
    pub fn from_settings(settings: &ChatSettings) -> ProviderResult<Self> {
        let api_key = std::env::var(&settings.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ProviderError::NotConfigured(settings.api_key_env.clone()))?;

        info!("Using Gemini model {}", settings.default_model);

        Ok(Self::new(api_key, Some(settings.default_model.clone()))
            .with_base_url(settings.api_base_url.clone()))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Full `generateContent` URL for the configured model
    pub fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

#[async_trait::async_trait]
impl GenerationProvider for GeminiProvider {
    async fn generate(&self, prompt: &str) -> ProviderResult<String> {
        let request = GenerateRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        debug!("POST {}", self.endpoint());

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body,
            });
        }

        extract_reply(&body)
    }
}

/// Pull the reply text out of a `generateContent` response body.
///
/// Text parts of the first candidate are joined. A response without
/// candidates is a block if the prompt feedback names a reason, and
/// malformed otherwise.
pub fn extract_reply(body: &str) -> ProviderResult<String> {
    let response: GenerateResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::MalformedReply(format!("Failed to parse response: {}", e)))?;

    let candidate = match response.candidates.into_iter().next() {
        Some(candidate) => candidate,
        None => {
            return Err(match response.prompt_feedback.and_then(|f| f.block_reason) {
                Some(reason) => ProviderError::Blocked(reason),
                None => ProviderError::MalformedReply("No candidates in response".to_string()),
            });
        }
    };

    let text: String = candidate
        .content
        .map(|content| content.parts)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|part| part.text)
        .collect();

    if text.is_empty() {
        return Err(match candidate.finish_reason {
            Some(reason) if reason != "STOP" => ProviderError::Blocked(reason),
            _ => ProviderError::MalformedReply("Candidate has no text".to_string()),
        });
    }

    Ok(text)
}

// Generative Language API types
#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}
