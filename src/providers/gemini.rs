use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{
    GenerationSettings, Provider, build_http_client, classify_transport, decode_json, ensure_success, normalize_endpoint,
};
use crate::errors::ProviderError;

/// Harm categories relaxed for fiction translation
const HARM_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

/// Gemini client for the Generative Language REST API
pub struct Gemini {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// API base URL without trailing slash
    endpoint: String,
    /// Model and sampling parameters
    settings: GenerationSettings,
}

impl std::fmt::Debug for Gemini {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gemini")
            .field("endpoint", &self.endpoint)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

/// generateContent request body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GeminiGenerationConfig,
    safety_settings: Vec<GeminiSafetySetting>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GeminiPart {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
}

#[derive(Debug, Serialize)]
struct GeminiSafetySetting {
    category: &'static str,
    threshold: &'static str,
}

/// generateContent response body
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GeminiResponse {
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    pub prompt_feedback: Option<GeminiPromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiCandidate {
    #[serde(default)]
    pub content: Option<GeminiContent>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiPromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

impl GeminiRequest {
    pub fn new(prompt: &str, settings: &GenerationSettings) -> Self {
        Self {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart { text: prompt.to_string() }],
            }],
            generation_config: GeminiGenerationConfig {
                temperature: settings.temperature,
                top_p: 0.95,
                top_k: 40,
                max_output_tokens: settings.max_output_tokens,
            },
            safety_settings: HARM_CATEGORIES
                .into_iter()
                .map(|category| GeminiSafetySetting { category, threshold: "BLOCK_NONE" })
                .collect(),
        }
    }
}

impl Gemini {
    /// Create a new Gemini client
    pub fn new(
        api_key: impl Into<String>,
        endpoint: &str,
        settings: GenerationSettings,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(ProviderError::Configuration("Gemini API key is missing".to_string()));
        }

        Ok(Self {
            client: build_http_client(timeout)?,
            api_key,
            endpoint: normalize_endpoint(endpoint)?,
            settings,
        })
    }

    fn api_url(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.endpoint, self.settings.model)
    }

    /// Extract the generated text, classifying blocked and empty answers
    pub fn extract_text(response: &GeminiResponse) -> Result<String, ProviderError> {
        if let Some(reason) = response.prompt_feedback.as_ref().and_then(|f| f.block_reason.as_ref()) {
            return Err(ProviderError::ClientRejected {
                status_code: 0,
                message: format!("Prompt blocked: {}", reason),
            });
        }

        let Some(candidate) = response.candidates.first() else {
            return Err(ProviderError::EmptyResponse("Gemini returned no candidates".to_string()));
        };

        let text: String = candidate
            .content
            .iter()
            .flat_map(|content| content.parts.iter())
            .map(|part| part.text.as_str())
            .collect();

        if text.trim().is_empty() {
            return Err(ProviderError::EmptyResponse(format!(
                "Gemini candidate has no text (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            )));
        }

        Ok(text)
    }
}

#[async_trait]
impl Provider for Gemini {
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        let request = GeminiRequest::new(prompt, &self.settings);

        let response = self.client.post(self.api_url())
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(classify_transport)?;

        let response = ensure_success(self.name(), response).await?;
        let gemini_response: GeminiResponse = decode_json(self.name(), response).await?;

        Self::extract_text(&gemini_response)
    }

    fn name(&self) -> &str {
        "Gemini"
    }
}
