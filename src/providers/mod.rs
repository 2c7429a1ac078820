/*!
 * Provider implementations for different model services.
 *
 * This module contains client implementations for various LLM providers:
 * - Gemini: Google Generative Language API
 * - Anthropic: Anthropic Messages API
 * - Ollama: Local LLM server
 * - Mock: scripted in-process provider for tests
 *
 * Every provider turns HTTP status codes and transport failures into a
 * classified `ProviderError` so that callers can decide whether to retry.
 */

use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use log::error;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use url::Url;

use crate::app_config::{TranslationConfig, TranslationProvider};
use crate::errors::ProviderError;

pub mod anthropic;
pub mod gemini;
pub mod mock;
pub mod ollama;

/// Common trait for all LLM providers
///
/// One call is one outbound request; implementations never retry on their own.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Send a single prompt and return the generated text
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError>;

    /// Short human readable name used in logs
    fn name(&self) -> &str;
}

/// Generation parameters shared by every hosted provider
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    pub model: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl GenerationSettings {
    pub fn from_config(config: &TranslationConfig) -> Self {
        Self {
            model: config.get_model(),
            temperature: config.common.temperature,
            max_output_tokens: config.common.max_output_tokens,
        }
    }
}

/// Longest error body kept in an error message
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Map a non-success HTTP status and its body onto a classified error
pub fn classify_status(status_code: u16, body: &str) -> ProviderError {
    let message: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
    let lowered = message.to_lowercase();

    match status_code {
        429 => ProviderError::RateLimited(message),
        500..=599 => ProviderError::ServerUnavailable { status_code, message },
        _ if lowered.contains("quota") || lowered.contains("rate limit") || lowered.contains("resource_exhausted") => {
            ProviderError::RateLimited(message)
        }
        _ => ProviderError::ClientRejected { status_code, message },
    }
}

/// Map a transport level failure onto a classified error
pub fn classify_transport(error: reqwest::Error) -> ProviderError {
    if error.is_decode() {
        ProviderError::Parse(error.to_string())
    } else {
        ProviderError::Connection(error.to_string())
    }
}

/// Pass a successful response through; otherwise log its body and classify the status
pub(crate) async fn ensure_success(service: &str, response: Response) -> Result<Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    error!("{} answered HTTP {}: {}", service, status, body);
    Err(classify_status(status.as_u16(), &body))
}

/// Decode a JSON body; a malformed body is a parse failure
pub(crate) async fn decode_json<T: DeserializeOwned>(service: &str, response: Response) -> Result<T, ProviderError> {
    response
        .json::<T>()
        .await
        .map_err(|e| ProviderError::Parse(format!("Unreadable {} response: {}", service, e)))
}

/// Build the HTTP client used by the hosted providers
pub(crate) fn build_http_client(timeout: Duration) -> Result<Client, ProviderError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ProviderError::Configuration(format!("Failed to build HTTP client: {}", e)))
}

/// Validate an endpoint and strip any trailing slash
pub(crate) fn normalize_endpoint(endpoint: &str) -> Result<String, ProviderError> {
    if endpoint.is_empty() {
        return Err(ProviderError::Configuration("Endpoint cannot be empty".to_string()));
    }

    let url = Url::parse(endpoint)
        .map_err(|e| ProviderError::Configuration(format!("Invalid endpoint '{}': {}", endpoint, e)))?;
    if url.host_str().is_none() {
        return Err(ProviderError::Configuration(format!("Invalid host in endpoint: {}", endpoint)));
    }

    Ok(endpoint.trim_end_matches('/').to_string())
}

/// Create the provider selected in the configuration
pub fn create_provider(config: &TranslationConfig) -> Result<Arc<dyn Provider>, ProviderError> {
    let settings = GenerationSettings::from_config(config);
    let timeout = config.get_timeout();

    let provider: Arc<dyn Provider> = match config.provider {
        TranslationProvider::Gemini => Arc::new(gemini::Gemini::new(
            config.get_api_key(),
            &config.get_endpoint(),
            settings,
            timeout,
        )?),
        TranslationProvider::Anthropic => Arc::new(anthropic::Anthropic::new(
            config.get_api_key(),
            &config.get_endpoint(),
            settings,
            timeout,
        )?),
        TranslationProvider::Ollama => Arc::new(ollama::Ollama::new(
            &config.get_endpoint(),
            settings,
            timeout,
        )?),
    };

    Ok(provider)
}
