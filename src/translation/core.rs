/*!
 * Single-call translation client.
 *
 * Wraps the configured provider: one call is one request, with the answer
 * trimmed and an empty answer reported as a retryable failure.
 */

use std::sync::Arc;
use std::time::Instant;

use log::debug;

use crate::errors::ProviderError;
use crate::providers::Provider;

/// Thin client over the selected provider
#[derive(Debug, Clone)]
pub struct TranslationClient {
    provider: Arc<dyn Provider>,
}

impl TranslationClient {
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self { provider }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Send one prompt and return the trimmed answer
    pub async fn call_model(&self, prompt: &str) -> Result<String, ProviderError> {
        let started = Instant::now();
        let response = self.provider.complete(prompt).await?;
        debug!(
            "{} answered in {:?} ({} characters)",
            self.provider.name(),
            started.elapsed(),
            response.chars().count()
        );

        let text = response.trim();
        if text.is_empty() {
            return Err(ProviderError::EmptyResponse(format!(
                "{} returned no text",
                self.provider.name()
            )));
        }

        Ok(text.to_string())
    }
}
