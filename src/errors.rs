/*!
 * Error types for the chapterwai application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Classified failures of a single call to a model provider
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// The provider throttled the request (HTTP 429 or quota exhaustion)
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// The provider failed on its side (HTTP 5xx)
    #[error("Server unavailable: {status_code} - {message}")]
    ServerUnavailable {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// The provider refused the request (malformed, unauthorized or blocked)
    #[error("Request rejected: {status_code} - {message}")]
    ClientRejected {
        /// HTTP status code, 0 when the rejection came inside a successful response
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// The provider answered without any usable text
    #[error("Empty response from provider: {0}")]
    EmptyResponse(String),

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    Connection(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    Parse(String),

    /// The client itself is misconfigured (missing key, bad endpoint)
    #[error("Provider configuration error: {0}")]
    Configuration(String),
}

impl ProviderError {
    /// Whether a retry of the same request can reasonably succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited(_)
                | Self::ServerUnavailable { .. }
                | Self::Connection(_)
                | Self::EmptyResponse(_)
        )
    }
}

/// Errors that can occur during chapter translation
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Error from the provider API, after retries where applicable
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Output much shorter than the source, most likely truncated by the model
    #[error(
        "Chapter {chapter} output looks truncated: {output_chars} characters for {input_chars} source characters"
    )]
    SuspiciouslyShort {
        chapter: u32,
        output_chars: usize,
        input_chars: usize,
    },

    /// Source chapter without any paragraph to translate
    #[error("Chapter {chapter} has no text to translate")]
    EmptyChapter { chapter: u32 },

    /// Reading or writing chapter files failed
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Invalid or incomplete configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}

impl From<std::io::Error> for TranslationError {
    fn from(error: std::io::Error) -> Self {
        Self::Storage(error.to_string())
    }
}
