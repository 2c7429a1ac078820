/*!
 * In-process provider for tests. It is never built from the configuration.
 *
 * `working()` echoes the chunk after `SOURCE TEXT:` with a `[TRANSLATED]` tag,
 * `failing()` and `empty()` exercise the error paths, and `with_script` queues
 * exact results for the next calls.
 */

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::errors::ProviderError;
use crate::providers::Provider;
use crate::translation::prompts::SOURCE_TEXT_HEADING;

/// What the mock answers once its script is exhausted
#[derive(Debug, Clone, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with a proper translation
    Working,
    /// Always fails with this error
    Failing(ProviderError),
    /// Returns empty text
    Empty,
}

/// Offline provider that records every prompt it receives
#[derive(Debug)]
pub struct MockProvider {
    behavior: MockBehavior,
    /// Number of calls received, shared between clones
    request_count: Arc<AtomicUsize>,
    /// Results replayed in order before `behavior` applies
    script: Arc<Mutex<VecDeque<Result<String, ProviderError>>>>,
    /// Every prompt received, in order
    prompts: Arc<Mutex<Vec<String>>>,
    /// Custom response generator applied to the source text (optional)
    custom_response: Option<fn(&str) -> String>,
}

impl MockProvider {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            script: Arc::new(Mutex::new(VecDeque::new())),
            prompts: Arc::new(Mutex::new(Vec::new())),
            custom_response: None,
        }
    }

    /// Echo the source text back, tagged as translated
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Answer every call with `error`
    pub fn failing(error: ProviderError) -> Self {
        Self::new(MockBehavior::Failing(error))
    }

    /// Answer every call with an empty string
    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Queue results returned by the next calls, in order
    pub fn with_script(self, results: Vec<Result<String, ProviderError>>) -> Self {
        if let Ok(mut script) = self.script.lock() {
            script.extend(results);
        }
        self
    }

    /// Derive the answer from the source text with `generator`
    pub fn with_custom_response(mut self, generator: fn(&str) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Number of calls made so far
    pub fn call_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Prompts received so far
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    /// The part of a prompt holding the text to translate
    pub fn source_text(prompt: &str) -> &str {
        prompt
            .rsplit_once(SOURCE_TEXT_HEADING)
            .map(|(_, text)| text.trim())
            .unwrap_or(prompt)
    }
}

impl Clone for MockProvider {
    fn clone(&self) -> Self {
        Self {
            behavior: self.behavior.clone(),
            request_count: Arc::clone(&self.request_count),
            script: Arc::clone(&self.script),
            prompts: Arc::clone(&self.prompts),
            custom_response: self.custom_response,
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        self.request_count.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }

        let scripted = self.script.lock().ok().and_then(|mut script| script.pop_front());
        if let Some(result) = scripted {
            return result;
        }

        match &self.behavior {
            MockBehavior::Working => {
                let source = Self::source_text(prompt);
                Ok(match self.custom_response {
                    Some(generator) => generator(source),
                    None => format!("[TRANSLATED] {}", source),
                })
            }
            MockBehavior::Failing(error) => Err(error.clone()),
            MockBehavior::Empty => Ok(String::new()),
        }
    }

    fn name(&self) -> &str {
        "Mock"
    }
}
