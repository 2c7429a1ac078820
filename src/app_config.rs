use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Contents of `conf.json`. Every section falls back to its defaults when absent.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Input, output and reference file locations
    #[serde(default)]
    pub paths: PathsConfig,

    /// Chapter marker recognised by the splitter
    #[serde(default)]
    pub marker: MarkerConfig,

    /// Provider selection and pipeline tuning
    #[serde(default)]
    pub translation: TranslationConfig,

    #[serde(default)]
    pub log_level: LogLevel,
}

/// Model service used for translation
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    #[default]
    Gemini,
    Anthropic,
    Ollama,
}

impl TranslationProvider {
    /// Name used in log and error messages
    pub fn display_name(&self) -> &str {
        match self {
            Self::Gemini => "Gemini",
            Self::Anthropic => "Anthropic",
            Self::Ollama => "Ollama",
        }
    }

    /// Identifier used in `conf.json` and on the command line
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Gemini => "gemini".to_string(),
            Self::Anthropic => "anthropic".to_string(),
            Self::Ollama => "ollama".to_string(),
        }
    }

    /// Environment variable read when the config holds no key
    pub fn api_key_env_var(&self) -> Option<&'static str> {
        match self {
            Self::Gemini => Some("GEMINI_API_KEY"),
            Self::Anthropic => Some("ANTHROPIC_API_KEY"),
            Self::Ollama => None,
        }
    }
}

impl std::fmt::Display for TranslationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for TranslationProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "gemini" => Ok(Self::Gemini),
            "anthropic" => Ok(Self::Anthropic),
            "ollama" => Ok(Self::Ollama),
            other => Err(anyhow!("Unknown provider '{}' (expected gemini, anthropic or ollama)", other)),
        }
    }
}

/// File system layout of a translation project
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PathsConfig {
    /// Raw dump containing every chapter back to back
    #[serde(default = "default_raw_input")]
    pub raw_input: PathBuf,

    /// Directory receiving one source file per chapter
    #[serde(default = "default_chapters_dir")]
    pub chapters_dir: PathBuf,

    /// Directory receiving one translated file per chapter
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Style reference, used for format and tone only
    #[serde(default = "default_style_reference")]
    pub style_reference: PathBuf,

    /// Highest priority glossary
    #[serde(default = "default_late_glossary")]
    pub late_glossary: PathBuf,

    /// Fallback glossary
    #[serde(default = "default_early_glossary")]
    pub early_glossary: PathBuf,

    /// Incremental glossary of recently curated terms, optional
    #[serde(default = "default_update_glossary")]
    pub update_glossary: PathBuf,

    /// Append-only log of terms the model could not map, defaults to the update glossary
    #[serde(default)]
    pub unmapped_terms_log: Option<PathBuf>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            raw_input: default_raw_input(),
            chapters_dir: default_chapters_dir(),
            output_dir: default_output_dir(),
            style_reference: default_style_reference(),
            late_glossary: default_late_glossary(),
            early_glossary: default_early_glossary(),
            update_glossary: default_update_glossary(),
            unmapped_terms_log: None,
        }
    }
}

impl PathsConfig {
    /// Effective location of the unmapped terms log
    pub fn unmapped_terms_log_path(&self) -> PathBuf {
        self.unmapped_terms_log
            .clone()
            .unwrap_or_else(|| self.update_glossary.clone())
    }
}

/// Chapter marker: `<prefix><digits><suffix>` at the start of a line
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MarkerConfig {
    #[serde(default = "default_marker_prefix")]
    pub prefix: String,

    #[serde(default = "default_marker_suffix")]
    pub suffix: String,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            prefix: default_marker_prefix(),
            suffix: default_marker_suffix(),
        }
    }
}

/// Per-provider entry of `available_providers`. Empty strings mean "use the default".
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    #[serde(rename = "type")]
    pub provider_type: String,

    #[serde(default)]
    pub model: String,

    #[serde(default)]
    pub api_key: String,

    #[serde(default)]
    pub endpoint: String,

    /// Per-request timeout; 0 falls back to the default
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ProviderConfig {
    /// Entry pre-filled with the provider's default model and endpoint
    pub fn new(provider_type: TranslationProvider) -> Self {
        Self {
            provider_type: provider_type.to_lowercase_string(),
            model: default_model(&provider_type),
            api_key: String::new(),
            endpoint: default_endpoint(&provider_type),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Which provider runs and how the pipeline is tuned
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    #[serde(default)]
    pub provider: TranslationProvider,

    /// Settings for each provider; only the selected one is read
    #[serde(default)]
    pub available_providers: Vec<ProviderConfig>,

    #[serde(default)]
    pub common: TranslationCommonConfig,
}

/// Common translation settings applicable to all providers
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationCommonConfig {
    /// Language of the chapter files
    #[serde(default = "default_source_language")]
    pub source_language: String,

    /// Language to translate into
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Upper bound on characters sent per request; a single longer paragraph is still sent whole
    #[serde(default = "default_max_chunk_chars")]
    pub max_chunk_chars: usize,

    /// Total attempts per chunk, first call included
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Delay before the first retry, doubled on each following one (in milliseconds)
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Pause between consecutive chunk requests (in milliseconds)
    #[serde(default = "default_chunk_delay_ms")]
    pub chunk_delay_ms: u64,

    /// Temperature parameter for text generation (0.0 to 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens the model may generate per request
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    /// A chapter whose output is shorter than this fraction of its source is treated as truncated
    #[serde(default = "default_min_output_ratio")]
    pub min_output_ratio: f64,

    /// Absolute minimum output length in characters, 0 disables the check
    #[serde(default)]
    pub min_output_chars: usize,

    /// Chapters numbered below this are skipped
    #[serde(default)]
    pub resume_from: u32,
}

impl Default for TranslationCommonConfig {
    fn default() -> Self {
        Self {
            source_language: default_source_language(),
            target_language: default_target_language(),
            max_chunk_chars: default_max_chunk_chars(),
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
            chunk_delay_ms: default_chunk_delay_ms(),
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
            min_output_ratio: default_min_output_ratio(),
            min_output_chars: 0,
            resume_from: 0,
        }
    }
}

impl TranslationCommonConfig {
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    pub fn chunk_delay(&self) -> Duration {
        Duration::from_millis(self.chunk_delay_ms)
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_raw_input() -> PathBuf {
    PathBuf::from("untranslated_chapters.txt")
}

fn default_chapters_dir() -> PathBuf {
    PathBuf::from("cn_chapters")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("en_chapters")
}

fn default_style_reference() -> PathBuf {
    PathBuf::from("Style_reference.txt")
}

fn default_late_glossary() -> PathBuf {
    PathBuf::from("Late gloss.txt")
}

fn default_early_glossary() -> PathBuf {
    PathBuf::from("early gloss.txt")
}

fn default_update_glossary() -> PathBuf {
    PathBuf::from("update_gloss.txt")
}

fn default_marker_prefix() -> String {
    "第".to_string()
}

fn default_marker_suffix() -> String {
    "章".to_string()
}

fn default_source_language() -> String {
    "Chinese".to_string()
}

fn default_target_language() -> String {
    "English".to_string()
}

fn default_max_chunk_chars() -> usize {
    3000
}

fn default_retry_count() -> u32 {
    5
}

fn default_retry_backoff_ms() -> u64 {
    10_000 // 10 seconds, doubled on each retry
}

fn default_chunk_delay_ms() -> u64 {
    2_000
}

fn default_temperature() -> f32 {
    0.2
}

fn default_max_output_tokens() -> u32 {
    8192
}

fn default_min_output_ratio() -> f64 {
    0.3
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_model(provider: &TranslationProvider) -> String {
    match provider {
        TranslationProvider::Gemini => "gemini-2.5-flash".to_string(),
        TranslationProvider::Anthropic => "claude-3-5-haiku-latest".to_string(),
        TranslationProvider::Ollama => "qwen2.5:14b".to_string(),
    }
}

fn default_endpoint(provider: &TranslationProvider) -> String {
    match provider {
        TranslationProvider::Gemini => "https://generativelanguage.googleapis.com".to_string(),
        TranslationProvider::Anthropic => "https://api.anthropic.com".to_string(),
        TranslationProvider::Ollama => "http://localhost:11434".to_string(),
    }
}

impl Config {
    /// Reject settings the pipeline cannot run with. Only needed before translating.
    pub fn validate(&self) -> Result<()> {
        let common = &self.translation.common;

        if self.marker.prefix.trim().is_empty() {
            return Err(anyhow!("Chapter marker prefix must not be empty"));
        }

        if common.max_chunk_chars == 0 {
            return Err(anyhow!("max_chunk_chars must be greater than zero"));
        }

        if common.retry_count == 0 {
            return Err(anyhow!("retry_count must allow at least one attempt"));
        }

        if !(0.0..=1.0).contains(&common.min_output_ratio) {
            return Err(anyhow!(
                "min_output_ratio must be between 0.0 and 1.0, got {}",
                common.min_output_ratio
            ));
        }

        if common.source_language.trim().is_empty() || common.target_language.trim().is_empty() {
            return Err(anyhow!("Source and target languages must be set"));
        }

        // Hosted providers need a key, either configured or in the environment
        if let Some(env_var) = self.translation.provider.api_key_env_var() {
            if self.translation.get_api_key().is_empty() {
                return Err(anyhow!(
                    "Translation API key is required for {} provider (set it in the config or {})",
                    self.translation.provider.display_name(),
                    env_var
                ));
            }
        }

        Ok(())
    }
}

impl TranslationConfig {
    /// Entry of the selected provider, if the config lists one
    pub fn get_active_provider_config(&self) -> Option<&ProviderConfig> {
        self.get_provider_config(&self.provider)
    }

    pub fn get_provider_config(&self, provider_type: &TranslationProvider) -> Option<&ProviderConfig> {
        let wanted = provider_type.to_lowercase_string();
        self.available_providers.iter().find(|entry| entry.provider_type == wanted)
    }

    /// Entry of the selected provider, appended with defaults when missing
    pub fn active_provider_config_mut(&mut self) -> &mut ProviderConfig {
        let wanted = self.provider.to_lowercase_string();
        let index = match self.available_providers.iter().position(|entry| entry.provider_type == wanted) {
            Some(index) => index,
            None => {
                self.available_providers.push(ProviderConfig::new(self.provider.clone()));
                self.available_providers.len() - 1
            }
        };
        &mut self.available_providers[index]
    }

    /// Non-empty value of one field of the selected provider's entry
    fn configured(&self, field: impl Fn(&ProviderConfig) -> &str) -> Option<String> {
        self.get_active_provider_config()
            .map(|entry| field(entry))
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    }

    pub fn get_model(&self) -> String {
        self.configured(|entry| entry.model.as_str())
            .unwrap_or_else(|| default_model(&self.provider))
    }

    /// Configured key, or the provider's environment variable
    pub fn get_api_key(&self) -> String {
        self.configured(|entry| entry.api_key.as_str())
            .or_else(|| self.provider.api_key_env_var().and_then(|name| std::env::var(name).ok()))
            .unwrap_or_default()
    }

    pub fn get_endpoint(&self) -> String {
        self.configured(|entry| entry.endpoint.as_str())
            .unwrap_or_else(|| default_endpoint(&self.provider))
    }

    pub fn get_timeout(&self) -> Duration {
        let secs = self.get_active_provider_config()
            .map(|p| p.timeout_secs)
            .filter(|secs| *secs > 0)
            .unwrap_or_else(default_timeout_secs);
        Duration::from_secs(secs)
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            provider: TranslationProvider::default(),
            available_providers: vec![
                ProviderConfig::new(TranslationProvider::Gemini),
                ProviderConfig::new(TranslationProvider::Anthropic),
                ProviderConfig::new(TranslationProvider::Ollama),
            ],
            common: TranslationCommonConfig::default(),
        }
    }
}
