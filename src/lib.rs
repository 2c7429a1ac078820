/*!
 * # ChapterWAI - web-novel chapter translation with AI
 *
 * A Rust library that splits a concatenated novel dump into chapter files
 * and translates them chapter by chapter through a remote model.
 *
 * ## Features
 *
 * - Split a raw dump on configurable chapter markers (`第<N>章` by default)
 * - Translate chapters using various AI providers:
 *   - Google Gemini API
 *   - Anthropic API
 *   - Ollama (local LLM)
 * - Inject glossaries and a style reference into every prompt
 * - Paragraph-bounded chunking of long chapters
 * - Bounded exponential backoff on transient failures
 * - Resumable runs: finished chapters are never translated twice
 * - Collection of untranslated proper nouns for glossary curation
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `chapters`: Chapter segmentation and on-disk layout
 * - `translation`: Chunking, prompts, retry and the chapter orchestrator
 * - `providers`: Client implementations for the supported LLM services
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod chapters;
pub mod errors;
pub mod file_utils;
pub mod providers;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use chapters::{ChapterStore, ChapterUnit, Segmenter};
pub use errors::{AppError, ProviderError, TranslationError};
pub use translation::{ChapterOrchestrator, ChapterStatus, RunSummary};
