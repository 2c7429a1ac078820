/*!
 * Chapter translation through a remote model.
 *
 * This module contains the translation half of the pipeline. It is split
 * into several submodules:
 *
 * - `chunker`: paragraph-bounded chunking of chapter text
 * - `prompts`: reference texts and prompt construction
 * - `core`: single-call client over the configured provider
 * - `retry`: bounded exponential backoff
 * - `terms`: unmapped-terms extraction and log
 * - `orchestrator`: the per-chapter loop with resume and truncation guard
 */

pub use self::chunker::{TranslationChunk, chunk_text, chunk_unit};
pub use self::core::TranslationClient;
pub use self::orchestrator::{ChapterOrchestrator, ChapterStatus, ChunkResult, PipelineSettings, RunSummary};
pub use self::prompts::{PromptBuilder, ReferenceTexts, SOURCE_TEXT_HEADING};
pub use self::retry::{RetryPolicy, Sleeper, TokioSleeper, with_retry};
pub use self::terms::{ChunkTerms, UNMAPPED_TERMS_MARKER, UnmappedTermsLog, split_unmapped_terms};

pub mod chunker;
pub mod core;
pub mod orchestrator;
pub mod prompts;
pub mod retry;
pub mod terms;
